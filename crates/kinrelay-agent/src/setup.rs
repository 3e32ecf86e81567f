//! First-run setup flow.
//!
//! Until both an API key and an AI id are known, ordinary messages are read
//! as `api_key:<value>` / `ai_id:<value>` commands instead of being relayed.
//! Captured values are written back to the config file. Nothing here talks to
//! the remote API.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use tracing::{info, warn};

use kinrelay_core::config::{get_config_path, read_config_file, save_config, Config};
use kinrelay_core::ConfigError;

pub const PROMPT_API_KEY: &str =
    "This relay isn't set up yet. Send your API key as `api_key:<your key>`.";
pub const PROMPT_AI_ID: &str = "API key saved. Now send the AI id as `ai_id:<id>`.";
pub const READY_MESSAGE: &str = "Setup complete. You can start chatting now.";

/// Where the setup flow stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetupState {
    /// Nothing configured and nobody prompted yet.
    Unconfigured,
    AwaitingApiKey,
    AwaitingAiId,
    Ready,
}

/// A parsed setup line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SetupInput<'a> {
    ApiKey(&'a str),
    AiId(&'a str),
    Other,
}

impl<'a> SetupInput<'a> {
    pub fn parse(text: &'a str) -> Self {
        let text = text.trim();
        if let Some(value) = text.strip_prefix("api_key:") {
            SetupInput::ApiKey(value.trim())
        } else if let Some(value) = text.strip_prefix("ai_id:") {
            SetupInput::AiId(value.trim())
        } else {
            SetupInput::Other
        }
    }
}

/// Result of feeding one line to the setup flow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetupOutcome {
    pub reply: String,
    /// True exactly when this input completed setup.
    pub became_ready: bool,
}

/// Owns the live configuration and the setup state derived from it.
pub struct SetupFlow {
    config: RwLock<Config>,
    /// Where captured credentials are persisted; `None` uses the default path.
    config_path: Option<PathBuf>,
    prompted: AtomicBool,
}

impl SetupFlow {
    pub fn new(config: Config, config_path: Option<PathBuf>) -> Self {
        Self {
            config: RwLock::new(config),
            config_path,
            prompted: AtomicBool::new(false),
        }
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> Config {
        self.config.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn state(&self) -> SetupState {
        let config = self.config.read().unwrap_or_else(|e| e.into_inner());
        match (config.has_api_key(), config.has_ai_id()) {
            (true, true) => SetupState::Ready,
            (true, false) => SetupState::AwaitingAiId,
            (false, has_ai_id) => {
                if has_ai_id || self.prompted.load(Ordering::SeqCst) {
                    SetupState::AwaitingApiKey
                } else {
                    SetupState::Unconfigured
                }
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state() == SetupState::Ready
    }

    /// The prompt for whatever is still missing.
    pub fn prompt(&self) -> &'static str {
        match self.state() {
            SetupState::Unconfigured | SetupState::AwaitingApiKey => PROMPT_API_KEY,
            SetupState::AwaitingAiId => PROMPT_AI_ID,
            SetupState::Ready => READY_MESSAGE,
        }
    }

    /// Interpret one line of user input while not ready.
    pub fn handle_input(&self, text: &str) -> SetupOutcome {
        let was_ready = self.is_ready();
        self.prompted.store(true, Ordering::SeqCst);

        let saved = match SetupInput::parse(text) {
            SetupInput::ApiKey(value) if !value.is_empty() => {
                info!("setup: api key received");
                self.apply(|c| c.api_key = value.to_string())
            }
            SetupInput::AiId(value) if !value.is_empty() => {
                info!(ai_id = %value, "setup: ai id received");
                self.apply(|c| c.ai_id = value.to_string())
            }
            _ => Ok(()),
        };

        let became_ready = !was_ready && self.is_ready();
        let mut reply = self.prompt().to_string();
        if let Err(e) = saved {
            reply.push_str(&format!("\n(Warning: could not save config: {e})"));
        }

        SetupOutcome { reply, became_ready }
    }

    /// Mutate the config in memory, then persist the same change.
    ///
    /// The write starts from the file's own contents so env overrides held in
    /// memory are never saved. The in-memory change sticks even if the write
    /// fails.
    fn apply(&self, change: impl Fn(&mut Config)) -> Result<(), ConfigError> {
        {
            let mut config = self.config.write().unwrap_or_else(|e| e.into_inner());
            change(&mut *config);
        }

        let path = self.config_path.clone().unwrap_or_else(get_config_path);
        let mut on_disk = match read_config_file(&path) {
            Ok(config) => config,
            Err(ConfigError::Read { .. }) if !path.exists() => Config::default(),
            Err(e) => {
                warn!(error = %e, "setup: existing config unreadable, not overwriting");
                return Err(e);
            }
        };
        change(&mut on_disk);

        save_config(&on_disk, Some(&path)).map_err(|e| {
            warn!(error = %e, "setup: failed to persist config");
            e
        })
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use kinrelay_core::config::load_config;

    fn make_flow(config: Config) -> (SetupFlow, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let flow = SetupFlow::new(config, Some(dir.path().join("config.json")));
        (flow, dir)
    }

    #[test]
    fn test_parse_setup_input() {
        assert_eq!(SetupInput::parse("api_key:ABC"), SetupInput::ApiKey("ABC"));
        assert_eq!(SetupInput::parse("  ai_id: XYZ "), SetupInput::AiId("XYZ"));
        assert_eq!(SetupInput::parse("api_key:"), SetupInput::ApiKey(""));
        assert_eq!(SetupInput::parse("hello"), SetupInput::Other);
        assert_eq!(SetupInput::parse("API_KEY:abc"), SetupInput::Other);
    }

    #[test]
    fn test_initial_state_unconfigured() {
        let (flow, _dir) = make_flow(Config::default());
        assert_eq!(flow.state(), SetupState::Unconfigured);
    }

    #[test]
    fn test_configured_config_is_ready() {
        let mut config = Config::default();
        config.api_key = "k".into();
        config.ai_id = "a".into();
        let (flow, _dir) = make_flow(config);
        assert_eq!(flow.state(), SetupState::Ready);
    }

    #[test]
    fn test_plain_message_prompts_for_key() {
        let (flow, _dir) = make_flow(Config::default());
        let outcome = flow.handle_input("hi there");
        assert_eq!(outcome.reply, PROMPT_API_KEY);
        assert!(!outcome.became_ready);
        assert_eq!(flow.state(), SetupState::AwaitingApiKey);
    }

    #[test]
    fn test_api_key_then_ai_id_reaches_ready() {
        let (flow, dir) = make_flow(Config::default());

        let outcome = flow.handle_input("api_key:ABC");
        assert_eq!(flow.state(), SetupState::AwaitingAiId);
        assert_eq!(outcome.reply, PROMPT_AI_ID);
        assert!(!outcome.became_ready);

        let saved = load_config(Some(&dir.path().join("config.json")));
        assert_eq!(saved.api_key, "ABC");

        let outcome = flow.handle_input("ai_id:XYZ");
        assert_eq!(flow.state(), SetupState::Ready);
        assert_eq!(outcome.reply, READY_MESSAGE);
        assert!(outcome.became_ready);

        let saved = load_config(Some(&dir.path().join("config.json")));
        assert_eq!(saved.ai_id, "XYZ");
    }

    #[test]
    fn test_ai_id_first_then_key() {
        let (flow, _dir) = make_flow(Config::default());
        flow.handle_input("ai_id:XYZ");
        assert_eq!(flow.state(), SetupState::AwaitingApiKey);

        let outcome = flow.handle_input("api_key:ABC");
        assert!(outcome.became_ready);
    }

    #[test]
    fn test_empty_value_rejected() {
        let (flow, _dir) = make_flow(Config::default());
        let outcome = flow.handle_input("api_key:   ");
        assert_eq!(outcome.reply, PROMPT_API_KEY);
        assert_eq!(flow.state(), SetupState::AwaitingApiKey);
        assert!(flow.config().api_key.is_empty());
    }

    #[test]
    fn test_saved_file_excludes_in_memory_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"errorMessage": "from the file"}"#).unwrap();

        // As if KINRELAY_API_ENDPOINT / KINRELAY_ERROR_MESSAGE were set
        let mut live = Config::default();
        live.api_endpoint = "https://override.example/v1".into();
        live.error_message = "from the environment".into();
        let flow = SetupFlow::new(live, Some(path.clone()));

        flow.handle_input("api_key:ABC");

        let saved = read_config_file(&path).unwrap();
        assert_eq!(saved.api_key, "ABC");
        assert_eq!(saved.error_message, "from the file");
        assert_eq!(
            saved.api_endpoint,
            kinrelay_core::config::schema::DEFAULT_API_ENDPOINT
        );
        assert_eq!(flow.config().api_endpoint, "https://override.example/v1");
    }

    #[test]
    fn test_corrupt_file_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json {{").unwrap();
        let flow = SetupFlow::new(Config::default(), Some(path.clone()));

        let outcome = flow.handle_input("api_key:ABC");

        assert_eq!(flow.config().api_key, "ABC");
        assert!(outcome.reply.contains("could not save config"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "not json {{");
    }

    #[test]
    fn test_save_failure_still_applies_in_memory() {
        let blocker = tempfile::NamedTempFile::new().unwrap();
        // Parent of the config path is a regular file, so the write fails
        let flow = SetupFlow::new(Config::default(), Some(blocker.path().join("config.json")));

        let outcome = flow.handle_input("api_key:ABC");
        assert_eq!(flow.config().api_key, "ABC");
        assert_eq!(flow.state(), SetupState::AwaitingAiId);
        assert!(outcome.reply.contains("could not save config"));
    }
}
