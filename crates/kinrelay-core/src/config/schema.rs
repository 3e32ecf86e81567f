//! Configuration schema.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! `#[serde(rename_all = "camelCase")]` handles the conversion, and every
//! struct is `default` so partial files load cleanly.

use serde::{Deserialize, Serialize};

/// Default remote API base URL.
pub const DEFAULT_API_ENDPOINT: &str = "https://api.kindroid.ai/v1";

/// Default idle timeout before a session is dropped: 30 minutes.
pub const DEFAULT_SESSION_TIMEOUT_S: u64 = 30 * 60;

/// Default sweep interval: hourly.
pub const DEFAULT_SWEEP_INTERVAL_S: u64 = 60 * 60;

/// Default per-request HTTP timeout.
pub const DEFAULT_REQUEST_TIMEOUT_S: u64 = 30;

pub const DEFAULT_GREETING: &str = "Hello";

pub const DEFAULT_ERROR_MESSAGE: &str =
    "Sorry, I couldn't reach the AI right now. Please try again later.";

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.kinrelay/config.json` + env vars.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Bearer token for the remote API.
    pub api_key: String,
    /// Base URL; send-message posts here, chat-break posts to `{base}/chat-break`.
    pub api_endpoint: String,
    /// Identifier of the remote AI persona to talk to.
    pub ai_id: String,
    /// Idle seconds after which a user's session is dropped.
    pub session_timeout: u64,
    /// Seconds between background sweeps of expired sessions.
    pub sweep_interval: u64,
    /// Seconds before an outbound HTTP call is abandoned.
    pub request_timeout: u64,
    /// Opening line used by `/chat_break` when no greeting is given.
    pub default_greeting: String,
    /// Text sent to the user whenever a remote call fails.
    pub error_message: String,
    pub channels: ChannelsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            ai_id: String::new(),
            session_timeout: DEFAULT_SESSION_TIMEOUT_S,
            sweep_interval: DEFAULT_SWEEP_INTERVAL_S,
            request_timeout: DEFAULT_REQUEST_TIMEOUT_S,
            default_greeting: DEFAULT_GREETING.to_string(),
            error_message: DEFAULT_ERROR_MESSAGE.to_string(),
            channels: ChannelsConfig::default(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &crate::utils::mask_secret(&self.api_key))
            .field("api_endpoint", &self.api_endpoint)
            .field("ai_id", &self.ai_id)
            .field("session_timeout", &self.session_timeout)
            .field("sweep_interval", &self.sweep_interval)
            .field("request_timeout", &self.request_timeout)
            .field("default_greeting", &self.default_greeting)
            .field("error_message", &self.error_message)
            .field("channels", &self.channels)
            .finish()
    }
}

impl Config {
    /// Whether an API key has been provided.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Whether an AI id has been provided.
    pub fn has_ai_id(&self) -> bool {
        !self.ai_id.trim().is_empty()
    }

    /// Whether both credentials needed to relay are present.
    pub fn is_configured(&self) -> bool {
        self.has_api_key() && self.has_ai_id()
    }
}

// ─────────────────────────────────────────────
// Channels
// ─────────────────────────────────────────────

/// Host-platform channel configurations.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChannelsConfig {
    #[serde(default)]
    pub console: ConsoleConfig,
}

/// Local stdin/stdout channel used by the gateway.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConsoleConfig {
    pub enabled: bool,
    /// User id attributed to every console line.
    pub user_id: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            user_id: "console".to_string(),
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
