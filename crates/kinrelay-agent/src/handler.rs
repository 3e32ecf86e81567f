//! Relay handler — the core entry points for platform events.
//!
//! Per message:
//! 1. While setup is incomplete, treat the text as a setup command
//! 2. Drop the user's session if it has been idle past the timeout
//! 3. Relay to the remote API, continuing the stored session id
//! 4. Store any new session id and reply with the API's text
//!
//! Remote failures never escape: the user always gets either the API's reply
//! or the configured fallback message.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use tracing::{debug, error, info, warn};

use kinrelay_client::RelayApi;
use kinrelay_core::bus::InboundMessage;
use kinrelay_core::config::Config;
use kinrelay_core::session::SessionStore;
use kinrelay_core::utils::truncate_string;

use crate::commands::{split_command, Command, HELP_TEXT};
use crate::reply::Replier;
use crate::setup::{SetupFlow, SetupState};

/// Reply to `/reset` without a greeting.
pub const RESET_CONFIRMATION: &str = "Session reset.";

/// Builds a relay client from the current configuration.
///
/// Called at startup when credentials are already present, and again when
/// the setup flow completes.
pub type ClientFactory =
    Arc<dyn Fn(&Config) -> anyhow::Result<Arc<dyn RelayApi>> + Send + Sync>;

// ─────────────────────────────────────────────
// RelayHandler
// ─────────────────────────────────────────────

pub struct RelayHandler {
    sessions: Arc<SessionStore>,
    setup: SetupFlow,
    client: RwLock<Option<Arc<dyn RelayApi>>>,
    factory: ClientFactory,
}

impl RelayHandler {
    /// Create a handler. If `config` already has credentials the client is
    /// built immediately.
    pub fn new(
        config: Config,
        config_path: Option<PathBuf>,
        sessions: Arc<SessionStore>,
        factory: ClientFactory,
    ) -> Self {
        let client = if config.is_configured() {
            build_client(&factory, &config)
        } else {
            info!("relay not configured yet, setup flow active");
            None
        };

        Self {
            sessions,
            setup: SetupFlow::new(config, config_path),
            client: RwLock::new(client),
            factory,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    pub fn setup_state(&self) -> SetupState {
        self.setup.state()
    }

    /// Snapshot of the live configuration (including setup-captured values).
    pub fn config(&self) -> Config {
        self.setup.config()
    }

    /// Route a raw inbound event to [`handle_command`](Self::handle_command)
    /// or [`handle_message`](Self::handle_message).
    pub async fn handle_event(&self, event: &InboundMessage, replier: &dyn Replier) {
        match split_command(&event.content) {
            Some((name, args)) => self.handle_command(event, name, args, replier).await,
            None => self.handle_message(event, replier).await,
        }
    }

    /// Handle an ordinary chat message.
    pub async fn handle_message(&self, event: &InboundMessage, replier: &dyn Replier) {
        if let Some(text) = self.respond_to_message(event).await {
            deliver(replier, event, &text).await;
        }
    }

    /// Handle `/command args`.
    pub async fn handle_command(
        &self,
        event: &InboundMessage,
        command: &str,
        args: &str,
        replier: &dyn Replier,
    ) {
        let text = self.respond_to_command(event, Command::from_parts(command, args)).await;
        deliver(replier, event, &text).await;
    }

    /// Compute the reply to a message. `None` means say nothing.
    pub async fn respond_to_message(&self, event: &InboundMessage) -> Option<String> {
        let text = event.content.trim();
        if text.is_empty() {
            return None;
        }

        if !self.setup.is_ready() {
            return Some(self.run_setup(text));
        }

        let user_id = event.user_id();
        if self.sessions.is_expired(user_id) {
            info!(user_id = %user_id, "session idle past timeout, resetting");
            self.sessions.reset(user_id);
        }
        self.sessions.touch(user_id);
        let session = self.sessions.get_or_create(user_id);

        let Some(client) = self.client() else {
            warn!(user_id = %user_id, "no relay client available");
            return Some(self.config().error_message);
        };

        debug!(
            user_id = %user_id,
            preview = %truncate_string(text, 40),
            "relaying message"
        );

        let reply = client.send_message(text, session.remote_id()).await;
        if let Some(session_id) = reply.session_id {
            self.sessions.set_session_id(user_id, session_id);
        }
        Some(reply.text)
    }

    /// Compute the reply to a command.
    pub async fn respond_to_command(&self, event: &InboundMessage, command: Command) -> String {
        if command == Command::Help {
            return HELP_TEXT.to_string();
        }

        if !self.setup.is_ready() {
            // Commands don't advance setup; just say what's missing.
            return self.setup.prompt().to_string();
        }

        let user_id = event.user_id();
        match command {
            Command::Reset { greeting } => self.reset_session(user_id, greeting.as_deref()).await,
            Command::ChatBreak { greeting } => {
                let greeting = greeting.unwrap_or_else(|| self.config().default_greeting);
                self.reset_session(user_id, Some(&greeting)).await
            }
            Command::Unknown(name) => format!("Unknown command: /{name}\n\n{HELP_TEXT}"),
            Command::Help => HELP_TEXT.to_string(),
        }
    }

    /// Forget the user's session; with a greeting, also start a new remote
    /// conversation and return its opening reply.
    ///
    /// The local entry is removed whether or not the chat-break succeeds.
    pub async fn reset_session(&self, user_id: &str, greeting: Option<&str>) -> String {
        self.sessions.reset(user_id);
        info!(user_id = %user_id, with_greeting = greeting.is_some(), "session reset by user");

        let greeting = match greeting.map(str::trim) {
            Some(g) if !g.is_empty() => g,
            _ => return RESET_CONFIRMATION.to_string(),
        };

        match self.client() {
            Some(client) => client.chat_break(greeting).await.text,
            None => self.config().error_message,
        }
    }

    fn run_setup(&self, text: &str) -> String {
        let outcome = self.setup.handle_input(text);
        if outcome.became_ready {
            let config = self.setup.config();
            let client = build_client(&self.factory, &config);
            *self.client.write().unwrap_or_else(|e| e.into_inner()) = client;
            info!("setup complete, relay client ready");
        }
        outcome.reply
    }

    fn client(&self) -> Option<Arc<dyn RelayApi>> {
        self.client.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

fn build_client(factory: &ClientFactory, config: &Config) -> Option<Arc<dyn RelayApi>> {
    match factory(config) {
        Ok(client) => Some(client),
        Err(e) => {
            error!(error = %e, "failed to build relay client");
            None
        }
    }
}

async fn deliver(replier: &dyn Replier, event: &InboundMessage, text: &str) {
    if let Err(e) = replier.reply(text).await {
        error!(
            channel = %event.channel,
            chat_id = %event.chat_id,
            error = %e,
            "failed to deliver reply"
        );
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
