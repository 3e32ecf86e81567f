//! reqwest client for the Kindroid-style relay API.
//!
//! Two endpoints, both `POST` with `Authorization: Bearer {api_key}`:
//! - `{endpoint}` — `{message, ai_id, session_id?}` → `{response, session_id?}`
//! - `{endpoint}/chat-break` — `{ai_id, greeting}` → `{response}`

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, error};

use kinrelay_core::config::Config;
use kinrelay_core::utils::truncate_string;

use crate::error::RelayError;
use crate::traits::RelayApi;
use crate::types::{ChatBreakRequest, RelayReply, RelayResponse, SendMessageRequest};

// ─────────────────────────────────────────────
// ClientConfig
// ─────────────────────────────────────────────

/// Everything the client needs from the user's configuration.
#[derive(Clone)]
pub struct ClientConfig {
    pub api_key: String,
    /// Base URL; trailing slashes are ignored.
    pub api_endpoint: String,
    pub ai_id: String,
    /// Returned to the user whenever a call fails.
    pub error_message: String,
    /// Per-request timeout; expiry counts as a failure.
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn from_config(config: &Config) -> Self {
        ClientConfig {
            api_key: config.api_key.clone(),
            api_endpoint: config.api_endpoint.clone(),
            ai_id: config.ai_id.clone(),
            error_message: config.error_message.clone(),
            timeout: Duration::from_secs(config.request_timeout.max(1)),
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &kinrelay_core::utils::mask_secret(&self.api_key))
            .field("api_endpoint", &self.api_endpoint)
            .field("ai_id", &self.ai_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}

// ─────────────────────────────────────────────
// KindroidClient
// ─────────────────────────────────────────────

/// HTTP implementation of [`RelayApi`].
pub struct KindroidClient {
    /// HTTP client (shared, connection-pooled).
    client: reqwest::Client,
    config: ClientConfig,
}

impl std::fmt::Debug for KindroidClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KindroidClient")
            .field("config", &self.config)
            .finish()
    }
}

impl KindroidClient {
    pub fn new(config: ClientConfig) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(RelayError::Build)?;

        Ok(KindroidClient { client, config })
    }

    /// URL for send-message.
    fn send_url(&self) -> String {
        self.config.api_endpoint.trim_end_matches('/').to_string()
    }

    /// URL for chat-break.
    fn chat_break_url(&self) -> String {
        format!("{}/chat-break", self.send_url())
    }

    /// POST a JSON body and decode a [`RelayResponse`].
    async fn post<B: Serialize + Sync>(&self, url: &str, body: &B) -> Result<RelayResponse, RelayError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(RelayError::Status {
                status,
                body: truncate_string(&body, 200),
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice::<RelayResponse>(&bytes).map_err(|e| RelayError::Parse(e.to_string()))
    }

    /// Turn a call result into the reply the user sees.
    fn normalize(&self, op: &'static str, result: Result<RelayResponse, RelayError>) -> RelayReply {
        match result {
            Ok(resp) => {
                let reply = RelayReply::from(resp);
                debug!(
                    op,
                    response_len = reply.text.len(),
                    new_session = reply.session_id.is_some(),
                    "remote reply received"
                );
                reply
            }
            Err(e) => {
                error!(op, error = %e, "remote call failed, using fallback message");
                RelayReply::fallback(&self.config.error_message)
            }
        }
    }
}

#[async_trait]
impl RelayApi for KindroidClient {
    async fn send_message(&self, message: &str, session_id: Option<&str>) -> RelayReply {
        let body = SendMessageRequest {
            message,
            ai_id: &self.config.ai_id,
            session_id: session_id.filter(|id| !id.is_empty()),
        };

        debug!(
            message_len = message.len(),
            has_session = body.session_id.is_some(),
            "sending message"
        );

        let result = self.post(&self.send_url(), &body).await;
        self.normalize("send_message", result)
    }

    async fn chat_break(&self, greeting: &str) -> RelayReply {
        let body = ChatBreakRequest {
            ai_id: &self.config.ai_id,
            greeting,
        };

        debug!(greeting = %greeting, "sending chat break");

        let result = self.post(&self.chat_break_url(), &body).await;
        self.normalize("chat_break", result)
    }
}

// ─────────────────────────────────────────────
// Builder (convenience)
// ─────────────────────────────────────────────

/// Build a client from the loaded configuration.
pub fn create_client(config: &Config) -> Result<KindroidClient, RelayError> {
    let client_config = ClientConfig::from_config(config);
    debug!(
        api_endpoint = %client_config.api_endpoint,
        timeout_s = client_config.timeout.as_secs(),
        "creating relay client"
    );
    KindroidClient::new(client_config)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
