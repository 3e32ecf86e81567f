//! The remote operations the relay depends on.

use async_trait::async_trait;

use crate::types::RelayReply;

/// Remote conversational-AI API.
///
/// Implementations never fail: transport errors, non-200 statuses, timeouts,
/// and malformed bodies all come back as [`RelayReply::fallback`] carrying the
/// configured error message. Nothing is retried.
#[async_trait]
pub trait RelayApi: Send + Sync {
    /// Relay a user message, continuing `session_id` when given.
    async fn send_message(&self, message: &str, session_id: Option<&str>) -> RelayReply;

    /// Start a fresh conversation with an opening line.
    async fn chat_break(&self, greeting: &str) -> RelayReply;
}
