//! Wire types for the remote API, plus the normalized reply handed to callers.

use serde::{Deserialize, Serialize};

/// Body of `POST {endpoint}`.
#[derive(Clone, Debug, Serialize)]
pub struct SendMessageRequest<'a> {
    pub message: &'a str,
    pub ai_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<&'a str>,
}

/// Body of `POST {endpoint}/chat-break`.
#[derive(Clone, Debug, Serialize)]
pub struct ChatBreakRequest<'a> {
    pub ai_id: &'a str,
    pub greeting: &'a str,
}

/// Successful response body from either endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct RelayResponse {
    pub response: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// What the relay tells the user, after failures have been normalized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayReply {
    /// Text to send back to the user.
    pub text: String,
    /// New remote session id, if the API assigned one.
    pub session_id: Option<String>,
    /// `false` when `text` is the fallback error message.
    pub ok: bool,
}

impl RelayReply {
    pub fn fallback(text: impl Into<String>) -> Self {
        RelayReply {
            text: text.into(),
            session_id: None,
            ok: false,
        }
    }
}

impl From<RelayResponse> for RelayReply {
    fn from(resp: RelayResponse) -> Self {
        RelayReply {
            text: resp.response,
            session_id: resp.session_id.filter(|id| !id.is_empty()),
            ok: true,
        }
    }
}
