//! Remote call failures.
//!
//! Every variant ends up as the configured fallback text for the user; the
//! detail only goes to the logs.

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("remote API returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("invalid response body: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for RelayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RelayError::Timeout
        } else if e.is_decode() {
            RelayError::Parse(e.to_string())
        } else {
            RelayError::Transport(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        let err = RelayError::Status {
            status: reqwest::StatusCode::UNAUTHORIZED,
            body: "bad token".into(),
        };
        let text = err.to_string();
        assert!(text.contains("401"));
        assert!(text.contains("bad token"));
    }

    #[test]
    fn test_parse_display() {
        let err = RelayError::Parse("missing field `response`".into());
        assert!(err.to_string().contains("missing field"));
    }
}
