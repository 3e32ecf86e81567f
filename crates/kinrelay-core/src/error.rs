//! Error types shared across the workspace.

use std::path::PathBuf;

/// Failures while reading or writing the configuration file.
///
/// Load failures are never fatal: the loader logs them and falls back to
/// defaults. Save failures are returned to the caller so the setup flow can
/// tell the user their credentials were not written.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to save config file {path}: {reason}")]
    Save { path: PathBuf, reason: String },
}

impl ConfigError {
    pub(crate) fn save(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        ConfigError::Save {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_error_message() {
        let err = ConfigError::save("/tmp/config.json", "permission denied");
        let text = err.to_string();
        assert!(text.contains("/tmp/config.json"));
        assert!(text.contains("permission denied"));
    }

    #[test]
    fn test_read_error_keeps_source() {
        let err = ConfigError::Read {
            path: PathBuf::from("/nope"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(std::error::Error::source(&err).is_some());
    }
}
