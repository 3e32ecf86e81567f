//! Config loader — reads `~/.kinrelay/config.json`, migrates legacy keys,
//! and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.kinrelay/config.json`
//! 3. Environment variables `KINRELAY_<FIELD>` (override JSON)

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;
use crate::error::ConfigError;

/// Keys written by older versions, mapped to their current names.
const LEGACY_KEYS: &[(&str, &str)] = &[
    ("api_key", "apiKey"),
    ("api_endpoint", "apiEndpoint"),
    ("ai_id", "aiId"),
    ("session_timeout", "sessionTimeout"),
    ("default_greeting", "defaultGreeting"),
    ("error_message", "errorMessage"),
];

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from `path` (or the default path) + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path
        .map(PathBuf::from)
        .unwrap_or_else(get_config_path);

    load_config_from_path(&config_path)
}

/// Load config from a specific file path, reporting why it failed.
///
/// Env overrides are applied on success. Unlike [`load_config`] a missing
/// file is an error here.
pub fn try_load_config(path: &Path) -> Result<Config, ConfigError> {
    read_config_file(path).map(apply_env_overrides)
}

/// Read exactly what the file holds: legacy keys migrated, no env overrides.
///
/// Use this before rewriting the file so override values never get persisted.
pub fn read_config_file(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let parse_err = |source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    };

    let mut raw: serde_json::Value = serde_json::from_str(&content).map_err(parse_err)?;
    migrate_config(&mut raw);
    serde_json::from_value(raw).map_err(parse_err)
}

fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return apply_env_overrides(Config::default());
    }

    debug!("Loading config from {}", path.display());

    match try_load_config(path) {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "Config unusable, falling back to defaults");
            apply_env_overrides(Config::default())
        }
    }
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> Result<(), ConfigError> {
    let config_path = path
        .map(PathBuf::from)
        .unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::save(&config_path, e))?;
    }

    let json =
        serde_json::to_string_pretty(config).map_err(|e| ConfigError::save(&config_path, e))?;

    std::fs::write(&config_path, json).map_err(|e| ConfigError::save(&config_path, e))?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Rename legacy snake_case top-level keys to camelCase.
///
/// An existing camelCase key always wins over its legacy spelling.
fn migrate_config(raw: &mut serde_json::Value) {
    let Some(obj) = raw.as_object_mut() else {
        return;
    };

    for (legacy, current) in LEGACY_KEYS {
        if let Some(val) = obj.remove(*legacy) {
            if !obj.contains_key(*current) {
                obj.insert((*current).to_string(), val);
                debug!("Migrated {} → {}", legacy, current);
            }
        }
    }
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Supported overrides:
/// - `KINRELAY_API_KEY` → `api_key`
/// - `KINRELAY_API_ENDPOINT` → `api_endpoint`
/// - `KINRELAY_AI_ID` → `ai_id`
/// - `KINRELAY_SESSION_TIMEOUT` → `session_timeout`
/// - `KINRELAY_REQUEST_TIMEOUT` → `request_timeout`
/// - `KINRELAY_DEFAULT_GREETING` → `default_greeting`
/// - `KINRELAY_ERROR_MESSAGE` → `error_message`
fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(val) = std::env::var("KINRELAY_API_KEY") {
        config.api_key = val;
    }
    if let Ok(val) = std::env::var("KINRELAY_API_ENDPOINT") {
        config.api_endpoint = val;
    }
    if let Ok(val) = std::env::var("KINRELAY_AI_ID") {
        config.ai_id = val;
    }
    if let Ok(val) = std::env::var("KINRELAY_SESSION_TIMEOUT") {
        if let Ok(n) = val.parse::<u64>() {
            config.session_timeout = n;
        }
    }
    if let Ok(val) = std::env::var("KINRELAY_REQUEST_TIMEOUT") {
        if let Ok(n) = val.parse::<u64>() {
            config.request_timeout = n;
        }
    }
    if let Ok(val) = std::env::var("KINRELAY_DEFAULT_GREETING") {
        config.default_greeting = val;
    }
    if let Ok(val) = std::env::var("KINRELAY_ERROR_MESSAGE") {
        config.error_message = val;
    }

    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
