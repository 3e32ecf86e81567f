//! Configuration system — schema, loading, and env var overrides.
//!
//! # Usage
//! ```no_run
//! use kinrelay_core::config;
//!
//! let cfg = config::load_config(None);
//! println!("Endpoint: {}", cfg.api_endpoint);
//! ```

pub mod loader;
pub mod schema;

pub use loader::{get_config_path, load_config, read_config_file, save_config, try_load_config};
pub use schema::Config;
