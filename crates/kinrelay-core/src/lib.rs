//! kinrelay core — shared building blocks for the relay.
//!
//! - [`config`] — typed configuration, JSON loading, env overrides
//! - [`session`] — per-user session store with idle expiry
//! - [`sweep`] — periodic removal of expired sessions
//! - [`bus`] — inbound/outbound message queues between channels and the relay
//! - [`error`] — configuration error taxonomy

pub mod bus;
pub mod config;
pub mod error;
pub mod session;
pub mod sweep;
pub mod utils;

pub use error::ConfigError;
