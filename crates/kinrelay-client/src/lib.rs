//! HTTP client for the remote conversational-AI API.
//!
//! # Architecture
//!
//! - [`traits::RelayApi`] — the two remote operations the relay needs
//! - [`http_client::KindroidClient`] — reqwest implementation with bearer auth
//! - [`types`] — wire request/response bodies and the normalized [`RelayReply`]
//! - [`error::RelayError`] — why a call failed (logged, never surfaced to users)

pub mod error;
pub mod http_client;
pub mod traits;
pub mod types;

pub use error::RelayError;
pub use http_client::{create_client, ClientConfig, KindroidClient};
pub use traits::RelayApi;
pub use types::RelayReply;
