//! Message bus — channels publish inbound events, the relay loop publishes
//! replies, and the channel manager routes replies back out.

pub mod queue;
pub mod types;

pub use queue::MessageBus;
pub use types::{InboundMessage, OutboundMessage};
