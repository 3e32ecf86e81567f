//! kinrelay channels — host-platform adapters.
//!
//! - **base**: the `Channel` trait
//! - **manager**: `ChannelManager`, lifecycle and outbound routing
//! - **console**: stdin/stdout channel for running the relay locally

pub mod base;
pub mod console;
pub mod manager;

pub use base::Channel;
pub use console::ConsoleChannel;
pub use manager::ChannelManager;
