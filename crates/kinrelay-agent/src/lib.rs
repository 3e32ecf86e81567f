//! kinrelay agent — the relay handler and the loop that feeds it.
//!
//! This crate contains:
//! - **handler**: `handle_message` / `handle_command`, session lifecycle, `reset_session`
//! - **setup**: first-run `api_key:` / `ai_id:` capture
//! - **commands**: `/reset`, `/chat_break`, `/help` parsing
//! - **reply**: the `Replier` callback and its bus implementation
//! - **relay_loop**: inbound bus → handler, one task per event

pub mod commands;
pub mod handler;
pub mod relay_loop;
pub mod reply;
pub mod setup;

pub use commands::{Command, HELP_TEXT};
pub use handler::{ClientFactory, RelayHandler, RESET_CONFIRMATION};
pub use relay_loop::RelayLoop;
pub use reply::{BusReplier, Replier};
pub use setup::{SetupFlow, SetupState};
