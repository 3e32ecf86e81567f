//! Per-user relay sessions — in-memory only, lost on restart.
//!
//! A session pairs an external user id with the opaque session id the remote
//! API hands back, plus the time the user was last heard from. Entries idle
//! for longer than the configured timeout are treated as expired and dropped
//! either on the user's next message or by the background sweep.

pub mod clock;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use store::{Session, SessionStore};
