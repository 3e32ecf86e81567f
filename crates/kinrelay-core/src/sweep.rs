//! Sweep service — periodically drops expired sessions.
//!
//! Runs independently of message traffic so users who never come back do not
//! keep entries alive forever.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tracing::{debug, info};

use crate::config::schema::DEFAULT_SWEEP_INTERVAL_S;
use crate::session::SessionStore;

/// Periodic sweep over a shared [`SessionStore`].
pub struct SweepService {
    store: Arc<SessionStore>,
    /// Interval in seconds between sweeps.
    interval_s: u64,
    shutdown: Arc<Notify>,
}

impl SweepService {
    /// Create a new sweep service. `interval_s` defaults to hourly; zero is
    /// treated as one second.
    pub fn new(store: Arc<SessionStore>, interval_s: Option<u64>) -> Self {
        Self {
            store,
            interval_s: interval_s.unwrap_or(DEFAULT_SWEEP_INTERVAL_S).max(1),
            shutdown: Arc::new(Notify::new()),
        }
    }

    pub fn interval_s(&self) -> u64 {
        self.interval_s
    }

    /// Run the sweep loop until `stop()` is called.
    pub async fn start(&self) -> anyhow::Result<()> {
        info!(interval_s = self.interval_s, "session sweep started");

        loop {
            let sleep_duration = Duration::from_secs(self.interval_s);

            tokio::select! {
                _ = tokio::time::sleep(sleep_duration) => {
                    self.tick();
                }
                _ = self.shutdown.notified() => {
                    info!("session sweep shutting down");
                    return Ok(());
                }
            }
        }
    }

    /// Stop the loop. The signal is kept if the loop is mid-tick (or not yet
    /// started), so it is never lost.
    pub fn stop(&self) {
        info!("stopping session sweep");
        self.shutdown.notify_one();
    }

    /// Run one sweep immediately, returning the number of sessions removed.
    pub fn tick(&self) -> usize {
        let removed = self.store.sweep();
        if removed > 0 {
            info!(removed, remaining = self.store.len(), "swept expired sessions");
        } else {
            debug!(remaining = self.store.len(), "sweep: nothing expired");
        }
        removed
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
