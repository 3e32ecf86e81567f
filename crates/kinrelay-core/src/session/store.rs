//! Session store — per-user `{session_id, last_active}` with idle expiry.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use super::clock::{Clock, SystemClock};

/// Upper bound on the idle timeout (100 years).
const MAX_TIMEOUT_S: u64 = 100 * 365 * 24 * 60 * 60;

// ─────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────

/// One user's conversation with the remote API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    /// External identity on the hosting platform.
    pub user_id: String,
    /// Opaque id assigned by the remote API; empty until the first exchange.
    pub session_id: String,
    /// When the user was last heard from.
    pub last_active: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Session {
            user_id: user_id.into(),
            session_id: String::new(),
            last_active: now,
        }
    }

    /// The remote session id, if one has been assigned.
    pub fn remote_id(&self) -> Option<&str> {
        if self.session_id.is_empty() {
            None
        } else {
            Some(&self.session_id)
        }
    }

    fn is_idle(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        now - self.last_active > timeout
    }
}

// ─────────────────────────────────────────────
// SessionStore
// ─────────────────────────────────────────────

/// In-memory session map keyed by user id.
///
/// Thread-safe via `RwLock`; the sweep takes the write lock once so it never
/// interleaves with a per-user update.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    timeout: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("sessions", &self.len())
            .field("timeout_s", &self.timeout.num_seconds())
            .finish()
    }
}

impl SessionStore {
    /// Create a store using wall-clock time.
    pub fn new(timeout_secs: u64) -> Self {
        Self::with_clock(timeout_secs, Arc::new(SystemClock))
    }

    /// Create a store with an injected clock.
    pub fn with_clock(timeout_secs: u64, clock: Arc<dyn Clock>) -> Self {
        let timeout = Duration::seconds(timeout_secs.min(MAX_TIMEOUT_S) as i64);
        SessionStore {
            sessions: RwLock::new(HashMap::new()),
            timeout,
            clock,
        }
    }

    /// Return the user's session, or a fresh empty one.
    ///
    /// The fresh session is *not* stored; an entry is only kept once the
    /// remote API has assigned it an id (see [`set_session_id`](Self::set_session_id)).
    pub fn get_or_create(&self, user_id: &str) -> Session {
        if let Some(session) = self.read().get(user_id) {
            return session.clone();
        }
        Session::new(user_id, self.clock.now())
    }

    /// Mark the user as active now. No-op for unknown users.
    pub fn touch(&self, user_id: &str) {
        let now = self.clock.now();
        if let Some(session) = self.write().get_mut(user_id) {
            session.last_active = now;
        }
    }

    /// Whether the user's session has been idle longer than the timeout.
    ///
    /// Unknown users are never expired.
    pub fn is_expired(&self, user_id: &str) -> bool {
        let now = self.clock.now();
        self.read()
            .get(user_id)
            .is_some_and(|s| s.is_idle(now, self.timeout))
    }

    /// Record the remote session id for a user, creating the entry if needed.
    pub fn set_session_id(&self, user_id: &str, session_id: impl Into<String>) {
        let now = self.clock.now();
        let session_id = session_id.into();
        let mut sessions = self.write();
        let entry = sessions
            .entry(user_id.to_string())
            .or_insert_with(|| Session::new(user_id, now));
        entry.session_id = session_id;
        entry.last_active = now;
    }

    /// Drop the user's session. Returns whether one existed.
    pub fn reset(&self, user_id: &str) -> bool {
        let removed = self.write().remove(user_id).is_some();
        if removed {
            debug!(user_id = %user_id, "session reset");
        }
        removed
    }

    /// Drop every expired session, returning how many were removed.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let mut sessions = self.write();
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_idle(now, self.timeout));
        before - sessions.len()
    }

    /// Number of stored sessions.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Configured idle timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // A poisoned lock only means another thread panicked mid-update; the map
    // itself is still a valid map, so keep serving it.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Session>> {
        self.sessions.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Session>> {
        self.sessions.write().unwrap_or_else(|e| e.into_inner())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
