//! Per-browser-session state.
//!
//! Each session owns its prediction history and form-reset toggle. Nothing
//! is persisted: a session lives until its cookie goes or it sits idle
//! past the store's timeout.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::types::HistoryEntry;

/// Entries shown in the "Recent Predictions" sidebar.
pub const RECENT_LIMIT: usize = 5;

#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    history: Vec<HistoryEntry>,
    form_reset: bool,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append-only; entries are never edited in place.
    pub fn record(&mut self, entry: HistoryEntry) {
        self.history.push(entry);
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Last `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> &[HistoryEntry] {
        let start = self.history.len().saturating_sub(n);
        &self.history[start..]
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Flip the toggle; the form keys its inputs on it to start blank.
    pub fn reset_form(&mut self) -> bool {
        self.form_reset = !self.form_reset;
        self.form_reset
    }

    pub fn form_reset(&self) -> bool {
        self.form_reset
    }
}

/// Sessions idle for longer than this are dropped.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60 * 60);

#[derive(Debug)]
struct SessionSlot {
    ctx: SessionContext,
    last_seen: Instant,
}

impl SessionSlot {
    fn new() -> Self {
        Self { ctx: SessionContext::new(), last_seen: Instant::now() }
    }
}

#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, SessionSlot>>,
    idle_timeout: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_idle_timeout(DEFAULT_IDLE_TIMEOUT)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self { sessions: RwLock::new(HashMap::new()), idle_timeout }
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Existing live session id, or a freshly created one. Creating a
    /// session first drops every idle one.
    pub async fn ensure(&self, id: Option<Uuid>) -> Uuid {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();

        if let Some(known) = id {
            if let Some(slot) = sessions.get_mut(&known) {
                if now.duration_since(slot.last_seen) <= self.idle_timeout {
                    slot.last_seen = now;
                    return known;
                }
            }
        }

        let evicted = Self::sweep(&mut sessions, now, self.idle_timeout);
        if evicted > 0 {
            debug!(evicted, remaining = sessions.len(), "Idle sessions evicted");
        }

        let id = Uuid::new_v4();
        sessions.insert(id, SessionSlot::new());
        debug!(session = %id, "Session created");
        id
    }

    /// Run `f` against a session, creating it if it has gone away.
    pub async fn with_session<R>(&self, id: Uuid, f: impl FnOnce(&mut SessionContext) -> R) -> R {
        let mut sessions = self.sessions.write().await;
        let slot = sessions.entry(id).or_insert_with(SessionSlot::new);
        slot.last_seen = Instant::now();
        f(&mut slot.ctx)
    }

    /// Drop sessions idle past the timeout; returns how many went.
    pub async fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        Self::sweep(&mut sessions, Instant::now(), self.idle_timeout)
    }

    fn sweep(sessions: &mut HashMap<Uuid, SessionSlot>, now: Instant, idle: Duration) -> usize {
        let before = sessions.len();
        sessions.retain(|_, slot| now.duration_since(slot.last_seen) <= idle);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
