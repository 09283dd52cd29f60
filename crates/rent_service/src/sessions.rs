//! Per-session prediction histories
//!
//! Each browser session owns its own [`HistoryStore`]. The registry only
//! hands out handles; two sessions never see each other's records.

use parking_lot::Mutex;
use rentwise_core::HistoryStore;
use std::collections::{HashMap, VecDeque};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

pub type SessionId = Uuid;

/// Handle to one session's history
pub type SessionHistory = Arc<Mutex<HistoryStore>>;

#[derive(Default)]
struct Sessions {
    histories: HashMap<SessionId, SessionHistory>,
    created: VecDeque<SessionId>,
}

pub struct SessionRegistry {
    inner: Mutex<Sessions>,
    max_sessions: usize,
    record_limit: Option<NonZeroUsize>,
}

impl SessionRegistry {
    pub fn new(max_sessions: usize, record_limit: Option<NonZeroUsize>) -> Self {
        Self {
            inner: Mutex::new(Sessions::default()),
            max_sessions,
            record_limit,
        }
    }

    /// Start a session with an empty history.
    ///
    /// When the registry is full, the oldest sessions are ended first.
    pub fn create(&self) -> SessionId {
        let id = Uuid::new_v4();
        let history = match self.record_limit {
            Some(limit) => HistoryStore::with_capacity_limit(limit),
            None => HistoryStore::new(),
        };

        let mut sessions = self.inner.lock();
        while sessions.histories.len() >= self.max_sessions.max(1) {
            let Some(oldest) = sessions.created.pop_front() else {
                break;
            };
            sessions.histories.remove(&oldest);
            info!("Session limit reached, ended session {}", oldest);
        }

        sessions.histories.insert(id, Arc::new(Mutex::new(history)));
        sessions.created.push_back(id);
        debug!("Started session {}", id);
        id
    }

    /// End a session and discard its history. Returns false if unknown.
    pub fn end(&self, id: &SessionId) -> bool {
        let mut sessions = self.inner.lock();
        let removed = sessions.histories.remove(id).is_some();
        if removed {
            sessions.created.retain(|existing| existing != id);
            debug!("Ended session {}", id);
        }
        removed
    }

    pub fn history(&self, id: &SessionId) -> Option<SessionHistory> {
        self.inner.lock().histories.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().histories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
