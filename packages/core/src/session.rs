//! In-process session store: an `Arc<Mutex<HashMap>>` guarded by a single
//! short-lived lock per operation, holding the one map this server actually
//! needs.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::model::{Event, Session, SessionId};

/// Thread-safe, cheaply-clonable handle to the process-wide session map.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<SessionId, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Create a new session from a freshly parsed event list.
    pub async fn create(&self, events: Vec<Event>) -> SessionId {
        let id = SessionId::new();
        let session = Session::new(id, events, Utc::now());

        let mut sessions = self.sessions.lock().await;
        sessions.insert(id, session);

        id
    }

    /// Read a consistent snapshot of a session, touching `last_accessed_at`.
    pub async fn get_snapshot(&self, id: SessionId) -> Option<Session> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.get_mut(&id)?;
        session.last_accessed_at = Utc::now();
        Some(session.clone())
    }

    /// Mutate a session in place under the lock, touching `last_accessed_at`.
    /// `f` must not block: the lock is held for its entire duration.
    pub async fn with_session_mut<F, R>(&self, id: SessionId, f: F) -> Option<R>
    where
        F: FnOnce(&mut Session) -> R,
    {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.get_mut(&id)?;
        session.last_accessed_at = Utc::now();
        Some(f(session))
    }

    /// Remove every session whose `last_accessed_at` is older than `ttl_secs`
    /// relative to `now`. Returns the number of sessions removed.
    pub async fn sweep_expired(&self, ttl_secs: i64, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();

        sessions.retain(|_, session| {
            let age = now.signed_duration_since(session.last_accessed_at);
            age.num_seconds() < ttl_secs
        });

        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
