//! Process-wide session store.
//!
//! Maps each [`IdentityKey`] to exactly one live conversation session.
//! Creation and replacement happen under the write lock, so two concurrent
//! first messages from the same identity always observe the same session.
//! Network calls made with a session happen after the lock is released; the
//! store only guards the map itself.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use lr_domain::conversation::SessionHandle;
use lr_domain::identity::IdentityKey;
use lr_domain::trace::TraceEvent;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session entry
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A session bound to one identity.
#[derive(Debug, Clone)]
pub struct SessionEntry {
    pub identity: IdentityKey,
    pub session: SessionHandle,
}

impl SessionEntry {
    pub fn session_id(&self) -> &str {
        self.session.session_id()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.session.created_at()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Store contract
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Mapping from identity to its conversation session.
///
/// `get_or_create` and `reset` are atomic read-modify-write operations: at
/// most one session is live per key at any time.  Entries are never removed,
/// only replaced by `reset`.
pub trait SessionStore: Send + Sync {
    /// Look up the current session for `key`.
    fn get(&self, key: &IdentityKey) -> Option<SessionEntry>;

    /// Return the existing session or insert a fresh one.
    /// The flag is `true` iff a session was created by this call.
    fn get_or_create(&self, key: &IdentityKey) -> (SessionEntry, bool);

    /// Always start a fresh session, replacing any existing one.
    /// The flag reports whether a session existed before the call.
    fn reset(&self, key: &IdentityKey) -> (SessionEntry, bool);

    /// Snapshot of all live sessions.
    fn list(&self) -> Vec<SessionEntry>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// In-memory implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

type StartSession = Box<dyn Fn() -> SessionHandle + Send + Sync>;

/// In-memory store; sessions are lost on restart.
pub struct MemorySessionStore {
    start: StartSession,
    sessions: RwLock<HashMap<IdentityKey, SessionEntry>>,
}

impl MemorySessionStore {
    /// `start` opens a new conversation with the backend.  It runs inside
    /// the write lock and must not block.
    pub fn new<F>(start: F) -> Self
    where
        F: Fn() -> SessionHandle + Send + Sync + 'static,
    {
        Self {
            start: Box::new(start),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    fn new_entry(&self, key: &IdentityKey) -> SessionEntry {
        SessionEntry {
            identity: key.clone(),
            session: (self.start)(),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &IdentityKey) -> Option<SessionEntry> {
        self.sessions.read().get(key).cloned()
    }

    fn get_or_create(&self, key: &IdentityKey) -> (SessionEntry, bool) {
        // Fast path: session already exists.
        if let Some(entry) = self.sessions.read().get(key) {
            return (entry.clone(), false);
        }

        // Slow path: re-check under the write lock so racing callers
        // agree on a single session.
        let mut sessions = self.sessions.write();
        if let Some(entry) = sessions.get(key) {
            return (entry.clone(), false);
        }

        let entry = self.new_entry(key);
        sessions.insert(key.clone(), entry.clone());
        drop(sessions);

        TraceEvent::SessionResolved {
            identity: key.to_string(),
            session_id: entry.session_id().to_owned(),
            is_new: true,
        }
        .emit();

        (entry, true)
    }

    fn reset(&self, key: &IdentityKey) -> (SessionEntry, bool) {
        let entry = self.new_entry(key);
        let previous = self.sessions.write().insert(key.clone(), entry.clone());

        TraceEvent::SessionReset {
            identity: key.to_string(),
            old_session_id: previous.as_ref().map(|p| p.session_id().to_owned()),
            new_session_id: entry.session_id().to_owned(),
        }
        .emit();

        (entry, previous.is_some())
    }

    fn list(&self) -> Vec<SessionEntry> {
        self.sessions.read().values().cloned().collect()
    }

    fn len(&self) -> usize {
        self.sessions.read().len()
    }
}
