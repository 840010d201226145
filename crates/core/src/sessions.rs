//! Edit session correlation
//!
//! Maps a user to the event they started editing from the widget, so the
//! later submit (which only carries user identity) can resolve the event id.
//! One active session per user; the most recent start wins; cleared on a
//! successful update. No expiry.

use dashmap::DashMap;

/// Process-wide userId -> eventId map with per-key atomic operations.
#[derive(Debug, Default)]
pub struct EditSessions {
    inner: DashMap<String, String>,
}

impl EditSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin (or replace) the active edit session for a user.
    pub fn start(&self, user_id: &str, event_id: &str) {
        self.inner.insert(user_id.to_string(), event_id.to_string());
    }

    /// Resolve the event id for a user's active session, if any.
    pub fn resolve(&self, user_id: &str) -> Option<String> {
        self.inner.get(user_id).map(|entry| entry.value().clone())
    }

    /// Clear the session after a successful submit.
    pub fn clear(&self, user_id: &str) {
        self.inner.remove(user_id);
    }
}
