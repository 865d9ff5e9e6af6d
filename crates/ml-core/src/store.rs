//! Process-lifetime slot holding the current session.
//!
//! A front end that is torn down and rebuilt can recover the match in
//! progress from the store. Nothing here outlives the process.

use std::sync::{Mutex, PoisonError};

use crate::session::Session;

/// Storage for the latest session state.
pub trait SessionStore: Send + Sync {
    /// Returns the stored session, if any.
    fn load(&self) -> Option<Session>;

    /// Replaces the stored session.
    fn save(&self, session: &Session);

    /// Empties the slot.
    fn clear(&self);
}

/// In-memory [`SessionStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<Session>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Option<Session> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn save(&self, session: &Session) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
    }

    fn clear(&self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
