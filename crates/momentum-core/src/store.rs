//! In-memory session store.
//!
//! The store is a plain owned map; it is not synchronized. The server wraps
//! exactly one instance behind a single lock and routes every access through
//! it.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::ids::{IdGenerator, SessionId};
use crate::session::{DEFAULT_GOAL, Session};

/// Mapping from session identifier to session state.
#[derive(Debug)]
pub struct SessionStore {
    sessions: HashMap<SessionId, Session>,
    generator: IdGenerator,
    default_goal: i64,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(IdGenerator::default(), DEFAULT_GOAL)
    }
}

impl SessionStore {
    /// Create an empty store.
    pub fn new(generator: IdGenerator, default_goal: i64) -> Self {
        Self {
            sessions: HashMap::new(),
            generator,
            default_goal,
        }
    }

    /// Look up a session.
    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.get(id)
    }

    /// Look up a session for mutation.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Session> {
        self.sessions.get_mut(id)
    }

    /// Whether a session exists.
    pub fn contains(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }

    /// Create a session.
    ///
    /// With `Some(id)` the session is created under that exact identifier,
    /// which lets a stale or bookmarked link resume. If that identifier is
    /// already live the existing session is returned untouched. With `None`
    /// a fresh identifier is generated.
    pub fn create(&mut self, id: Option<SessionId>) -> (SessionId, &Session) {
        let id = match id {
            Some(id) => {
                debug!(session_id = %id, "creating session under requested ID");
                id
            }
            None => {
                let sessions = &self.sessions;
                let id = self.generator.generate(|candidate| sessions.contains_key(candidate));
                info!(session_id = %id, "made new session");
                id
            }
        };
        let default_goal = self.default_goal;
        let session = self
            .sessions
            .entry(id.clone())
            .or_insert_with(|| Session::new(default_goal));
        (id, session)
    }

    /// Replace the state of an existing session. Returns `false` when the
    /// session is gone.
    pub fn commit(&mut self, id: &str, session: Session) -> bool {
        match self.sessions.get_mut(id) {
            Some(slot) => {
                *slot = session;
                true
            }
            None => false,
        }
    }

    /// Remove a session. Absent identifiers are a no-op.
    pub fn delete(&mut self, id: &str) -> Option<Session> {
        self.sessions.remove(id)
    }

    /// Number of live sessions.
    pub fn count(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Side;
    use std::collections::HashSet;

    #[test]
    fn create_without_id_generates_one() {
        let mut store = SessionStore::default();
        let (id, session) = store.create(None);
        assert_eq!(id.len(), 4);
        assert_eq!(session.goal(Side::Player), 10);
        assert!(store.contains(&id));
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn create_with_explicit_id_is_retrievable() {
        let mut store = SessionStore::default();
        let (id, _) = store.create(Some(SessionId::from("AB12")));
        assert_eq!(id.as_str(), "AB12");
        assert!(store.get("AB12").is_some());
    }

    #[test]
    fn create_with_live_id_keeps_existing_state() {
        let mut store = SessionStore::default();
        let _ = store.create(Some(SessionId::from("AB12")));
        store.get_mut("AB12").unwrap().player_momentum = 7;
        let (_, session) = store.create(Some(SessionId::from("AB12")));
        assert_eq!(session.momentum(Side::Player), 7);
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn generated_ids_are_unique() {
        let mut store = SessionStore::default();
        let mut seen = HashSet::new();
        for _ in 0..2_000 {
            let (id, _) = store.create(None);
            assert!(seen.insert(id), "duplicate ID generated");
        }
        assert_eq!(store.count(), 2_000);
    }

    #[test]
    fn delete_is_idempotent() {
        let mut store = SessionStore::default();
        let (id, _) = store.create(None);
        assert!(store.delete(&id).is_some());
        assert!(store.delete(&id).is_none());
        assert!(store.delete("NEVER").is_none());
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn get_unknown_is_none() {
        let store = SessionStore::default();
        assert!(store.get("NOPE").is_none());
    }

    #[test]
    fn commit_requires_live_session() {
        let mut store = SessionStore::default();
        assert!(!store.commit("GONE", Session::default()));
        let (id, _) = store.create(None);
        let mut updated = Session::default();
        updated.player_goal = 42;
        assert!(store.commit(&id, updated));
        assert_eq!(store.get(&id).unwrap().goal(Side::Player), 42);
    }

    #[test]
    fn custom_default_goal() {
        let mut store = SessionStore::new(IdGenerator::default(), 25);
        let (_, session) = store.create(None);
        assert_eq!(session.goal(Side::Opponent), 25);
    }
}
