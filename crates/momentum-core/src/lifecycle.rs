//! Viewer accounting and reclamation of abandoned sessions.
//!
//! A session is *active* while it has viewers, *draining* once the count
//! drops to zero (or below) and a reclaim timer is armed, and *reclaimed*
//! once it has been deleted. The timer itself lives in the server; this
//! module only holds the bookkeeping rules so they can be tested without
//! a runtime.

use tracing::{debug, info};

use crate::ids::SessionId;
use crate::store::SessionStore;

/// Observable lifecycle state of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    /// Present with at least one viewer, or never watched.
    Active,
    /// Present with no viewers and a reclaim timer armed.
    Draining,
    /// Not present in the store.
    Reclaimed,
}

/// What happened when a reclaim timer fired.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReclaimOutcome {
    /// The session was deleted.
    Reclaimed,
    /// A viewer came back before the deadline; the session was kept.
    Revived,
    /// Nothing to do: the session was already gone.
    AlreadyGone,
}

/// Record a new viewer. Returns the updated count, or `None` when the
/// session does not exist.
pub fn add_guest(store: &mut SessionStore, id: &str) -> Option<i64> {
    let session = store.get_mut(id)?;
    session.guest_count += 1;
    debug!(session_id = id, guests = session.guest_count, "guest joined");
    Some(session.guest_count)
}

/// Record a departing viewer. Returns the updated count, or `None` when the
/// session does not exist.
///
/// The count is not clamped: an unsubscribe without a matching subscribe
/// drives it negative, and the session is then treated as unwatched.
pub fn remove_guest(store: &mut SessionStore, id: &str) -> Option<i64> {
    let session = store.get_mut(id)?;
    session.guest_count -= 1;
    debug!(session_id = id, guests = session.guest_count, "guest left");
    Some(session.guest_count)
}

/// Whether a session has no viewers left.
pub fn is_quiescent(guest_count: i64) -> bool {
    guest_count <= 0
}

/// Deadline handler: delete the session only if it is still unwatched.
pub fn reclaim_if_quiescent(store: &mut SessionStore, id: &SessionId) -> ReclaimOutcome {
    match store.get(id) {
        None => ReclaimOutcome::AlreadyGone,
        Some(session) if !is_quiescent(session.guest_count()) => {
            debug!(session_id = %id, guests = session.guest_count(), "session revived before reclaim");
            ReclaimOutcome::Revived
        }
        Some(_) => {
            let _ = store.delete(id);
            info!(session_id = %id, "deleting session");
            ReclaimOutcome::Reclaimed
        }
    }
}
