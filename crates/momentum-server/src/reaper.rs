//! Delayed, cancellable reclamation timers keyed by session.
//!
//! At most one timer is pending per session. Scheduling again replaces the
//! previous timer, and cancelling removes it. A timer that fires only runs
//! its callback if it is still the current timer for that session, so a
//! replaced or cancelled timer can never act on newer state.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use momentum_core::SessionId;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Default grace period before an unwatched session is deleted.
pub const DEFAULT_RECLAIM_GRACE: Duration = Duration::from_secs(30);

struct PendingReclaim {
    ticket: u64,
    cancel: CancellationToken,
}

/// Owner of all pending reclamation timers.
pub struct Reaper {
    grace: Duration,
    pending: Arc<DashMap<SessionId, PendingReclaim>>,
    next_ticket: AtomicU64,
    shutdown: CancellationToken,
}

impl Reaper {
    /// Create a reaper whose timers wait `grace` before firing.
    pub fn new(grace: Duration) -> Self {
        Self {
            grace,
            pending: Arc::new(DashMap::new()),
            next_ticket: AtomicU64::new(0),
            shutdown: CancellationToken::new(),
        }
    }

    /// Configured grace period.
    pub fn grace(&self) -> Duration {
        self.grace
    }

    /// Arm (or re-arm) the timer for `id`.
    ///
    /// After the grace period `on_fire` is called with the session ID,
    /// unless the timer was cancelled or replaced first. Must be called
    /// from within a Tokio runtime.
    pub fn schedule<F>(&self, id: SessionId, on_fire: F)
    where
        F: FnOnce(&SessionId) + Send + 'static,
    {
        if self.shutdown.is_cancelled() {
            return;
        }
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        let cancel = self.shutdown.child_token();
        let entry = PendingReclaim {
            ticket,
            cancel: cancel.clone(),
        };
        if let Some(previous) = self.pending.insert(id.clone(), entry) {
            previous.cancel.cancel();
            debug!(session_id = %id, "re-armed reclaim timer");
        }

        let pending = Arc::clone(&self.pending);
        let grace = self.grace;
        drop(tokio::spawn(async move {
            tokio::select! {
                () = cancel.cancelled() => {}
                () = tokio::time::sleep(grace) => {
                    if pending.remove_if(&id, |_, p| p.ticket == ticket).is_some() {
                        on_fire(&id);
                    }
                }
            }
        }));
    }

    /// Disarm the timer for `id`. Returns `true` if one was pending.
    pub fn cancel(&self, id: &str) -> bool {
        match self.pending.remove(id) {
            Some((_, entry)) => {
                entry.cancel.cancel();
                debug!(session_id = id, "cancelled reclaim timer");
                true
            }
            None => false,
        }
    }

    /// Whether a timer is pending for `id`.
    pub fn is_pending(&self, id: &str) -> bool {
        self.pending.contains_key(id)
    }

    /// Number of pending timers.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Cancel every pending timer and refuse new ones.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        self.pending.clear();
    }
}
