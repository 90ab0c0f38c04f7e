//! Momentum and goal updates.
//!
//! Updates are planned on a copy of the session and only committed once
//! the whole plan succeeded, so a failure never leaves a half-applied
//! change in the store.

use crate::errors::{HubError, Result};
use crate::ids::SessionId;
use crate::policy::ClampPolicy;
use crate::session::{Session, Side};
use crate::store::SessionStore;
use crate::wire::{GoalChanged, GoalRequest, MomentumChanged, MomentumRequest};

/// A validated momentum update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MomentumUpdate {
    /// Targeted side.
    pub side: Side,
    /// Overwrite instead of add.
    pub is_set: bool,
    /// Raw input before clamping.
    pub value: i64,
}

/// A validated goal update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GoalUpdate {
    /// Targeted side.
    pub side: Side,
    /// Raw input before clamping.
    pub value: i64,
}

impl From<&MomentumRequest> for MomentumUpdate {
    fn from(req: &MomentumRequest) -> Self {
        Self {
            side: Side::from_is_player(req.is_player),
            is_set: req.is_set,
            value: req.momentum,
        }
    }
}

impl From<&GoalRequest> for GoalUpdate {
    fn from(req: &GoalRequest) -> Self {
        Self {
            side: Side::from_is_player(req.is_player),
            value: req.goal,
        }
    }
}

/// Apply a momentum update to a copy of `session`.
///
/// The input is capped by `policy`, then set or added to the targeted side.
/// Afterwards both sides are floored at 0.
pub fn plan_momentum(
    session: &Session,
    policy: &ClampPolicy,
    update: MomentumUpdate,
) -> (Session, MomentumChanged) {
    let mut next = session.clone();
    let input = policy.clamp_momentum_input(update.value);
    let slot = next.momentum_mut(update.side);
    *slot = if update.is_set {
        input
    } else {
        slot.saturating_add(input)
    };
    for side in [Side::Player, Side::Opponent] {
        let m = next.momentum_mut(side);
        *m = ClampPolicy::floor_momentum(*m);
    }
    let changed = MomentumChanged {
        is_player: update.side.is_player(),
        new_momentum: next.momentum(update.side),
    };
    (next, changed)
}

/// Apply a goal update to a copy of `session`.
pub fn plan_goal(session: &Session, policy: &ClampPolicy, update: GoalUpdate) -> (Session, GoalChanged) {
    let mut next = session.clone();
    *next.goal_mut(update.side) = policy.clamp_goal(update.value);
    let changed = GoalChanged {
        is_player: update.side.is_player(),
        new_goal: next.goal(update.side),
    };
    (next, changed)
}

/// Resolve the session a request targets.
///
/// `None` or an empty identifier is [`HubError::MissingSessionId`]; an
/// identifier absent from the store is [`HubError::SessionNotFound`].
pub fn require_session<'a>(store: &'a SessionStore, id: Option<&str>) -> Result<(SessionId, &'a Session)> {
    let id = id.filter(|s| !s.is_empty()).ok_or(HubError::MissingSessionId)?;
    store
        .get(id)
        .map(|session| (SessionId::from(id), session))
        .ok_or_else(|| HubError::SessionNotFound(SessionId::from(id)))
}
