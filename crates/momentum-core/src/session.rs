//! Per-session state shared by a player and an opponent.

use serde::{Deserialize, Serialize};

/// Goal assigned to both sides of a fresh session.
pub const DEFAULT_GOAL: i64 = 10;

/// Which side of the table an update targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// The player (`isPlayer: true` on the wire).
    Player,
    /// The opponent (`isPlayer: false` on the wire).
    Opponent,
}

impl Side {
    /// Map the wire-level `isPlayer` flag to a side.
    pub fn from_is_player(is_player: bool) -> Self {
        if is_player { Self::Player } else { Self::Opponent }
    }

    /// Inverse of [`Side::from_is_player`].
    pub fn is_player(self) -> bool {
        matches!(self, Self::Player)
    }
}

/// Mutable state of one session.
///
/// `guest_count` is internal bookkeeping for reclamation and never leaves
/// the server; see [`SessionSnapshot`] for the visible part.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub(crate) player_momentum: i64,
    pub(crate) opponent_momentum: i64,
    pub(crate) player_goal: i64,
    pub(crate) opponent_goal: i64,
    pub(crate) guest_count: i64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_GOAL)
    }
}

impl Session {
    /// A fresh session: zero momentum, `default_goal` on both sides, no guests.
    pub fn new(default_goal: i64) -> Self {
        let goal = default_goal.max(0);
        Self {
            player_momentum: 0,
            opponent_momentum: 0,
            player_goal: goal,
            opponent_goal: goal,
            guest_count: 0,
        }
    }

    /// Current momentum of a side.
    pub fn momentum(&self, side: Side) -> i64 {
        match side {
            Side::Player => self.player_momentum,
            Side::Opponent => self.opponent_momentum,
        }
    }

    /// Current goal of a side.
    pub fn goal(&self, side: Side) -> i64 {
        match side {
            Side::Player => self.player_goal,
            Side::Opponent => self.opponent_goal,
        }
    }

    pub(crate) fn momentum_mut(&mut self, side: Side) -> &mut i64 {
        match side {
            Side::Player => &mut self.player_momentum,
            Side::Opponent => &mut self.opponent_momentum,
        }
    }

    pub(crate) fn goal_mut(&mut self, side: Side) -> &mut i64 {
        match side {
            Side::Player => &mut self.player_goal,
            Side::Opponent => &mut self.opponent_goal,
        }
    }

    /// Number of currently subscribed viewers. May dip below zero after an
    /// unmatched unsubscribe.
    pub fn guest_count(&self) -> i64 {
        self.guest_count
    }

    /// The externally visible four-field state.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            player_goal: self.player_goal,
            player_momentum: self.player_momentum,
            opponent_goal: self.opponent_goal,
            opponent_momentum: self.opponent_momentum,
        }
    }
}

/// Wire representation of a session's state (`GET /state`, page render).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Player goal.
    pub player_goal: i64,
    /// Player momentum.
    pub player_momentum: i64,
    /// Opponent goal.
    pub opponent_goal: i64,
    /// Opponent momentum.
    pub opponent_momentum: i64,
}
