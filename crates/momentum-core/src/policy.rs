//! Value clamping rules for momentum and goal updates.
//!
//! Two historical policies exist and both are supported:
//!
//! | policy     | momentum input       | goal range    |
//! |------------|----------------------|---------------|
//! | `baseline` | unbounded            | `[0, ∞)`      |
//! | `capped`   | at most `100` per call | `[0, 1000]` |
//!
//! Under both policies the *stored* momentum of both sides is floored at 0
//! after every momentum update.

/// Per-call momentum cap used by the capped policy.
pub const MOMENTUM_DELTA_CAP: i64 = 100;

/// Goal ceiling used by the capped policy.
pub const GOAL_CEILING: i64 = 1000;

/// Bounds applied to incoming momentum and goal values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClampPolicy {
    /// Upper bound applied to the raw momentum input before it is added or
    /// set. Negative inputs are never raised by this bound.
    pub momentum_delta_cap: Option<i64>,
    /// Upper bound on goal values. The lower bound is always 0.
    pub goal_ceiling: Option<i64>,
}

impl Default for ClampPolicy {
    fn default() -> Self {
        Self::capped()
    }
}

impl ClampPolicy {
    /// No per-call momentum cap, goals only floored at 0.
    pub const fn baseline() -> Self {
        Self {
            momentum_delta_cap: None,
            goal_ceiling: None,
        }
    }

    /// Momentum input capped at 100, goals in `[0, 1000]`.
    pub const fn capped() -> Self {
        Self {
            momentum_delta_cap: Some(MOMENTUM_DELTA_CAP),
            goal_ceiling: Some(GOAL_CEILING),
        }
    }

    /// Apply the per-call cap to a raw momentum input.
    pub fn clamp_momentum_input(&self, value: i64) -> i64 {
        match self.momentum_delta_cap {
            Some(cap) => value.min(cap),
            None => value,
        }
    }

    /// Floor a stored momentum at 0.
    pub fn floor_momentum(value: i64) -> i64 {
        value.max(0)
    }

    /// Bring a goal into `[0, ceiling]`.
    pub fn clamp_goal(&self, value: i64) -> i64 {
        let floored = value.max(0);
        match self.goal_ceiling {
            Some(ceiling) => floored.min(ceiling.max(0)),
            None => floored,
        }
    }
}
