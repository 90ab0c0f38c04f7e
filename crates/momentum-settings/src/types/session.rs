//! Session rules and lifecycle settings.

use serde::{Deserialize, Serialize};

/// Which clamping rules apply to momentum and goal updates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClampPolicyMode {
    /// Momentum input unbounded, goals floored at 0.
    Baseline,
    /// Momentum input capped at 100 per call, goals in `[0, 1000]`.
    #[default]
    Capped,
}

impl std::str::FromStr for ClampPolicyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "baseline" => Ok(Self::Baseline),
            "capped" => Ok(Self::Capped),
            other => Err(format!("unknown clamp policy '{other}' (expected baseline or capped)")),
        }
    }
}

/// Session behavior settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionSettings {
    /// Length of generated session IDs.
    pub id_length: usize,
    /// Length of the unchecked ID used when generation keeps colliding.
    pub fallback_id_length: usize,
    /// Collision retries before falling back.
    pub max_id_attempts: u32,
    /// Goal for both sides of a new session.
    pub default_goal: i64,
    /// Seconds a session may sit unwatched before it is deleted.
    pub reclaim_grace_secs: u64,
    /// Clamping rules.
    pub clamp_policy: ClampPolicyMode,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            id_length: 4,
            fallback_id_length: 5,
            max_id_attempts: 100,
            default_goal: 10,
            reclaim_grace_secs: 30,
            clamp_policy: ClampPolicyMode::Capped,
        }
    }
}
