//! JSON payloads exchanged with clients.
//!
//! Request bodies are decoded leniently, the way a browser client sends
//! them: flags follow JavaScript truthiness and numeric fields only count
//! when they are JSON numbers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /momentum`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MomentumRequest {
    /// Target session. `None` when absent, empty, or not a string.
    pub session_id: Option<String>,
    /// `true` targets the player, `false` the opponent.
    pub is_player: bool,
    /// `true` overwrites, `false` adds.
    pub is_set: bool,
    /// Delta or absolute value. 0 when absent or non-numeric.
    pub momentum: i64,
}

impl MomentumRequest {
    /// Decode from an arbitrary JSON value.
    pub fn from_value(value: &Value) -> Self {
        Self {
            session_id: session_id_field(value),
            is_player: truthy(value.get("isPlayer")),
            is_set: truthy(value.get("isSet")),
            momentum: number_or_zero(value.get("momentum")),
        }
    }
}

/// Body of `POST /goal`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GoalRequest {
    /// Target session.
    pub session_id: Option<String>,
    /// `true` targets the player, `false` the opponent.
    pub is_player: bool,
    /// New goal. 0 when absent or non-numeric.
    pub goal: i64,
}

impl GoalRequest {
    /// Decode from an arbitrary JSON value.
    pub fn from_value(value: &Value) -> Self {
        Self {
            session_id: session_id_field(value),
            is_player: truthy(value.get("isPlayer")),
            goal: number_or_zero(value.get("goal")),
        }
    }
}

/// Result of a momentum update; also the broadcast message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MomentumChanged {
    /// Side that was updated.
    pub is_player: bool,
    /// Stored momentum of that side after the update.
    pub new_momentum: i64,
}

/// Result of a goal update; also the broadcast message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalChanged {
    /// Side that was updated.
    pub is_player: bool,
    /// Stored goal of that side after the update.
    pub new_goal: i64,
}

/// A state change as published on a session channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateChange {
    /// `{ isPlayer, newMomentum }`
    Momentum(MomentumChanged),
    /// `{ isPlayer, newGoal }`
    Goal(GoalChanged),
}

/// Subscription action carried by a WebSocket envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeKind {
    /// Join the session's channel.
    Subscribe,
    /// Leave the session's channel.
    Unsubscribe,
}

/// `{ sessionId, type }` message sent by clients over the WebSocket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Session whose channel is targeted.
    pub session_id: String,
    /// What to do.
    #[serde(rename = "type")]
    pub kind: EnvelopeKind,
}

impl Envelope {
    /// Parse a raw text frame. Anything malformed, unknown, or with an
    /// empty session ID yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }
        let envelope: Self = serde_json::from_str(raw).ok()?;
        (!envelope.session_id.is_empty()).then_some(envelope)
    }
}

/// JavaScript truthiness of an optional JSON value.
pub fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

/// Integer value of a JSON number, truncated toward zero; 0 otherwise.
#[allow(clippy::cast_possible_truncation)]
pub fn number_or_zero(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        _ => 0,
    }
}

fn session_id_field(value: &Value) -> Option<String> {
    value
        .get("sessionId")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}
