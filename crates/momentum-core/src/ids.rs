//! Session identifiers, channel identifiers, and the short-ID generator.
//!
//! Session IDs are short upper-case strings meant to be read aloud or typed
//! by a friend ("join me on `K7QZ`"). They are generated from a URL-safe
//! 64-symbol alphabet and checked for collisions against the live store.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default number of characters in a generated session ID.
pub const DEFAULT_ID_LENGTH: usize = 4;

/// Length of the unchecked fallback ID used once retries are exhausted.
pub const DEFAULT_FALLBACK_ID_LENGTH: usize = 5;

/// How many collisions are tolerated before falling back.
pub const DEFAULT_MAX_ID_ATTEMPTS: u32 = 100;

/// Symbol substituted for the two byte values outside the 62-symbol core.
const SENTINEL: char = 'Z';

/// Identifier of a shared session.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wrap an existing identifier verbatim (bookmarked or typed links).
    #[must_use]
    pub fn from_string(s: String) -> Self {
        Self(s)
    }

    /// Return the inner string as a slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume self and return the inner `String`.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::ops::Deref for SessionId {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for SessionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Kind of broadcast channel. Only watcher channels exist today.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// Viewers of a session's momentum/goal state.
    Watcher,
}

impl ChannelKind {
    /// Name prefix used when the channel is rendered as a string.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Watcher => "watcher_",
        }
    }
}

/// Publish/subscribe channel identifier, derived from a session ID.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChannelId {
    kind: ChannelKind,
    session_id: SessionId,
}

impl ChannelId {
    /// The watcher channel for a session.
    #[must_use]
    pub fn watcher(session_id: &SessionId) -> Self {
        Self {
            kind: ChannelKind::Watcher,
            session_id: session_id.clone(),
        }
    }

    /// Channel kind.
    pub fn kind(&self) -> ChannelKind {
        self.kind
    }

    /// Session this channel belongs to.
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.session_id)
    }
}

/// Map a random byte onto the 64-symbol URL-safe alphabet.
///
/// The low six bits select `0-9a-z` (0..36), `A-Z` (36..62), or the
/// sentinel for the remaining two values.
fn encode_symbol(byte: u8) -> char {
    let b = byte & 63;
    if b < 36 {
        char::from_digit(u32::from(b), 36).unwrap_or(SENTINEL)
    } else if b < 62 {
        char::from(b'A' + (b - 36))
    } else {
        SENTINEL
    }
}

/// Produce a random upper-cased candidate of `len` characters.
pub fn random_id(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| encode_symbol(rng.random::<u8>()))
        .collect::<String>()
        .to_uppercase()
}

/// Generates collision-checked session IDs.
#[derive(Clone, Debug)]
pub struct IdGenerator {
    length: usize,
    fallback_length: usize,
    max_attempts: u32,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new(
            DEFAULT_ID_LENGTH,
            DEFAULT_FALLBACK_ID_LENGTH,
            DEFAULT_MAX_ID_ATTEMPTS,
        )
    }
}

impl IdGenerator {
    /// Create a generator with explicit lengths and retry bound.
    pub fn new(length: usize, fallback_length: usize, max_attempts: u32) -> Self {
        Self {
            length: length.max(1),
            fallback_length: fallback_length.max(1),
            max_attempts,
        }
    }

    /// Primary ID length.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Generate an ID for which `is_taken` returns `false`.
    ///
    /// After `max_attempts` collisions a single longer ID is returned
    /// without checking it. Uniqueness is therefore probabilistic at that
    /// point, not guaranteed.
    pub fn generate(&self, is_taken: impl Fn(&str) -> bool) -> SessionId {
        for _attempt in 0..self.max_attempts {
            let candidate = random_id(self.length);
            if !is_taken(&candidate) {
                return SessionId(candidate);
            }
        }
        warn!(
            attempts = self.max_attempts,
            fallback_length = self.fallback_length,
            "session ID retries exhausted, using unchecked longer ID"
        );
        SessionId(random_id(self.fallback_length))
    }
}
