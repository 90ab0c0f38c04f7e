//! Error taxonomy for session operations.

use thiserror::Error;

use crate::ids::SessionId;

/// Failure of a session operation.
///
/// Callers map these onto their transport: the HTTP layer answers 400 for
/// [`HubError::MissingSessionId`], 400 or 404 for
/// [`HubError::SessionNotFound`] depending on the endpoint, and an opaque
/// 500 for [`HubError::Internal`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum HubError {
    /// The request carried no usable session identifier.
    #[error("Session ID is required")]
    MissingSessionId,
    /// The identifier is not present in the store.
    #[error("No Session was found")]
    SessionNotFound(SessionId),
    /// Anything unexpected. The message is for logs, not for clients.
    #[error("internal error: {0}")]
    Internal(String),
}

impl HubError {
    /// Short classification string for logging/metrics.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::MissingSessionId => "missing_session_id",
            Self::SessionNotFound(_) => "session_not_found",
            Self::Internal(_) => "internal",
        }
    }

    /// Whether the failure was caused by the request rather than the server.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Internal(_))
    }
}

impl From<serde_json::Error> for HubError {
    fn from(e: serde_json::Error) -> Self {
        Self::Internal(e.to_string())
    }
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, HubError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_client_facing_text() {
        assert_eq!(HubError::MissingSessionId.to_string(), "Session ID is required");
        assert_eq!(
            HubError::SessionNotFound(SessionId::from("AB12")).to_string(),
            "No Session was found"
        );
    }

    #[test]
    fn error_kind_strings() {
        assert_eq!(HubError::MissingSessionId.error_kind(), "missing_session_id");
        assert_eq!(
            HubError::SessionNotFound(SessionId::from("X")).error_kind(),
            "session_not_found"
        );
        assert_eq!(HubError::Internal("boom".into()).error_kind(), "internal");
    }

    #[test]
    fn client_error_classification() {
        assert!(HubError::MissingSessionId.is_client_error());
        assert!(HubError::SessionNotFound(SessionId::from("X")).is_client_error());
        assert!(!HubError::Internal("boom".into()).is_client_error());
    }

    #[test]
    fn json_error_converts_to_internal() {
        let json_err = serde_json::from_str::<serde_json::Value>("{bad").unwrap_err();
        let err: HubError = json_err.into();
        assert!(matches!(err, HubError::Internal(_)));
    }
}
