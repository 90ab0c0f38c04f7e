//! `/health` endpoint.

use serde::Serialize;

/// Liveness acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the server is running.
    pub status: &'static str,
}

/// Build the health response. It never consults session state.
pub fn health_check() -> HealthResponse {
    HealthResponse { status: "ok" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_ok() {
        assert_eq!(health_check().status, "ok");
    }

    #[test]
    fn serializes_to_fixed_body() {
        let json = serde_json::to_value(health_check()).unwrap();
        assert_eq!(json, serde_json::json!({"status": "ok"}));
    }
}
