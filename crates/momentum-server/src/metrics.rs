//! Prometheus metrics recorder and metric names.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Install the Prometheus metrics recorder (global).
///
/// Returns the `PrometheusHandle` used to render the `/metrics` endpoint.
/// Call once at startup before any metrics are recorded.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    info!("prometheus metrics recorder installed");
    Ok(handle)
}

/// A handle that renders metrics without being installed globally.
///
/// Used by tests and embedders that manage their own recorder.
pub fn detached_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}

// Metric name constants to avoid typos across modules.

/// Sessions created (counter, labels: origin = `generated` | `requested`).
pub const SESSIONS_CREATED_TOTAL: &str = "sessions_created_total";
/// Sessions deleted by the reaper (counter).
pub const SESSIONS_RECLAIMED_TOTAL: &str = "sessions_reclaimed_total";
/// Live sessions (gauge).
pub const SESSIONS_ACTIVE: &str = "sessions_active";
/// Reclaim timers that found their session watched again (counter).
pub const SESSIONS_REVIVED_TOTAL: &str = "sessions_revived_total";
/// Applied state mutations (counter, labels: kind = `momentum` | `goal`).
pub const MUTATIONS_TOTAL: &str = "mutations_total";
/// Rejected state mutations (counter, labels: kind, error_type).
pub const MUTATION_ERRORS_TOTAL: &str = "mutation_errors_total";
/// WebSocket connections opened total (counter).
pub const WS_CONNECTIONS_TOTAL: &str = "ws_connections_total";
/// WebSocket disconnections total (counter).
pub const WS_DISCONNECTIONS_TOTAL: &str = "ws_disconnections_total";
/// Active WebSocket connections (gauge).
pub const WS_CONNECTIONS_ACTIVE: &str = "ws_connections_active";
/// WebSocket connection duration (histogram).
pub const WS_CONNECTION_DURATION_SECONDS: &str = "ws_connection_duration_seconds";
/// Broadcast messages dropped on full or closed queues (counter).
pub const WS_BROADCAST_DROPS_TOTAL: &str = "ws_broadcast_drops_total";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detached_handle_renders() {
        let handle = detached_handle();
        let output = handle.render();
        assert!(output.is_empty() || output.contains('#') || output.contains('\n'));
    }

    #[test]
    fn metric_constants_are_snake_case() {
        let names = [
            SESSIONS_CREATED_TOTAL,
            SESSIONS_RECLAIMED_TOTAL,
            SESSIONS_ACTIVE,
            SESSIONS_REVIVED_TOTAL,
            MUTATIONS_TOTAL,
            MUTATION_ERRORS_TOTAL,
            WS_CONNECTIONS_TOTAL,
            WS_DISCONNECTIONS_TOTAL,
            WS_CONNECTIONS_ACTIVE,
            WS_CONNECTION_DURATION_SECONDS,
            WS_BROADCAST_DROPS_TOTAL,
        ];
        for name in names {
            assert!(
                name.chars().all(|c| c.is_ascii_lowercase() || c == '_'),
                "metric name '{name}' must be snake_case"
            );
        }
    }
}
