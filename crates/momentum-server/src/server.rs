//! `MomentumServer`: Axum HTTP + WebSocket server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::Response;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::http;
use crate::hub::SessionHub;
use crate::shutdown::ShutdownCoordinator;
use crate::websocket::connection::ConnectionId;
use crate::websocket::session::{WsSessionConfig, run_ws_session};

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Session hub.
    pub hub: Arc<SessionHub>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Prometheus handle for `/metrics`.
    pub metrics: PrometheusHandle,
    /// Shutdown coordinator.
    pub shutdown: Arc<ShutdownCoordinator>,
    /// Port written into the served page.
    pub page_port: u16,
}

/// The momentum tracker server.
pub struct MomentumServer {
    config: Arc<ServerConfig>,
    hub: Arc<SessionHub>,
    metrics: PrometheusHandle,
    shutdown: Arc<ShutdownCoordinator>,
}

impl MomentumServer {
    /// Create a new server around `hub`.
    pub fn new(config: ServerConfig, hub: Arc<SessionHub>, metrics: PrometheusHandle) -> Self {
        Self {
            config: Arc::new(config),
            hub,
            metrics,
            shutdown: Arc::new(ShutdownCoordinator::new()),
        }
    }

    /// Build the Axum router with all routes, advertising the configured port.
    pub fn router(&self) -> Router {
        self.router_with_port(self.config.public_port.unwrap_or(self.config.port))
    }

    fn router_with_port(&self, page_port: u16) -> Router {
        let state = AppState {
            hub: Arc::clone(&self.hub),
            config: Arc::clone(&self.config),
            metrics: self.metrics.clone(),
            shutdown: Arc::clone(&self.shutdown),
            page_port,
        };

        Router::new()
            .route("/", get(http::page_handler))
            .route("/ws", get(ws_handler))
            .route("/momentum", post(http::momentum_handler))
            .route("/goal", post(http::goal_handler))
            .route("/state", get(http::state_handler))
            .route("/health", get(http::health_handler))
            .route("/metrics", get(http::metrics_handler))
            .fallback(http::not_found_handler)
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Bind the configured address and serve in a background task.
    ///
    /// Returns the bound address and the serving task. The task finishes
    /// once the shutdown coordinator fires and in-flight requests drain.
    pub async fn listen(&self) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        let local_addr = listener.local_addr()?;
        let router = self.router_with_port(self.config.public_port.unwrap_or(local_addr.port()));

        info!(
            addr = %local_addr,
            public_hostname = %self.config.public_hostname,
            "momentum server listening"
        );

        let token = self.shutdown.token();
        let handle = tokio::spawn(async move {
            let result = axum::serve(listener, router)
                .with_graceful_shutdown(token.cancelled_owned())
                .await;
            if let Err(e) = result {
                error!(error = %e, "server terminated with error");
            }
        });
        Ok((local_addr, handle))
    }

    /// Get the session hub.
    pub fn hub(&self) -> &Arc<SessionHub> {
        &self.hub
    }

    /// Get the shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// GET /ws
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let conn_id = ConnectionId::new();
    let config = WsSessionConfig {
        heartbeat_interval: state.config.heartbeat_interval(),
        heartbeat_timeout: state.config.heartbeat_timeout(),
        send_queue_capacity: state.config.send_queue_capacity,
    };
    let hub = state.hub;
    let token = state.shutdown.token();
    ws.max_message_size(state.config.max_message_size)
        .on_upgrade(move |socket| run_ws_session(socket, conn_id, hub, config, token))
}
