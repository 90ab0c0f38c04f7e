//! HTTP route handlers.
//!
//! Mutation bodies are decoded leniently from raw bytes so that wrong
//! types fall back to defaults instead of failing extraction.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use momentum_core::HubError;
use momentum_core::wire::{GoalRequest, MomentumRequest};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::health;
use crate::page::{MAIN_PAGE, PageContext, render_page};
use crate::server::AppState;

/// Query string of `GET /`.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// Session to show. Absent or empty means a new one.
    pub id: Option<String>,
}

/// Query string of `GET /state`.
#[derive(Debug, Default, Deserialize)]
pub struct StateQuery {
    /// Session to read.
    pub id: Option<String>,
    /// Alias of `id`.
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

impl StateQuery {
    fn target(&self) -> Option<&str> {
        self.id
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.session_id.as_deref().filter(|s| !s.is_empty()))
    }
}

/// GET /
pub async fn page_handler(State(state): State<AppState>, Query(query): Query<PageQuery>) -> Response {
    let (session_id, snapshot) = state.hub.resolve_session(query.id.as_deref());
    debug!(session_id = %session_id, sessions = state.hub.session_count(), "serving page");
    let ctx = PageContext {
        hostname: &state.config.public_hostname,
        port: state.page_port,
        session_id: session_id.as_str(),
        snapshot,
    };
    let body = render_page(MAIN_PAGE, &ctx);
    ([(header::CONTENT_TYPE, "text/html;charset=utf-8")], body).into_response()
}

/// POST /momentum
pub async fn momentum_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let value = match parse_body(&body) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let req = MomentumRequest::from_value(&value);
    match state.hub.apply_momentum(&req) {
        Ok(changed) => Json(changed).into_response(),
        Err(err) => error_response(&err),
    }
}

/// POST /goal
pub async fn goal_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let value = match parse_body(&body) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let req = GoalRequest::from_value(&value);
    match state.hub.apply_goal(&req) {
        Ok(changed) => Json(changed).into_response(),
        Err(err) => error_response(&err),
    }
}

/// GET /state
pub async fn state_handler(State(state): State<AppState>, Query(query): Query<StateQuery>) -> Response {
    let Some(id) = query.target() else {
        return (StatusCode::NOT_FOUND, Json(json!({}))).into_response();
    };
    match state.hub.query_state(id) {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(_) => (StatusCode::NOT_FOUND, Json(json!({}))).into_response(),
    }
}

/// GET /health
pub async fn health_handler() -> Json<health::HealthResponse> {
    Json(health::health_check())
}

/// GET /metrics
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Any route not matched above.
pub async fn not_found_handler() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not found")
}

fn parse_body(body: &Bytes) -> Result<Value, Response> {
    serde_json::from_slice::<Value>(body).map_err(|e| {
        warn!(error = %e, "rejecting unparseable request body");
        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({}))).into_response()
    })
}

fn error_response(err: &HubError) -> Response {
    if err.is_client_error() {
        (StatusCode::BAD_REQUEST, err.to_string()).into_response()
    } else {
        warn!(error = %err, "mutation failed");
        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({}))).into_response()
    }
}
