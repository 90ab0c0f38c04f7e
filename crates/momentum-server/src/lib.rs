//! # momentum-server
//!
//! Axum HTTP + `WebSocket` server for shared momentum sessions.
//!
//! - HTTP endpoints: page, momentum/goal updates, state query, health, metrics
//! - `WebSocket` gateway: subscription envelopes, heartbeat, per-session fan-out
//! - [`hub::SessionHub`]: the session store, guest accounting and delayed reclaim
//! - Graceful shutdown via `CancellationToken`

#![deny(unsafe_code)]

pub mod config;
pub mod health;
pub mod http;
pub mod hub;
pub mod metrics;
pub mod page;
pub mod reaper;
pub mod server;
pub mod shutdown;
pub mod websocket;

pub use config::ServerConfig;
pub use hub::{HubConfig, SessionHub};
pub use server::MomentumServer;
