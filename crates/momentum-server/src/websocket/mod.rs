//! WebSocket connection management, heartbeat, and per-session broadcasting.

pub mod broadcast;
pub mod connection;
pub mod heartbeat;
pub mod session;
