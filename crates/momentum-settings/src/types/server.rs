//! Network and transport settings.

use serde::{Deserialize, Serialize};

/// Public origin used when running in production without an explicit
/// hostname override.
pub const PRODUCTION_HOSTNAME: &str = "https://distant-adventures-app.onrender.com";

/// Server network and runtime settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Listen port.
    pub port: u16,
    /// Hostname injected into the served page so the browser knows where
    /// to open its WebSocket.
    pub public_hostname: String,
    /// Production mode. Swaps the default public hostname for
    /// [`PRODUCTION_HOSTNAME`].
    pub production: bool,
    /// Interval between server pings on a WebSocket, in seconds.
    pub heartbeat_interval_secs: u64,
    /// A client silent for this long is disconnected, in seconds.
    pub heartbeat_timeout_secs: u64,
    /// Largest accepted WebSocket frame, in bytes.
    pub max_message_size: usize,
    /// Outbound queue length per connection. Messages beyond it are dropped.
    pub send_queue_capacity: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            public_hostname: "localhost".to_string(),
            production: false,
            heartbeat_interval_secs: 30,
            heartbeat_timeout_secs: 90,
            max_message_size: 64 * 1024,
            send_queue_capacity: 256,
        }
    }
}

impl ServerSettings {
    /// Hostname advertised to clients.
    ///
    /// In production the compiled production origin is used unless the
    /// hostname was changed away from the `localhost` default.
    pub fn effective_public_hostname(&self) -> &str {
        if self.production && self.public_hostname == "localhost" {
            PRODUCTION_HOSTNAME
        } else {
            &self.public_hostname
        }
    }
}
