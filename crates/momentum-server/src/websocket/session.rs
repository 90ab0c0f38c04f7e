//! WebSocket session lifecycle: one connected client from upgrade through
//! disconnect.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use metrics::{counter, gauge, histogram};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::connection::{ClientConnection, ConnectionId};
use super::heartbeat::{HeartbeatResult, run_heartbeat};
use crate::hub::SessionHub;
use crate::metrics::{
    WS_CONNECTION_DURATION_SECONDS, WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_DISCONNECTIONS_TOTAL,
};

/// Transport settings for one WebSocket session.
#[derive(Debug, Clone, Copy)]
pub struct WsSessionConfig {
    /// Interval between server pings and liveness checks.
    pub heartbeat_interval: Duration,
    /// Silence after which the client is disconnected.
    pub heartbeat_timeout: Duration,
    /// Outbound queue length.
    pub send_queue_capacity: usize,
}

/// Run a WebSocket session for a connected client.
///
/// 1. Registers the connection with the broadcast manager
/// 2. Forwards queued broadcasts and periodic pings to the socket
/// 3. Feeds inbound text frames to the hub as subscription envelopes
/// 4. Disconnects clients that stay silent past the heartbeat timeout
/// 5. On disconnect, releases every session the client was watching
#[instrument(skip_all, fields(conn_id = %conn_id))]
pub async fn run_ws_session(
    ws: WebSocket,
    conn_id: ConnectionId,
    hub: Arc<SessionHub>,
    config: WsSessionConfig,
    shutdown: CancellationToken,
) {
    let (mut ws_tx, mut ws_rx) = ws.split();

    let (send_tx, mut send_rx) = mpsc::channel::<Arc<String>>(config.send_queue_capacity.max(1));
    let connection = Arc::new(ClientConnection::new(conn_id.clone(), send_tx));
    hub.broadcast().add(Arc::clone(&connection));

    let started = Instant::now();
    info!(connections = hub.broadcast().connection_count(), "client connected");
    counter!(WS_CONNECTIONS_TOTAL).increment(1);
    gauge!(WS_CONNECTIONS_ACTIVE).increment(1.0);

    let session_cancel = shutdown.child_token();

    // Outbound forwarder with periodic Ping frames.
    let ping_interval = config.heartbeat_interval;
    let outbound_cancel = session_cancel.clone();
    let outbound = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(ping_interval);
        let _ = ticker.tick().await;
        loop {
            tokio::select! {
                msg = send_rx.recv() => {
                    let Some(text) = msg else { break };
                    if ws_tx.send(Message::Text(text.as_str().to_owned().into())).await.is_err() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    if ws_tx.send(Message::Ping(axum::body::Bytes::new())).await.is_err() {
                        break;
                    }
                }
                () = outbound_cancel.cancelled() => {
                    let _ = ws_tx.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    });

    let mut heartbeat = tokio::spawn(run_heartbeat(
        Arc::clone(&connection),
        config.heartbeat_interval,
        config.heartbeat_timeout,
        session_cancel.clone(),
    ));

    loop {
        tokio::select! {
            frame = ws_rx.next() => {
                let Some(Ok(frame)) = frame else { break };
                connection.mark_alive();
                match frame {
                    Message::Text(text) => hub.on_connection_message(&connection, text.as_str()),
                    Message::Binary(data) => match std::str::from_utf8(&data) {
                        Ok(text) => hub.on_connection_message(&connection, text),
                        Err(_) => debug!(len = data.len(), "ignoring non-UTF8 binary frame"),
                    },
                    Message::Close(_) => {
                        info!("client sent close frame");
                        break;
                    }
                    Message::Ping(_) | Message::Pong(_) => {}
                }
            }
            result = &mut heartbeat => {
                if matches!(result, Ok(HeartbeatResult::TimedOut)) {
                    warn!(timeout_secs = config.heartbeat_timeout.as_secs(), "client unresponsive, disconnecting");
                }
                break;
            }
            () = session_cancel.cancelled() => {
                debug!("server shutting down, closing connection");
                break;
            }
        }
    }

    session_cancel.cancel();
    hub.on_connection_closed(&conn_id);

    info!(dropped = connection.drop_count(), "client disconnected");
    counter!(WS_DISCONNECTIONS_TOTAL).increment(1);
    gauge!(WS_CONNECTIONS_ACTIVE).decrement(1.0);
    histogram!(WS_CONNECTION_DURATION_SECONDS).record(started.elapsed().as_secs_f64());

    let _ = tokio::time::timeout(Duration::from_secs(1), outbound).await;
    heartbeat.abort();
}
