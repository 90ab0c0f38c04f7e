//! Per-session fan-out to subscribed WebSocket clients.
//!
//! Each session has one watcher channel. Publishing enqueues the message
//! onto every member's outbound queue without waiting, so a slow client
//! never holds up the others.

use std::collections::HashMap;
use std::sync::Arc;

use metrics::counter;
use momentum_core::ChannelId;
use parking_lot::RwLock;
use tracing::{debug, warn};

use super::connection::{ClientConnection, ConnectionId};
use crate::metrics::WS_BROADCAST_DROPS_TOTAL;

type Members = HashMap<ConnectionId, Arc<ClientConnection>>;

/// Tracks live connections and which channels each one has joined.
#[derive(Default)]
pub struct BroadcastManager {
    connections: RwLock<Members>,
    channels: RwLock<HashMap<ChannelId, Members>>,
}

impl BroadcastManager {
    /// Create a new broadcast manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a live connection.
    pub fn add(&self, connection: Arc<ClientConnection>) {
        let _ = self.connections.write().insert(connection.id.clone(), connection);
    }

    /// Forget a connection and drop it from every channel it joined.
    ///
    /// Returns the channels it was a member of.
    pub fn remove(&self, connection_id: &ConnectionId) -> Vec<ChannelId> {
        let _ = self.connections.write().remove(connection_id);
        let mut channels = self.channels.write();
        let mut left = Vec::new();
        channels.retain(|channel, members| {
            if members.remove(connection_id).is_some() {
                left.push(channel.clone());
            }
            !members.is_empty()
        });
        left
    }

    /// Add a connection to a channel. Returns `false` if it was already a
    /// member.
    pub fn subscribe(&self, channel: &ChannelId, connection: &Arc<ClientConnection>) -> bool {
        self.channels
            .write()
            .entry(channel.clone())
            .or_default()
            .insert(connection.id.clone(), Arc::clone(connection))
            .is_none()
    }

    /// Remove a connection from a channel. Returns `false` if it was not a
    /// member.
    pub fn unsubscribe(&self, channel: &ChannelId, connection_id: &ConnectionId) -> bool {
        let mut channels = self.channels.write();
        let Some(members) = channels.get_mut(channel) else {
            return false;
        };
        let removed = members.remove(connection_id).is_some();
        if members.is_empty() {
            let _ = channels.remove(channel);
        }
        removed
    }

    /// Enqueue `message` for every member of `channel`.
    ///
    /// Returns how many members accepted it. Members whose queue is full or
    /// closed miss this message.
    pub fn publish(&self, channel: &ChannelId, message: &Arc<String>) -> usize {
        let channels = self.channels.read();
        let Some(members) = channels.get(channel) else {
            debug!(%channel, "publish to channel without members");
            return 0;
        };
        let mut delivered = 0;
        for conn in members.values() {
            if conn.send(Arc::clone(message)) {
                delivered += 1;
            } else {
                counter!(WS_BROADCAST_DROPS_TOTAL).increment(1);
                warn!(conn_id = %conn.id, %channel, "failed to enqueue broadcast (queue full or closed)");
            }
        }
        debug!(%channel, recipients = members.len(), delivered, "published to channel");
        delivered
    }

    /// Number of members of a channel.
    pub fn subscriber_count(&self, channel: &ChannelId) -> usize {
        self.channels.read().get(channel).map_or(0, HashMap::len)
    }

    /// Number of live connections.
    pub fn connection_count(&self) -> usize {
        self.connections.read().len()
    }
}
