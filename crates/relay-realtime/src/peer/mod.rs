//! Per-connection peer identity and channel access.

pub mod info;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use relay_auth::context::UNKNOWN_PEER_TYPE;
use relay_auth::{ChannelAcl, HandshakeContext, PeerDescriptor};
use relay_tenant::Tenant;

use crate::connection::handle::ConnectionId;
use crate::message::types::{ERROR_EVENT, Frame, MESSAGE_EVENT, Reply};
use crate::transport::Transport;

pub use info::{PeerInfo, RuleInfo};

/// Peer type that passes every type filter.
pub const JOKER_PEER_TYPE: &str = "joker";

/// Attributes a refresh may replace.
#[derive(Debug)]
struct PeerState {
    peer_type: String,
    durable: bool,
    mono_channel: bool,
    acl: ChannelAcl,
    notify_on_disconnect: Option<String>,
}

impl From<&PeerDescriptor> for PeerState {
    fn from(desc: &PeerDescriptor) -> Self {
        Self {
            peer_type: desc.peer_type.clone(),
            durable: desc.durable,
            mono_channel: desc.mono_channel,
            acl: ChannelAcl::parse(&desc.channels),
            notify_on_disconnect: desc
                .notify_on_disconnect
                .clone()
                .filter(|c| !c.trim().is_empty()),
        }
    }
}

/// One authenticated connection.
///
/// Belongs to exactly one tenant for its whole life. Channel names given to
/// `join`, `leave`, `broadcast` and `send` are mapped to the tenant's room
/// names before reaching the transport.
#[derive(Debug)]
pub struct Peer {
    conn_id: ConnectionId,
    id: String,
    tenant: Arc<Tenant>,
    state: ArcSwap<PeerState>,
    /// Original handshake, kept for refresh.
    handshake: HandshakeContext,
    transport: Arc<dyn Transport>,
    connected_at: DateTime<Utc>,
}

impl Peer {
    /// Materializes a peer from the attributes resolved at handshake.
    pub fn new(
        conn_id: ConnectionId,
        tenant: Arc<Tenant>,
        descriptor: &PeerDescriptor,
        handshake: HandshakeContext,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            conn_id,
            id: descriptor.id.clone(),
            tenant,
            state: ArcSwap::from_pointee(PeerState::from(descriptor)),
            handshake,
            transport,
            connected_at: Utc::now(),
        }
    }

    /// Connection this peer is attached to.
    pub fn conn_id(&self) -> ConnectionId {
        self.conn_id
    }

    /// Peer id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Owning tenant.
    pub fn tenant(&self) -> &Arc<Tenant> {
        &self.tenant
    }

    /// Peer type.
    pub fn peer_type(&self) -> String {
        self.state.load().peer_type.clone()
    }

    /// Whether the peer stays connected after publishing.
    pub fn is_durable(&self) -> bool {
        self.state.load().durable
    }

    /// Whether the peer may be in at most one room.
    pub fn is_mono_channel(&self) -> bool {
        self.state.load().mono_channel
    }

    /// Channel notified when this peer disconnects.
    pub fn notify_on_disconnect(&self) -> Option<String> {
        self.state.load().notify_on_disconnect.clone()
    }

    /// The handshake this peer was authorized with.
    pub fn handshake(&self) -> &HandshakeContext {
        &self.handshake
    }

    /// Replaces type, durability, and channel rules in place.
    pub fn apply(&self, descriptor: &PeerDescriptor) {
        self.state.store(Arc::new(PeerState::from(descriptor)));
        debug!(peer_id = %self.id, "Peer attributes refreshed");
    }

    /// Whether any of the peer's rules grants `channel`.
    pub fn has_access(&self, channel: &str) -> bool {
        self.state.load().acl.has_access(channel)
    }

    /// Join check: mono-channel peers already in a room are refused outright.
    pub fn can_join(&self, channel: &str) -> bool {
        if self.is_mono_channel() && !self.transport.rooms(self.conn_id).is_empty() {
            return false;
        }
        self.has_access(channel)
    }

    /// Publish check.
    pub fn can_publish(&self, channel: &str) -> bool {
        self.has_access(channel)
    }

    /// Type filter: `unknown` never matches, an empty filter or `joker`
    /// always does.
    pub fn is(&self, types: &HashSet<String>) -> bool {
        let state = self.state.load();
        if state.peer_type == UNKNOWN_PEER_TYPE {
            return false;
        }
        if types.is_empty() || state.peer_type == JOKER_PEER_TYPE {
            return true;
        }
        types.contains(&state.peer_type)
    }

    /// Channels the peer is currently in.
    pub fn joined(&self) -> HashSet<String> {
        self.transport
            .rooms(self.conn_id)
            .iter()
            .map(|room| self.tenant.channel_name(room).to_string())
            .collect()
    }

    /// Joins the room backing `channel`.
    pub fn join(&self, channel: &str) {
        self.transport
            .join(self.conn_id, &self.tenant.room_name(channel));
    }

    /// Leaves the room backing `channel`.
    pub fn leave(&self, channel: &str) {
        self.transport
            .leave(self.conn_id, &self.tenant.room_name(channel));
    }

    /// Broadcasts `data` to `channel` as a `message` event.
    pub fn broadcast(&self, channel: &str, data: Value) -> usize {
        self.send(MESSAGE_EVENT, channel, data)
    }

    /// Broadcasts `data` to `channel` under a custom event name.
    pub fn send(&self, event: &str, channel: &str, data: Value) -> usize {
        let room = self.tenant.room_name(channel);
        let delivered = self.transport.broadcast(&room, &Frame::new(event, data));
        debug!(peer_id = %self.id, room = %room, event = %event, delivered, "Broadcast");
        delivered
    }

    /// Sends an event to this peer only.
    pub fn trigger(&self, event: &str, payload: &impl Serialize) -> bool {
        match serde_json::to_value(payload) {
            Ok(data) => self.transport.send(self.conn_id, Frame::new(event, data)),
            Err(e) => {
                warn!(peer_id = %self.id, event = %event, error = %e, "Failed to encode payload");
                false
            }
        }
    }

    /// Sends a scoped error reply.
    pub fn error(&self, reply: &Reply) -> bool {
        debug!(peer_id = %self.id, reason = ?reply.reason, "Error reply");
        self.trigger(ERROR_EVENT, reply)
    }

    /// Answers acknowledgement request `id`.
    pub fn acknowledge(&self, id: u64, reply: &Reply) -> bool {
        match serde_json::to_value(reply) {
            Ok(data) => self.transport.send(self.conn_id, Frame::ack(id, data)),
            Err(e) => {
                warn!(peer_id = %self.id, error = %e, "Failed to encode ack");
                false
            }
        }
    }

    /// Disconnects the peer after `delay`.
    ///
    /// There is no cancellation; if the connection is already gone when
    /// the timer fires, nothing happens.
    pub fn terminate(&self, delay: Duration) -> JoinHandle<()> {
        let transport = self.transport.clone();
        let conn_id = self.conn_id;
        let peer_id = self.id.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if transport.disconnect(conn_id) {
                debug!(peer_id = %peer_id, conn_id = %conn_id, "Peer terminated");
            }
        })
    }

    /// Serializable snapshot.
    pub fn info(&self) -> PeerInfo {
        let state = self.state.load();
        let mut joined: Vec<String> = self.joined().into_iter().collect();
        joined.sort();
        let mut channels: Vec<RuleInfo> = state.acl.rules().map(RuleInfo::from).collect();
        channels.sort_by(|a, b| a.name.cmp(&b.name));

        PeerInfo {
            id: self.id.clone(),
            peer_type: state.peer_type.clone(),
            tenant: self.tenant.id().to_string(),
            channels,
            durable: state.durable,
            mono_channel: state.mono_channel,
            notify_on_disconnect: state.notify_on_disconnect.clone(),
            joined,
            connected_at: self.connected_at,
        }
    }
}
