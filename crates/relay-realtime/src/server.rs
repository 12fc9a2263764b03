//! Broker composition root.

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use relay_auth::{AuthorizationChain, HandshakeContext};
use relay_core::config::BrokerConfig;
use relay_core::error::AppError;
use relay_core::result::AppResult;
use relay_tenant::{Tenant, TenantRegistry};

use crate::connection::handle::ConnectionId;
use crate::message::builder::{build_error, utc_now};
use crate::message::serializer::deserialize_frame;
use crate::message::types::{DISCONNECTED_EVENT, Frame, OutboundMessage};
use crate::message::validator::validate_inbound;
use crate::metrics::{BrokerMetrics, MetricsSnapshot};
use crate::peer::Peer;
use crate::router::EventRouter;
use crate::transport::{RoomHub, Transport};

/// Result of a server-initiated broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BroadcastOutcome {
    /// Channels that existed and received the event.
    pub delivered: Vec<String>,
    /// Channels with no room.
    pub missing: Vec<String>,
    /// Server time of the broadcast.
    pub timestamp: String,
}

/// Owns the tenant registry, authorization chain, room hub, and event
/// router, and tracks one [`Peer`] per open connection.
#[derive(Clone)]
pub struct Broker {
    config: BrokerConfig,
    chain: Arc<AuthorizationChain>,
    hub: Arc<RoomHub>,
    router: Arc<EventRouter>,
    metrics: Arc<BrokerMetrics>,
    peers: Arc<DashMap<ConnectionId, Arc<Peer>>>,
}

impl std::fmt::Debug for Broker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broker")
            .field("connections", &self.peers.len())
            .field("events", &self.router.events())
            .finish()
    }
}

impl Broker {
    /// Creates a broker with the default event handlers.
    pub fn new(config: BrokerConfig, chain: Arc<AuthorizationChain>) -> Self {
        let metrics = Arc::new(BrokerMetrics::new());
        let hub = Arc::new(RoomHub::new(config.channel_buffer_size));
        let router = Arc::new(EventRouter::with_default_handlers(
            &config,
            chain.clone(),
            metrics.clone(),
        ));

        info!(
            generic_event = %config.generic_event,
            terminate_delay_ms = config.terminate_delay_ms,
            "Broker initialized"
        );

        Self {
            config,
            chain,
            hub,
            router,
            metrics,
            peers: Arc::new(DashMap::new()),
        }
    }

    /// The tenant registry.
    pub fn tenants(&self) -> &Arc<TenantRegistry> {
        self.chain.tenants()
    }

    /// The authorization chain.
    pub fn chain(&self) -> &Arc<AuthorizationChain> {
        &self.chain
    }

    /// The in-process transport.
    pub fn hub(&self) -> &Arc<RoomHub> {
        &self.hub
    }

    /// Broker settings.
    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }

    /// Runs the authorization chain for a connection attempt.
    pub async fn authorize(&self, ctx: &mut HandshakeContext) -> AppResult<Arc<Tenant>> {
        self.chain.authorize(ctx).await.inspect_err(|_| {
            self.metrics.handshake_rejected();
        })
    }

    /// Materializes the peer for an authorized handshake.
    ///
    /// Returns the peer and the receiver the connection's writer drains.
    pub fn connect(
        &self,
        tenant: Arc<Tenant>,
        mut ctx: HandshakeContext,
    ) -> AppResult<(Arc<Peer>, mpsc::Receiver<OutboundMessage>)> {
        let Some(descriptor) = ctx.take_peer() else {
            return Err(AppError::internal("Handshake context has no authorized peer"));
        };

        let (handle, rx) = self.hub.open_with(ctx.session_id());
        let transport: Arc<dyn Transport> = self.hub.clone();
        let peer = Arc::new(Peer::new(handle.id, tenant, &descriptor, ctx, transport));
        self.peers.insert(handle.id, peer.clone());
        self.metrics.connection_opened();

        info!(
            conn_id = %handle.id,
            peer_id = %peer.id(),
            peer_type = %descriptor.peer_type,
            tenant = %peer.tenant().id(),
            "Peer connected"
        );

        Ok((peer, rx))
    }

    /// Decodes and routes one inbound text frame.
    pub async fn handle_text(&self, conn_id: &ConnectionId, raw: &str) {
        let Some(peer) = self.peer(conn_id) else {
            warn!(conn_id = %conn_id, "Frame from unknown connection");
            return;
        };

        if let Err(e) = validate_inbound(raw, self.config.max_message_size) {
            self.metrics.error_sent();
            peer.error(&build_error(None, None, e.message));
            return;
        }

        let frame = match deserialize_frame(raw) {
            Ok(frame) => frame,
            Err(e) => {
                debug!(conn_id = %conn_id, error = %e, "Undecodable frame");
                self.metrics.error_sent();
                peer.error(&build_error(None, None, "Invalid message"));
                return;
            }
        };

        self.router.dispatch(&peer, frame).await;
    }

    /// Tears down a connection's peer.
    ///
    /// Safe to call more than once; only the first call notifies the peer's
    /// disconnect channel.
    pub fn disconnect(&self, conn_id: &ConnectionId) {
        let Some((_, peer)) = self.peers.remove(conn_id) else {
            return;
        };

        self.hub.disconnect(*conn_id);
        self.metrics.connection_closed();

        if let Some(channel) = peer.notify_on_disconnect() {
            let payload = json!({ "peer": peer.id(), "type": peer.peer_type() });
            let delivered = peer.send(DISCONNECTED_EVENT, &channel, payload);
            self.metrics.messages_delivered(delivered);
        }

        info!(conn_id = %conn_id, peer_id = %peer.id(), tenant = %peer.tenant().id(), "Peer disconnected");
    }

    /// Sends `event` to each existing room named by `channels`.
    ///
    /// With a tenant, channel names are mapped to that tenant's rooms.
    pub fn broadcast(
        &self,
        tenant: Option<&Tenant>,
        event: &str,
        channels: &[String],
        data: Value,
    ) -> BroadcastOutcome {
        let mut delivered = Vec::new();
        let mut missing = Vec::new();

        for channel in channels {
            let room = match tenant {
                Some(tenant) => tenant.room_name(channel),
                None => channel.clone(),
            };
            if !self.hub.room_exists(&room) {
                missing.push(channel.clone());
                continue;
            }
            let count = self.hub.broadcast(&room, &Frame::new(event, data.clone()));
            self.metrics.messages_delivered(count);
            delivered.push(channel.clone());
        }

        debug!(event = %event, delivered = delivered.len(), missing = missing.len(), "Server broadcast");
        BroadcastOutcome {
            delivered,
            missing,
            timestamp: utc_now(),
        }
    }

    /// Looks up the peer attached to a connection.
    pub fn peer(&self, conn_id: &ConnectionId) -> Option<Arc<Peer>> {
        self.peers.get(conn_id).map(|entry| entry.value().clone())
    }

    /// Number of connected peers.
    pub fn connection_count(&self) -> usize {
        self.peers.len()
    }

    /// Number of non-empty rooms.
    pub fn room_count(&self) -> usize {
        self.hub.room_count()
    }

    /// Current metrics.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Closes every connection.
    pub fn shutdown(&self) {
        info!("Shutting down broker");
        let ids: Vec<ConnectionId> = self.peers.iter().map(|entry| *entry.key()).collect();
        for conn_id in &ids {
            self.disconnect(conn_id);
        }
        self.hub.close_all();
        info!(closed = ids.len(), "Broker shut down");
    }
}
