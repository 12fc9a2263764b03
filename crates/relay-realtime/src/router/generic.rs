//! Generic-publish handler.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use relay_auth::AuthorizationChain;

use crate::message::builder::{build_error, build_success};
use crate::message::envelope::{ChannelSpec, EventEnvelope};
use crate::peer::Peer;

use super::{Ack, EventHandler, HandlerContext, join_names};

/// Sends `data` under the envelope's own event name to each channel the
/// peer may publish to.
///
/// With `refreshPeer` set, the peer's attributes are re-resolved through
/// the authorization chain first; a failed refresh aborts the request.
/// Replies echo the client's `transaction` token.
#[derive(Debug)]
pub struct GenericPublishHandler {
    name: String,
    chain: Arc<AuthorizationChain>,
}

impl GenericPublishHandler {
    /// Creates the handler registered under `name`.
    pub fn new(name: impl Into<String>, chain: Arc<AuthorizationChain>) -> Self {
        Self {
            name: name.into(),
            chain,
        }
    }
}

#[async_trait]
impl EventHandler for GenericPublishHandler {
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, ctx: &HandlerContext, peer: &Arc<Peer>, envelope: EventEnvelope, ack: Ack) {
        let transaction = envelope.transaction;

        let Some(event) = envelope.event.filter(|e| !e.trim().is_empty()) else {
            ctx.reject(
                peer,
                build_error(Some(self.name()), transaction, "Missing event parameter"),
            );
            return;
        };

        let Some(data) = envelope.data else {
            ctx.reject(
                peer,
                build_error(Some(self.name()), transaction, "No data to broadcast"),
            );
            return;
        };

        let channels = match envelope.channel {
            Some(ChannelSpec::One(channel)) if !channel.is_empty() => ChannelSpec::One(channel),
            Some(ChannelSpec::Many(channels)) if !channels.is_empty() => ChannelSpec::Many(channels),
            _ => {
                ctx.reject(
                    peer,
                    build_error(Some(self.name()), transaction, "Missing channel parameter"),
                );
                return;
            }
        };

        if envelope.refresh_peer {
            match self.chain.refresh(peer.handshake()).await {
                Ok(descriptor) => peer.apply(&descriptor),
                Err(e) => {
                    warn!(peer_id = %peer.id(), error = %e, "Peer refresh failed");
                    ctx.reject(
                        peer,
                        build_error(Some(self.name()), transaction, "Peer refresh failed"),
                    );
                    return;
                }
            }
        }

        match channels {
            ChannelSpec::One(channel) => {
                if !peer.can_publish(&channel) {
                    ctx.reject(
                        peer,
                        build_error(Some(self.name()), transaction, "Unauthorized action"),
                    );
                    return;
                }
                ctx.metrics
                    .messages_delivered(peer.send(&event, &channel, data));
            }
            ChannelSpec::Many(channels) => {
                let mut rejected = Vec::new();
                for channel in channels {
                    if peer.can_publish(&channel) {
                        ctx.metrics
                            .messages_delivered(peer.send(&event, &channel, data.clone()));
                    } else {
                        rejected.push(channel);
                    }
                }
                if !rejected.is_empty() {
                    ctx.reject(
                        peer,
                        build_error(
                            Some(self.name()),
                            transaction.clone(),
                            format!("Cant publish to {}", join_names(&rejected)),
                        ),
                    );
                }
            }
        }

        ack.notify(peer, &build_success(Some(self.name()), transaction));
        ctx.terminate_if_ephemeral(peer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use relay_core::config::PeerRecord;

    use crate::peer::tests::{descriptor, make_peer, tenant};
    use crate::router::tests::{chain, context, drain, envelope};
    use crate::transport::RoomHub;

    fn record(channels: &[&str]) -> PeerRecord {
        PeerRecord {
            id: "p1".to_string(),
            tenant: "acme".to_string(),
            peer_type: "producer".to_string(),
            key: "k".to_string(),
            durable: true,
            mono_channel: false,
            channels: channels.iter().map(|c| c.to_string()).collect(),
            notify_on_disconnect: None,
        }
    }

    #[tokio::test]
    async fn test_custom_event_and_transaction_echo() {
        let hub = Arc::new(RoomHub::new(8));
        let acme = tenant("acme", false);
        let (peer, mut rx) = make_peer(&hub, acme.clone(), descriptor("producer", &["ticker"]));
        let (listener, mut listener_rx) = make_peer(&hub, acme, descriptor("consumer", &["*"]));
        listener.join("ticker");

        let handler = GenericPublishHandler::new("send", chain(vec![]).await);
        handler
            .handle(
                &context(),
                &peer,
                envelope(json!({
                    "event": "price",
                    "channel": ["ticker", "secret"],
                    "data": {"px": 101},
                    "transaction": "tx-9"
                })),
                Ack::new(Some(2)),
            )
            .await;

        let delivered = drain(&mut listener_rx);
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].event, "price");
        assert_eq!(delivered[0].data, json!({"px": 101}));

        let replies = drain(&mut rx);
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0].data["reason"], "Cant publish to secret");
        assert_eq!(replies[0].data["transaction"], "tx-9");
        assert_eq!(replies[1].event, "ack");
        assert_eq!(replies[1].data["transaction"], "tx-9");
        assert_eq!(replies[1].data["event"], "send");
        assert!(replies[1].data["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_publish_ignores_mono_channel() {
        let hub = Arc::new(RoomHub::new(8));
        let mut desc = descriptor("producer", &["*"]);
        desc.mono_channel = true;
        let (peer, mut rx) = make_peer(&hub, tenant("acme", false), desc);
        peer.join("lobby");

        let handler = GenericPublishHandler::new("send", chain(vec![]).await);
        handler
            .handle(
                &context(),
                &peer,
                envelope(json!({"event": "note", "channel": "lobby", "data": 1})),
                Ack::default(),
            )
            .await;

        let frames = drain(&mut rx);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event, "note");
    }

    #[tokio::test]
    async fn test_missing_fields() {
        let hub = Arc::new(RoomHub::new(8));
        let (peer, mut rx) = make_peer(&hub, tenant("acme", false), descriptor("producer", &["*"]));
        let handler = GenericPublishHandler::new("send", chain(vec![]).await);

        for (body, reason) in [
            (json!({"channel": ["a"], "data": 1}), "Missing event parameter"),
            (json!({"event": "e", "channel": ["a"]}), "No data to broadcast"),
            (json!({"event": "e", "channel": [], "data": 1}), "Missing channel parameter"),
        ] {
            handler
                .handle(&context(), &peer, envelope(body), Ack::default())
                .await;
            assert_eq!(drain(&mut rx)[0].data["reason"], reason);
        }
    }

    #[tokio::test]
    async fn test_refresh_replaces_rules() {
        let hub = Arc::new(RoomHub::new(8));
        let acme = tenant("acme", false);
        let (handle, mut rx) = hub.open();
        let ctx = relay_auth::HandshakeContext::from_query([("tenant", "acme"), ("token", "p1:k")]);
        let peer = Arc::new(Peer::new(
            handle.id,
            acme,
            &descriptor("producer", &[]),
            ctx,
            hub.clone(),
        ));

        let handler = GenericPublishHandler::new("send", chain(vec![record(&["orders"])]).await);
        handler
            .handle(
                &context(),
                &peer,
                envelope(json!({"event": "e", "channel": "orders", "data": 1, "refreshPeer": true})),
                Ack::default(),
            )
            .await;

        assert!(peer.has_access("orders"));
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_failed_refresh_aborts() {
        let hub = Arc::new(RoomHub::new(8));
        let (peer, mut rx) = make_peer(&hub, tenant("acme", false), descriptor("producer", &["*"]));
        let handler = GenericPublishHandler::new("send", chain(vec![]).await);

        handler
            .handle(
                &context(),
                &peer,
                envelope(json!({"event": "e", "channel": "orders", "data": 1, "refreshPeer": true})),
                Ack::new(Some(1)),
            )
            .await;

        let frames = drain(&mut rx);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data["reason"], "Peer refresh failed");
        assert!(peer.has_access("orders"));
    }
}
