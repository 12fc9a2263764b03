//! `join` handler.

use std::sync::Arc;

use async_trait::async_trait;

use crate::message::builder::build_error;
use crate::message::envelope::{ChannelSpec, EventEnvelope};
use crate::peer::Peer;

use super::{Ack, EventHandler, HandlerContext, JOIN_EVENT, join_names};

/// Joins the peer to each requested channel it may join.
///
/// A single denied channel aborts; in array form the allowed channels are
/// joined and the denied ones reported together. No acknowledgement.
#[derive(Debug, Default)]
pub struct JoinHandler;

#[async_trait]
impl EventHandler for JoinHandler {
    fn name(&self) -> &str {
        JOIN_EVENT
    }

    async fn handle(&self, ctx: &HandlerContext, peer: &Arc<Peer>, envelope: EventEnvelope, _ack: Ack) {
        let transaction = envelope.transaction;

        match envelope.channel {
            Some(ChannelSpec::One(channel)) if !channel.is_empty() => {
                if !peer.can_join(&channel) {
                    ctx.reject(
                        peer,
                        build_error(
                            Some(self.name()),
                            transaction,
                            format!(
                                "Unauthorized action. Can't join channel. MonoChannel: {}",
                                peer.is_mono_channel()
                            ),
                        ),
                    );
                    return;
                }
                peer.join(&channel);
            }
            Some(ChannelSpec::Many(channels)) if !channels.is_empty() => {
                let mut rejected = Vec::new();
                for channel in channels {
                    if peer.can_join(&channel) {
                        peer.join(&channel);
                    } else {
                        rejected.push(channel);
                    }
                }
                if !rejected.is_empty() {
                    ctx.reject(
                        peer,
                        build_error(
                            Some(self.name()),
                            transaction,
                            format!("Cant join {}", join_names(&rejected)),
                        ),
                    );
                }
            }
            _ => {
                ctx.reject(
                    peer,
                    build_error(Some(self.name()), transaction, "Missing channel parameter"),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::peer::tests::{descriptor, make_peer, tenant};
    use crate::router::tests::{context, drain, envelope};
    use crate::transport::{RoomHub, Transport};

    #[tokio::test]
    async fn test_join_single() {
        let hub = Arc::new(RoomHub::new(8));
        let (peer, mut rx) = make_peer(&hub, tenant("acme", false), descriptor("consumer", &["orders"]));

        JoinHandler
            .handle(&context(), &peer, envelope(json!({"channel": "orders"})), Ack::new(Some(1)))
            .await;
        assert!(hub.room_exists("orders"));
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_join_single_denied() {
        let hub = Arc::new(RoomHub::new(8));
        let (peer, mut rx) = make_peer(&hub, tenant("acme", false), descriptor("consumer", &["orders"]));

        JoinHandler
            .handle(&context(), &peer, envelope(json!({"channel": "invoices", "transaction": "t1"})), Ack::default())
            .await;
        assert!(!hub.room_exists("invoices"));

        let frames = drain(&mut rx);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event, "error");
        assert_eq!(frames[0].data["status"], "error");
        assert_eq!(frames[0].data["transaction"], "t1");
        assert_eq!(
            frames[0].data["reason"],
            "Unauthorized action. Can't join channel. MonoChannel: false"
        );
    }

    #[tokio::test]
    async fn test_join_array_partial() {
        let hub = Arc::new(RoomHub::new(8));
        let (peer, mut rx) = make_peer(&hub, tenant("acme", false), descriptor("consumer", &["team.*"]));

        JoinHandler
            .handle(
                &context(),
                &peer,
                envelope(json!({"channel": ["team.sales", "finance", "team.ops", "hr"]})),
                Ack::default(),
            )
            .await;

        assert_eq!(hub.rooms(peer.conn_id()).len(), 2);
        let frames = drain(&mut rx);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data["reason"], "Cant join finance, hr");
    }

    #[tokio::test]
    async fn test_mono_channel_array() {
        let hub = Arc::new(RoomHub::new(8));
        let mut desc = descriptor("consumer", &["*"]);
        desc.mono_channel = true;
        let (peer, mut rx) = make_peer(&hub, tenant("acme", false), desc);

        JoinHandler
            .handle(&context(), &peer, envelope(json!({"channel": ["a", "b"]})), Ack::default())
            .await;
        assert!(hub.room_exists("a"));
        assert!(!hub.room_exists("b"));
        assert_eq!(drain(&mut rx)[0].data["reason"], "Cant join b");
    }

    #[tokio::test]
    async fn test_missing_channel() {
        let hub = Arc::new(RoomHub::new(8));
        let (peer, mut rx) = make_peer(&hub, tenant("acme", false), descriptor("consumer", &["*"]));

        for body in [json!({}), json!({"channel": ""}), json!({"channel": []})] {
            JoinHandler
                .handle(&context(), &peer, envelope(body), Ack::default())
                .await;
            assert_eq!(drain(&mut rx)[0].data["reason"], "Missing channel parameter");
        }
    }
}
