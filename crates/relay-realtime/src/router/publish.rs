//! `publish` handler.

use std::sync::Arc;

use async_trait::async_trait;

use crate::message::builder::{build_error, build_success};
use crate::message::envelope::{ChannelSpec, EventEnvelope};
use crate::peer::Peer;

use super::{Ack, EventHandler, HandlerContext, PUBLISH_EVENT, join_names};

/// Broadcasts `data` as a `message` event to each permitted channel.
///
/// Channels are gated with the join check, so a mono-channel peer that is
/// already in a room cannot publish here. Allowed channels are delivered
/// even when others are denied. A non-durable peer is disconnected after
/// the round trip.
#[derive(Debug, Default)]
pub struct PublishHandler;

#[async_trait]
impl EventHandler for PublishHandler {
    fn name(&self) -> &str {
        PUBLISH_EVENT
    }

    async fn handle(&self, ctx: &HandlerContext, peer: &Arc<Peer>, envelope: EventEnvelope, ack: Ack) {
        let transaction = envelope.transaction;

        let Some(data) = envelope.data else {
            ctx.reject(
                peer,
                build_error(Some(self.name()), transaction, "No data to broadcast"),
            );
            return;
        };

        match envelope.channel {
            Some(ChannelSpec::One(channel)) if !channel.is_empty() => {
                if !peer.can_join(&channel) {
                    ctx.reject(
                        peer,
                        build_error(Some(self.name()), transaction, "Unauthorized action"),
                    );
                    return;
                }
                ctx.metrics.messages_delivered(peer.broadcast(&channel, data));
            }
            Some(ChannelSpec::Many(channels)) if !channels.is_empty() => {
                let mut rejected = Vec::new();
                for channel in channels {
                    if peer.can_join(&channel) {
                        ctx.metrics
                            .messages_delivered(peer.broadcast(&channel, data.clone()));
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
                            format!("Cant publish to {}", join_names(&rejected)),
                        ),
                    );
                }
            }
            _ => {
                ctx.reject(
                    peer,
                    build_error(Some(self.name()), transaction, "Missing channel parameter"),
                );
                return;
            }
        }

        ack.notify(peer, &build_success(None, None));
        ctx.terminate_if_ephemeral(peer);
    }
}
