//! `leave` handler.

use std::sync::Arc;

use async_trait::async_trait;

use crate::message::builder::{build_error, build_success};
use crate::message::envelope::{ChannelSpec, EventEnvelope};
use crate::peer::Peer;

use super::{Ack, EventHandler, HandlerContext, LEAVE_EVENT};

/// Leaves each named channel. No access check: a peer may always leave.
#[derive(Debug, Default)]
pub struct LeaveHandler;

#[async_trait]
impl EventHandler for LeaveHandler {
    fn name(&self) -> &str {
        LEAVE_EVENT
    }

    async fn handle(&self, ctx: &HandlerContext, peer: &Arc<Peer>, envelope: EventEnvelope, ack: Ack) {
        let channels = match envelope.channel {
            Some(ChannelSpec::One(channel)) if !channel.is_empty() => vec![channel],
            Some(ChannelSpec::Many(channels)) if !channels.is_empty() => channels,
            _ => {
                ctx.reject(
                    peer,
                    build_error(
                        Some(self.name()),
                        envelope.transaction,
                        "Missing channel parameter",
                    ),
                );
                return;
            }
        };

        for channel in &channels {
            peer.leave(channel);
        }

        ack.notify(peer, &build_success(Some(self.name()), envelope.transaction));
    }
}
