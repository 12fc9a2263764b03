//! Inbound event dispatch.
//!
//! The router owns one handler per event name. Before a handler runs, the
//! tenant's event whitelist and the event's peer-type filter are checked;
//! failures are reported to the originating peer only.

pub mod generic;
pub mod join;
pub mod leave;
pub mod publish;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use relay_auth::AuthorizationChain;
use relay_core::config::BrokerConfig;

use crate::message::builder::build_error;
use crate::message::envelope::EventEnvelope;
use crate::message::types::{Frame, Reply};
use crate::metrics::BrokerMetrics;
use crate::peer::Peer;

pub use generic::GenericPublishHandler;
pub use join::JoinHandler;
pub use leave::LeaveHandler;
pub use publish::PublishHandler;

/// Event name of the join handler.
pub const JOIN_EVENT: &str = "join";
/// Event name of the leave handler.
pub const LEAVE_EVENT: &str = "leave";
/// Event name of the publish handler.
pub const PUBLISH_EVENT: &str = "publish";

/// Acknowledgement request attached to an inbound frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ack(Option<u64>);

impl Ack {
    /// Wraps the frame's ack id.
    pub fn new(id: Option<u64>) -> Self {
        Self(id)
    }

    /// Whether the client asked for an acknowledgement.
    pub fn requested(&self) -> bool {
        self.0.is_some()
    }

    /// Sends `reply` as the acknowledgement, if one was requested.
    pub fn notify(&self, peer: &Peer, reply: &Reply) {
        if let Some(id) = self.0 {
            peer.acknowledge(id, reply);
        }
    }
}

/// Shared services handed to every handler invocation.
#[derive(Debug, Clone)]
pub struct HandlerContext {
    /// Metrics collector.
    pub metrics: Arc<BrokerMetrics>,
    /// Delay before a non-durable peer is disconnected after publishing.
    pub terminate_delay: Duration,
}

impl HandlerContext {
    /// Sends a scoped error to `peer`.
    pub fn reject(&self, peer: &Peer, reply: Reply) {
        self.metrics.error_sent();
        peer.error(&reply);
    }

    /// Disconnects a non-durable peer after the configured delay.
    pub fn terminate_if_ephemeral(&self, peer: &Peer) {
        if peer.is_durable() {
            return;
        }
        self.metrics.peer_terminated();
        debug!(peer_id = %peer.id(), delay_ms = self.terminate_delay.as_millis() as u64, "Scheduling termination");
        peer.terminate(self.terminate_delay);
    }
}

/// A protocol handler for one inbound event.
#[async_trait]
pub trait EventHandler: Send + Sync + std::fmt::Debug + 'static {
    /// Name used in error and ack replies.
    fn name(&self) -> &str;

    /// Processes one envelope from `peer`.
    async fn handle(&self, ctx: &HandlerContext, peer: &Arc<Peer>, envelope: EventEnvelope, ack: Ack);
}

#[derive(Debug)]
struct Route {
    handler: Arc<dyn EventHandler>,
    accessible_by: HashSet<String>,
}

/// Event name → handler table.
#[derive(Debug)]
pub struct EventRouter {
    routes: HashMap<String, Route>,
    context: HandlerContext,
    access: HashMap<String, HashSet<String>>,
}

impl EventRouter {
    /// Creates an empty router.
    pub fn new(config: &BrokerConfig, metrics: Arc<BrokerMetrics>) -> Self {
        Self {
            routes: HashMap::new(),
            context: HandlerContext {
                metrics,
                terminate_delay: Duration::from_millis(config.terminate_delay_ms),
            },
            access: config
                .events
                .iter()
                .map(|(event, cfg)| {
                    (
                        event.clone(),
                        cfg.accessible_by
                            .iter()
                            .map(|t| t.trim().to_string())
                            .filter(|t| !t.is_empty())
                            .collect(),
                    )
                })
                .collect(),
        }
    }

    /// Creates a router with `join`, `leave`, `publish`, and the configured
    /// generic-publish event.
    pub fn with_default_handlers(
        config: &BrokerConfig,
        chain: Arc<AuthorizationChain>,
        metrics: Arc<BrokerMetrics>,
    ) -> Self {
        let mut router = Self::new(config, metrics);
        router.register(JOIN_EVENT, Arc::new(JoinHandler));
        router.register(LEAVE_EVENT, Arc::new(LeaveHandler));
        router.register(PUBLISH_EVENT, Arc::new(PublishHandler));
        router.register(
            &config.generic_event,
            Arc::new(GenericPublishHandler::new(&config.generic_event, chain)),
        );
        info!(events = ?router.events(), "Event handlers registered");
        router
    }

    /// Registers a handler, applying any configured `accessible_by` filter.
    pub fn register(&mut self, event: &str, handler: Arc<dyn EventHandler>) {
        let accessible_by = self.access.get(event).cloned().unwrap_or_default();
        self.routes.insert(
            event.to_string(),
            Route {
                handler,
                accessible_by,
            },
        );
    }

    /// Registered event names, sorted.
    pub fn events(&self) -> Vec<String> {
        let mut events: Vec<String> = self.routes.keys().cloned().collect();
        events.sort();
        events
    }

    /// Shared handler services.
    pub fn context(&self) -> &HandlerContext {
        &self.context
    }

    /// Routes one inbound frame.
    pub async fn dispatch(&self, peer: &Arc<Peer>, frame: Frame) {
        self.context.metrics.message_received();
        let event = frame.event.as_str();

        let Some(route) = self.routes.get(event) else {
            self.context
                .reject(peer, build_error(Some(event), None, "Unsupported event"));
            return;
        };

        if !peer.tenant().supports(event) {
            self.context.reject(
                peer,
                build_error(Some(event), None, "Unauthorized tenant action"),
            );
            return;
        }

        if !peer.is(&route.accessible_by) {
            self.context.reject(
                peer,
                build_error(Some(event), None, "Unauthorized peer action"),
            );
            return;
        }

        let envelope = if frame.data.is_null() {
            EventEnvelope::default()
        } else {
            match serde_json::from_value::<EventEnvelope>(frame.data) {
                Ok(envelope) => envelope,
                Err(e) => {
                    debug!(peer_id = %peer.id(), event = %event, error = %e, "Invalid envelope");
                    self.context
                        .reject(peer, build_error(Some(event), None, "Invalid message"));
                    return;
                }
            }
        };

        route
            .handler
            .handle(&self.context, peer, envelope, Ack::new(frame.ack))
            .await;
    }
}

/// Joins rejected channel names for an aggregated error.
pub(crate) fn join_names(names: &[String]) -> String {
    names.join(", ")
}
