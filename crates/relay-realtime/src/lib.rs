//! # relay-realtime
//!
//! Real-time engine for the tenant relay. Provides:
//!
//! - Per-connection peers with channel ACLs, mono-channel and durability rules
//! - An in-process room hub (connection pool + room registry) behind the
//!   [`Transport`](transport::Transport) trait
//! - The `join`, `leave`, `publish` and generic-publish protocol handlers
//! - The [`Broker`] composition root tying handshake, peers and routing together

pub mod connection;
pub mod message;
pub mod metrics;
pub mod peer;
pub mod room;
pub mod router;
pub mod server;
pub mod transport;

pub use metrics::{BrokerMetrics, MetricsSnapshot};
pub use peer::Peer;
pub use router::EventRouter;
pub use server::{BroadcastOutcome, Broker};
pub use transport::{RoomHub, Transport};
