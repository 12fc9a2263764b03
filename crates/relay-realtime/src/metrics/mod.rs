//! Broker metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Broker-level metrics counters.
#[derive(Debug, Default)]
pub struct BrokerMetrics {
    /// Connections established
    pub connections_total: AtomicU64,
    /// Connections currently open
    pub connections_active: AtomicU64,
    /// Handshakes rejected by the authorization chain
    pub handshakes_rejected: AtomicU64,
    /// Inbound frames processed
    pub messages_received: AtomicU64,
    /// Frames delivered by room broadcasts
    pub messages_delivered: AtomicU64,
    /// Scoped error replies sent
    pub errors_sent: AtomicU64,
    /// Peers scheduled for termination after publishing
    pub peers_terminated: AtomicU64,
}

impl BrokerMetrics {
    /// Create new zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an accepted connection
    pub fn connection_opened(&self) {
        self.connections_total.fetch_add(1, Ordering::Relaxed);
        self.connections_active.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a closed connection
    pub fn connection_closed(&self) {
        let _ = self
            .connections_active
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    /// Record a rejected handshake
    pub fn handshake_rejected(&self) {
        self.handshakes_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an inbound frame
    pub fn message_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record frames delivered by a broadcast
    pub fn messages_delivered(&self, count: usize) {
        self.messages_delivered
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Record a scoped error reply
    pub fn error_sent(&self) {
        self.errors_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a scheduled termination
    pub fn peer_terminated(&self) {
        self.peers_terminated.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_total: self.connections_total.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            handshakes_rejected: self.handshakes_rejected.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            messages_delivered: self.messages_delivered.load(Ordering::Relaxed),
            errors_sent: self.errors_sent.load(Ordering::Relaxed),
            peers_terminated: self.peers_terminated.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Connections established
    pub connections_total: u64,
    /// Connections currently open
    pub connections_active: u64,
    /// Handshakes rejected
    pub handshakes_rejected: u64,
    /// Inbound frames processed
    pub messages_received: u64,
    /// Frames delivered by broadcasts
    pub messages_delivered: u64,
    /// Error replies sent
    pub errors_sent: u64,
    /// Peers terminated after publishing
    pub peers_terminated: u64,
}
