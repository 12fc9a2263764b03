//! Response DTOs.

use serde::{Deserialize, Serialize};

use relay_realtime::MetricsSnapshot;

/// Result of `POST /broadcast`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastResponse {
    /// Server time of the broadcast.
    pub timestamp: String,
    /// `1` when every requested room received the event, else `0`.
    pub ack: u8,
    /// Channels that received the event.
    pub channel: Vec<String>,
}

/// Result of `POST /tenants/reload`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReloadResponse {
    /// Number of tenants now known.
    pub tenants: usize,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Seconds since start.
    pub uptime_seconds: u64,
    /// Known tenants.
    pub tenants: usize,
    /// Connected peers.
    pub connections: usize,
    /// Non-empty rooms.
    pub rooms: usize,
    /// Broker counters.
    pub metrics: MetricsSnapshot,
}
