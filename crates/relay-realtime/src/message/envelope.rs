//! Inbound event envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A channel name or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChannelSpec {
    /// `"orders"`
    One(String),
    /// `["orders", "invoices"]`
    Many(Vec<String>),
}

/// Body of `join`, `leave`, `publish`, and generic-publish events.
///
/// A `data` of JSON `null` is treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    /// Custom event name (generic publish only).
    #[serde(default)]
    pub event: Option<String>,
    /// Target channel(s).
    #[serde(default)]
    pub channel: Option<ChannelSpec>,
    /// Opaque payload.
    #[serde(default)]
    pub data: Option<Value>,
    /// Opaque correlation token.
    #[serde(default)]
    pub transaction: Option<Value>,
    /// Re-resolve the peer's permissions first (generic publish only).
    #[serde(default)]
    pub refresh_peer: bool,
}
