//! Serializable peer snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use relay_auth::{AccessLevel, ChannelAccessRule};

/// A channel grant as reported in [`PeerInfo`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleInfo {
    /// Channel name or pattern.
    pub name: String,
    /// Granted access.
    pub access: AccessLevel,
}

impl From<&ChannelAccessRule> for RuleInfo {
    fn from(rule: &ChannelAccessRule) -> Self {
        Self {
            name: rule.name().to_string(),
            access: rule.access(),
        }
    }
}

/// Point-in-time view of a peer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerInfo {
    /// Peer id.
    pub id: String,
    /// Peer type.
    #[serde(rename = "type")]
    pub peer_type: String,
    /// Owning tenant.
    pub tenant: String,
    /// Channel grants, sorted by name.
    pub channels: Vec<RuleInfo>,
    /// Durability flag.
    pub durable: bool,
    /// Mono-channel flag.
    pub mono_channel: bool,
    /// Channel notified on disconnect.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_on_disconnect: Option<String>,
    /// Channels currently joined, sorted.
    pub joined: Vec<String>,
    /// When the connection was established.
    pub connected_at: DateTime<Utc>,
}
