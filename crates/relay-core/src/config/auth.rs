//! Authorization provider configuration.

use serde::{Deserialize, Serialize};

/// Settings for the authorization providers registered with the chain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Static-credential provider (`simple` scheme).
    #[serde(default)]
    pub simple: SimpleAuthConfig,
    /// Delegated REST provider (`rest` scheme). Not registered when absent.
    #[serde(default)]
    pub rest: Option<RestAuthConfig>,
}

/// Static-credential table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimpleAuthConfig {
    /// Known peers.
    #[serde(default)]
    pub peers: Vec<PeerRecord>,
}

/// A statically configured peer credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerRecord {
    /// Peer id (left side of the `peerId:secret` token).
    pub id: String,
    /// Tenant the peer belongs to.
    pub tenant: String,
    /// Peer type (producer, consumer, node, joker, ...).
    #[serde(rename = "type")]
    pub peer_type: String,
    /// Shared secret.
    pub key: String,
    /// Whether the peer stays connected after publishing.
    #[serde(default = "default_true")]
    pub durable: bool,
    /// Whether the peer may only be in one room at a time.
    #[serde(default)]
    pub mono_channel: bool,
    /// Channel grants in `name[:r|w|x]` form.
    #[serde(default)]
    pub channels: Vec<String>,
    /// Channel notified when the peer disconnects.
    #[serde(default)]
    pub notify_on_disconnect: Option<String>,
}

/// How credentials are forwarded to the remote authorization endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestAuthMode {
    /// HTTP Basic authorization header.
    #[default]
    Basic,
    /// URL-encoded form body.
    Form,
}

/// Delegated REST provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestAuthConfig {
    /// Endpoint receiving the credential check (POST).
    pub endpoint: String,
    /// Credential forwarding mode.
    #[serde(default)]
    pub mode: RestAuthMode,
    /// Form field carrying the peer id (form mode only).
    #[serde(default = "default_peer_id_field")]
    pub peer_id_field: String,
    /// Form field carrying the secret (form mode only).
    #[serde(default = "default_peer_key_field")]
    pub peer_key_field: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Local override table consulted before calling out.
    #[serde(default)]
    pub peers: Vec<PeerRecord>,
}

fn default_true() -> bool {
    true
}

fn default_peer_id_field() -> String {
    "peer".to_string()
}

fn default_peer_key_field() -> String {
    "key".to_string()
}

fn default_timeout() -> u64 {
    5
}
