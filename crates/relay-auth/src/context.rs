//! Handshake context and the peer attributes resolved from it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use relay_core::config::PeerRecord;

/// Query parameter naming the tenant.
pub const TENANT_PARAM: &str = "tenant";

/// Query parameter carrying the `peerId:secret` token.
pub const TOKEN_PARAM: &str = "token";

/// Peer type that matches no type filter.
pub const UNKNOWN_PEER_TYPE: &str = "unknown";

/// Peer attributes resolved by an authorization provider.
///
/// This is also the JSON body expected from the remote authorization
/// endpoint, so every field except `type` is optional on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerDescriptor {
    /// Peer id.
    #[serde(default)]
    pub id: String,
    /// Peer type.
    #[serde(rename = "type", default = "default_peer_type")]
    pub peer_type: String,
    /// Owning tenant.
    #[serde(default)]
    pub tenant: String,
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

impl PeerDescriptor {
    /// Creates a descriptor with defaults for everything but id and type.
    pub fn new(id: impl Into<String>, peer_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            peer_type: peer_type.into(),
            tenant: String::new(),
            durable: true,
            mono_channel: false,
            channels: Vec::new(),
            notify_on_disconnect: None,
        }
    }
}

impl From<&PeerRecord> for PeerDescriptor {
    fn from(record: &PeerRecord) -> Self {
        Self {
            id: record.id.clone(),
            peer_type: record.peer_type.clone(),
            tenant: record.tenant.clone(),
            durable: record.durable,
            mono_channel: record.mono_channel,
            channels: record.channels.clone(),
            notify_on_disconnect: record.notify_on_disconnect.clone(),
        }
    }
}

fn default_peer_type() -> String {
    UNKNOWN_PEER_TYPE.to_string()
}

fn default_true() -> bool {
    true
}

/// Everything the authorization chain sees of a connection attempt.
///
/// Header names are stored lowercased. The resolved peer is attached by
/// the chain once a provider accepts.
#[derive(Debug, Clone)]
pub struct HandshakeContext {
    query: HashMap<String, String>,
    headers: HashMap<String, String>,
    session_id: Uuid,
    peer: Option<PeerDescriptor>,
}

impl HandshakeContext {
    /// Creates a context from query parameters and headers.
    pub fn new(query: HashMap<String, String>, headers: HashMap<String, String>) -> Self {
        Self {
            query,
            headers: headers
                .into_iter()
                .map(|(k, v)| (k.to_ascii_lowercase(), v))
                .collect(),
            session_id: Uuid::new_v4(),
            peer: None,
        }
    }

    /// Creates a context from query parameters only.
    pub fn from_query<I, K, V>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(
            params
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            HashMap::new(),
        )
    }

    /// The `tenant` parameter, if present and non-empty.
    pub fn tenant(&self) -> Option<&str> {
        self.query_param(TENANT_PARAM)
    }

    /// The `token` parameter, if present and non-empty.
    pub fn token(&self) -> Option<&str> {
        self.query_param(TOKEN_PARAM)
    }

    /// A non-empty query parameter.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// A header value, looked up case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Transport session correlation id.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Replaces the session correlation id, returning the new one.
    pub fn rotate_session(&mut self) -> Uuid {
        self.session_id = Uuid::new_v4();
        self.session_id
    }

    /// Attaches the resolved peer.
    pub fn set_peer(&mut self, peer: PeerDescriptor) {
        self.peer = Some(peer);
    }

    /// The resolved peer, once authorized.
    pub fn peer(&self) -> Option<&PeerDescriptor> {
        self.peer.as_ref()
    }

    /// Detaches the resolved peer.
    pub fn take_peer(&mut self) -> Option<PeerDescriptor> {
        self.peer.take()
    }
}
