//! The `peerId:secret` token.

use std::fmt;

/// Credentials carried by the handshake `token` parameter.
#[derive(Clone, PartialEq, Eq)]
pub struct PeerCredentials {
    /// Peer id.
    pub peer_id: String,
    /// Shared secret.
    pub secret: String,
}

impl PeerCredentials {
    /// Splits a token at its first `:`. Both halves must be non-empty.
    pub fn parse(token: &str) -> Option<Self> {
        let (peer_id, secret) = token.split_once(':')?;
        if peer_id.is_empty() || secret.is_empty() {
            return None;
        }
        Some(Self {
            peer_id: peer_id.to_string(),
            secret: secret.to_string(),
        })
    }
}

impl fmt::Debug for PeerCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeerCredentials")
            .field("peer_id", &self.peer_id)
            .field("secret", &"<redacted>")
            .finish()
    }
}
