//! Static-credential provider.

use async_trait::async_trait;
use tracing::debug;

use relay_core::config::{PeerRecord, SimpleAuthConfig};

use super::credentials::PeerCredentials;
use super::table::PeerTable;
use super::{AuthDecision, AuthorizationProvider};
use crate::context::HandshakeContext;

/// Scheme name of the static-credential provider.
pub const SIMPLE_SCHEME: &str = "simple";

/// Checks `peerId:secret` tokens against a preconfigured table.
#[derive(Debug)]
pub struct SimpleProvider {
    table: PeerTable,
}

impl SimpleProvider {
    /// Creates the provider from configured records.
    pub fn new(records: impl IntoIterator<Item = PeerRecord>) -> Self {
        Self {
            table: PeerTable::new(records),
        }
    }

    /// Creates the provider from the `auth.simple` section.
    pub fn from_config(config: &SimpleAuthConfig) -> Self {
        Self::new(config.peers.iter().cloned())
    }

    /// The backing table, for live replacement.
    pub fn table(&self) -> &PeerTable {
        &self.table
    }
}

#[async_trait]
impl AuthorizationProvider for SimpleProvider {
    fn name(&self) -> &str {
        SIMPLE_SCHEME
    }

    async fn authorize(&self, ctx: &HandshakeContext) -> AuthDecision {
        let Some(creds) = ctx.token().and_then(PeerCredentials::parse) else {
            return AuthDecision::deny("missing or malformed token");
        };
        let tenant = ctx.tenant().unwrap_or_default();

        let decision = self
            .table
            .verify(&creds, tenant)
            .unwrap_or_else(|| AuthDecision::deny(format!("unknown peer '{}'", creds.peer_id)));
        debug!(peer_id = %creds.peer_id, tenant = %tenant, allowed = decision.is_allowed(), "Static credential check");
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::table::tests::record;

    fn provider() -> SimpleProvider {
        SimpleProvider::new([record("svc1", "acme", "producer", "s3cr3t")])
    }

    fn ctx(tenant: &str, token: &str) -> HandshakeContext {
        HandshakeContext::from_query([("tenant", tenant), ("token", token)])
    }

    #[tokio::test]
    async fn test_valid_credentials() {
        match provider().authorize(&ctx("acme", "svc1:s3cr3t")).await {
            AuthDecision::Allow(desc) => {
                assert_eq!(desc.id, "svc1");
                assert_eq!(desc.peer_type, "producer");
            }
            other => panic!("expected allow, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_wrong_key() {
        let decision = provider().authorize(&ctx("acme", "svc1:wrong")).await;
        assert!(!decision.is_allowed());
    }

    #[tokio::test]
    async fn test_wrong_tenant() {
        let decision = provider().authorize(&ctx("other", "svc1:s3cr3t")).await;
        assert!(!decision.is_allowed());
    }

    #[tokio::test]
    async fn test_unknown_peer_and_missing_token() {
        assert!(!provider().authorize(&ctx("acme", "nobody:x")).await.is_allowed());
        let no_token = HandshakeContext::from_query([("tenant", "acme")]);
        assert!(!provider().authorize(&no_token).await.is_allowed());
    }
}
