//! Composite provider dispatching to named schemes.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use relay_core::config::AuthConfig;
use relay_core::result::AppResult;
use relay_tenant::Tenant;

use super::rest::RestProvider;
use super::simple::SimpleProvider;
use super::{AuthDecision, AuthorizationProvider};
use crate::context::HandshakeContext;

/// Holds the registered schemes and evaluates a tenant's `auths` list.
///
/// Names are matched case-insensitively. Schemes listed by a tenant but not
/// registered here are skipped.
#[derive(Debug, Default, Clone)]
pub struct SelectiveProvider {
    providers: HashMap<String, Arc<dyn AuthorizationProvider>>,
}

impl SelectiveProvider {
    /// Creates an empty selector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the simple scheme, and the REST scheme when configured.
    pub fn from_config(config: &AuthConfig) -> AppResult<Self> {
        let mut selector = Self::new();
        selector.register(Arc::new(SimpleProvider::from_config(&config.simple)));
        if let Some(rest) = &config.rest {
            selector.register(Arc::new(RestProvider::from_config(rest)?));
        }
        info!(schemes = ?selector.schemes(), "Authorization providers registered");
        Ok(selector)
    }

    /// Registers a provider under its own name, replacing any previous one.
    pub fn register(&mut self, provider: Arc<dyn AuthorizationProvider>) {
        self.providers
            .insert(provider.name().to_lowercase(), provider);
    }

    /// Looks up a provider by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn AuthorizationProvider>> {
        self.providers.get(&name.to_lowercase())
    }

    /// Registered scheme names, sorted.
    pub fn schemes(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Tries each of the tenant's schemes in order; the first allow wins.
    ///
    /// Does not touch the context.
    pub async fn evaluate(&self, tenant: &Tenant, ctx: &HandshakeContext) -> AuthDecision {
        let mut last = AuthDecision::deny("no registered scheme for tenant");

        for scheme in tenant.auths() {
            let Some(provider) = self.get(scheme) else {
                debug!(tenant = %tenant.id(), scheme = %scheme, "Scheme not registered, skipping");
                continue;
            };

            match provider.authorize(ctx).await {
                AuthDecision::Allow(desc) => {
                    debug!(tenant = %tenant.id(), scheme = %scheme, peer_id = %desc.id, "Scheme accepted peer");
                    return AuthDecision::Allow(desc);
                }
                deny => {
                    debug!(tenant = %tenant.id(), scheme = %scheme, decision = ?deny, "Scheme rejected peer");
                    last = deny;
                }
            }
        }

        last
    }

    /// Like [`evaluate`](Self::evaluate), and on success rotates the
    /// handshake's session id.
    pub async fn authorize(&self, tenant: &Tenant, ctx: &mut HandshakeContext) -> AuthDecision {
        let decision = self.evaluate(tenant, ctx).await;
        if decision.is_allowed() {
            ctx.rotate_session();
        }
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use relay_core::types::TenantDocument;

    use crate::context::PeerDescriptor;

    #[derive(Debug)]
    struct Fixed {
        name: &'static str,
        allow: bool,
    }

    #[async_trait]
    impl AuthorizationProvider for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        async fn authorize(&self, _ctx: &HandshakeContext) -> AuthDecision {
            if self.allow {
                AuthDecision::Allow(PeerDescriptor::new(self.name, "producer"))
            } else {
                AuthDecision::deny(self.name)
            }
        }
    }

    fn tenant(auths: &[&str]) -> Tenant {
        Tenant::new(
            "acme",
            TenantDocument {
                available: true,
                auths: auths.iter().map(|a| a.to_string()).collect(),
                ..Default::default()
            },
        )
    }

    fn selector() -> SelectiveProvider {
        let mut selector = SelectiveProvider::new();
        selector.register(Arc::new(Fixed { name: "no", allow: false }));
        selector.register(Arc::new(Fixed { name: "Yes", allow: true }));
        selector
    }

    #[tokio::test]
    async fn test_first_allow_wins_and_rotates_session() {
        let mut ctx = HandshakeContext::from_query([("tenant", "acme")]);
        let before = ctx.session_id();

        let decision = selector().authorize(&tenant(&["no", "YES"]), &mut ctx).await;
        match decision {
            AuthDecision::Allow(desc) => assert_eq!(desc.id, "Yes"),
            other => panic!("expected allow, got {other:?}"),
        }
        assert_ne!(ctx.session_id(), before);
    }

    #[tokio::test]
    async fn test_unregistered_schemes_skipped() {
        let mut ctx = HandshakeContext::from_query([("tenant", "acme")]);
        let decision = selector().authorize(&tenant(&["ldap", "yes"]), &mut ctx).await;
        assert!(decision.is_allowed());
    }

    #[tokio::test]
    async fn test_all_deny() {
        let mut ctx = HandshakeContext::from_query([("tenant", "acme")]);
        let before = ctx.session_id();
        let decision = selector().authorize(&tenant(&["no", "ldap"]), &mut ctx).await;
        assert!(!decision.is_allowed());
        assert_eq!(ctx.session_id(), before);
    }

    #[test]
    fn test_from_config_registers_simple_only() {
        let selector = SelectiveProvider::from_config(&AuthConfig::default()).unwrap();
        assert_eq!(selector.schemes(), vec!["simple".to_string()]);
    }
}
