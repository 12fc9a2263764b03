//! Tenant-scoped, fail-closed handshake authorization.

use std::sync::Arc;

use tracing::{info, warn};

use relay_core::error::AppError;
use relay_core::result::AppResult;
use relay_tenant::{Tenant, TenantRegistry};

use crate::context::{HandshakeContext, PeerDescriptor};
use crate::provider::{AuthDecision, SelectiveProvider};

/// Resolves the handshake's tenant and runs its configured schemes.
#[derive(Debug, Clone)]
pub struct AuthorizationChain {
    tenants: Arc<TenantRegistry>,
    selector: Arc<SelectiveProvider>,
}

impl AuthorizationChain {
    /// Creates a chain over a tenant registry and the registered schemes.
    pub fn new(tenants: Arc<TenantRegistry>, selector: SelectiveProvider) -> Self {
        Self {
            tenants,
            selector: Arc::new(selector),
        }
    }

    /// The tenant registry.
    pub fn tenants(&self) -> &Arc<TenantRegistry> {
        &self.tenants
    }

    /// The registered schemes.
    pub fn selector(&self) -> &SelectiveProvider {
        &self.selector
    }

    /// Authorizes a connection attempt.
    ///
    /// On success the resolved peer is attached to `ctx` and the session id
    /// is rotated. Every failure is an authentication error; no partial
    /// state is left on the context.
    pub async fn authorize(&self, ctx: &mut HandshakeContext) -> AppResult<Arc<Tenant>> {
        let tenant = self.resolve_tenant(ctx)?;

        match self.selector.authorize(&tenant, ctx).await {
            AuthDecision::Allow(peer) => {
                info!(tenant = %tenant.id(), peer_id = %peer.id, peer_type = %peer.peer_type, "Peer authorized");
                ctx.set_peer(peer);
                Ok(tenant)
            }
            AuthDecision::Deny(reason) => {
                warn!(tenant = %tenant.id(), reason = %reason, "Handshake rejected");
                Err(AppError::authentication("Not authorized"))
            }
        }
    }

    /// Re-runs the provider step with the original handshake credentials,
    /// without rotating the session.
    pub async fn refresh(&self, ctx: &HandshakeContext) -> AppResult<PeerDescriptor> {
        let tenant = self.resolve_tenant(ctx)?;

        match self.selector.evaluate(&tenant, ctx).await {
            AuthDecision::Allow(peer) => Ok(peer),
            AuthDecision::Deny(reason) => {
                warn!(tenant = %tenant.id(), reason = %reason, "Peer refresh rejected");
                Err(AppError::authentication("Not authorized"))
            }
        }
    }

    fn resolve_tenant(&self, ctx: &HandshakeContext) -> AppResult<Arc<Tenant>> {
        let Some(id) = ctx.tenant() else {
            warn!("Handshake without tenant parameter");
            return Err(AppError::authentication("Missing tenant"));
        };

        let Some(tenant) = self.tenants.get(id) else {
            warn!(tenant = %id, "Handshake for unknown tenant");
            return Err(AppError::authentication(format!("Unknown tenant '{id}'")));
        };

        if !tenant.available() {
            warn!(tenant = %id, "Handshake for unavailable tenant");
            return Err(AppError::authentication(format!(
                "Tenant '{id}' is not available"
            )));
        }

        if tenant.auths().is_empty() {
            warn!(tenant = %id, "Tenant has no authorization schemes");
            return Err(AppError::authentication(format!(
                "Tenant '{id}' has no authorization schemes"
            )));
        }

        Ok(tenant)
    }
}
