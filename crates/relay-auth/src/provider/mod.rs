//! Pluggable credential schemes.
//!
//! Each scheme implements [`AuthorizationProvider`] and is registered by
//! name with the [`SelectiveProvider`], which walks a tenant's configured
//! scheme list in order.

pub mod credentials;
pub mod rest;
pub mod selective;
pub mod simple;
pub mod table;

use async_trait::async_trait;

use crate::context::{HandshakeContext, PeerDescriptor};

pub use credentials::PeerCredentials;
pub use rest::RestProvider;
pub use selective::SelectiveProvider;
pub use simple::SimpleProvider;
pub use table::PeerTable;

/// Outcome of a single provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    /// Credentials accepted; carries the resolved peer attributes.
    Allow(PeerDescriptor),
    /// Credentials rejected, with a reason for the logs.
    Deny(String),
}

impl AuthDecision {
    /// Creates a denial.
    pub fn deny(reason: impl Into<String>) -> Self {
        Self::Deny(reason.into())
    }

    /// Returns `true` for [`AuthDecision::Allow`].
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow(_))
    }
}

/// A named credential scheme.
#[async_trait]
pub trait AuthorizationProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Scheme name as it appears in a tenant's `auths` list.
    fn name(&self) -> &str;

    /// Checks the handshake's credentials. Never errors: any failure denies.
    async fn authorize(&self, ctx: &HandshakeContext) -> AuthDecision;
}
