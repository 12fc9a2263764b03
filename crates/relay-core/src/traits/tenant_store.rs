//! Tenant store trait for pluggable tenant documents.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::tenant::TenantDocument;

/// Trait for the external document holding tenant records.
///
/// A store only reads; the registry built on top of it owns caching and
/// runtime overrides.
#[async_trait]
pub trait TenantStore: Send + Sync + std::fmt::Debug + 'static {
    /// Load every tenant record, keyed by tenant id.
    async fn load(&self) -> AppResult<HashMap<String, TenantDocument>>;

    /// Human-readable location of the document, used in logs.
    fn describe(&self) -> String;
}
