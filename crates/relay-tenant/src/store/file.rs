//! Tenant document stored as a JSON file.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use relay_core::error::{AppError, ErrorKind};
use relay_core::result::AppResult;
use relay_core::traits::TenantStore;
use relay_core::types::TenantDocument;

/// Reads tenants from a JSON object keyed by tenant id.
#[derive(Debug, Clone)]
pub struct JsonFileTenantStore {
    path: PathBuf,
}

impl JsonFileTenantStore {
    /// Creates a store over the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TenantStore for JsonFileTenantStore {
    async fn load(&self) -> AppResult<HashMap<String, TenantDocument>> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                format!("Failed to read tenant document '{}': {e}", self.path.display()),
                e,
            )
        })?;

        let tenants: HashMap<String, TenantDocument> = serde_json::from_str(&raw)?;
        debug!(path = %self.path.display(), count = tenants.len(), "Tenant document read");
        Ok(tenants)
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}
