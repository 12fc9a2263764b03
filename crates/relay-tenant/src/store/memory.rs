//! In-memory tenant document.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use relay_core::result::AppResult;
use relay_core::traits::TenantStore;
use relay_core::types::TenantDocument;

/// Tenant document held in process memory.
///
/// Writes through [`put`](Self::put) are visible to the next registry reload.
#[derive(Debug, Default)]
pub struct MemoryTenantStore {
    tenants: RwLock<HashMap<String, TenantDocument>>,
}

impl MemoryTenantStore {
    /// Creates a store seeded with the given records.
    pub fn new(tenants: HashMap<String, TenantDocument>) -> Self {
        Self {
            tenants: RwLock::new(tenants),
        }
    }

    /// Inserts or replaces a record.
    pub async fn put(&self, id: impl Into<String>, doc: TenantDocument) {
        self.tenants.write().await.insert(id.into(), doc);
    }
}

#[async_trait]
impl TenantStore for MemoryTenantStore {
    async fn load(&self) -> AppResult<HashMap<String, TenantDocument>> {
        Ok(self.tenants.read().await.clone())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
