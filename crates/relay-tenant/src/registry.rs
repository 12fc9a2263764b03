//! Tenant registry backed by an atomically swapped snapshot.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::{debug, info};

use relay_core::result::AppResult;
use relay_core::traits::TenantStore;

use crate::tenant::Tenant;

type TenantMap = HashMap<String, Arc<Tenant>>;

/// Get/add/delete facade over the tenant document.
///
/// Readers never block: every handshake loads the current snapshot, while
/// `add`, `delete` and `reload` publish a new map with a single swap.
/// `add` and `delete` are runtime overrides only; they are not written back
/// to the store and are discarded by the next [`reload`](Self::reload).
#[derive(Debug)]
pub struct TenantRegistry {
    /// The backing document.
    store: Arc<dyn TenantStore>,
    /// Current tenant snapshot.
    tenants: ArcSwap<TenantMap>,
}

impl TenantRegistry {
    /// Creates a registry and performs the initial load from `store`.
    pub async fn load(store: Arc<dyn TenantStore>) -> AppResult<Self> {
        let registry = Self::empty(store);
        registry.reload().await?;
        Ok(registry)
    }

    /// Creates a registry without reading the store.
    pub fn empty(store: Arc<dyn TenantStore>) -> Self {
        Self {
            store,
            tenants: ArcSwap::from_pointee(HashMap::new()),
        }
    }

    /// Re-reads the backing document and replaces the snapshot.
    pub async fn reload(&self) -> AppResult<usize> {
        let docs = self.store.load().await?;
        let next: TenantMap = docs
            .into_iter()
            .filter(|(id, _)| !id.is_empty())
            .map(|(id, doc)| (id.clone(), Arc::new(Tenant::new(id, doc))))
            .collect();
        let count = next.len();
        self.tenants.store(Arc::new(next));

        info!(source = %self.store.describe(), count, "Tenants loaded");
        Ok(count)
    }

    /// Looks up a tenant by id.
    pub fn get(&self, id: &str) -> Option<Arc<Tenant>> {
        self.tenants.load().get(id).cloned()
    }

    /// Inserts or replaces a tenant. No-op when the id is empty.
    pub fn add(&self, tenant: Tenant) {
        if tenant.id().is_empty() {
            return;
        }
        let tenant = Arc::new(tenant);
        self.tenants.rcu(|current| {
            let mut next = TenantMap::clone(current);
            next.insert(tenant.id().to_string(), tenant.clone());
            next
        });
        debug!(tenant = %tenant.id(), "Tenant added");
    }

    /// Removes a tenant, returning it if it was present.
    pub fn delete(&self, id: &str) -> Option<Arc<Tenant>> {
        let existing = self.get(id)?;
        self.tenants.rcu(|current| {
            let mut next = TenantMap::clone(current);
            next.remove(id);
            next
        });
        debug!(tenant = %id, "Tenant deleted");
        Some(existing)
    }

    /// Number of known tenants.
    pub fn len(&self) -> usize {
        self.tenants.load().len()
    }

    /// Returns `true` if no tenant is known.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryTenantStore;
    use relay_core::types::TenantDocument;

    fn doc(available: bool) -> TenantDocument {
        TenantDocument {
            available,
            auths: vec!["simple".to_string()],
            ..Default::default()
        }
    }

    async fn make_registry() -> (Arc<MemoryTenantStore>, TenantRegistry) {
        let store = Arc::new(MemoryTenantStore::new(HashMap::from([
            ("acme".to_string(), doc(true)),
            ("closed".to_string(), doc(false)),
        ])));
        let registry = TenantRegistry::load(store.clone()).await.unwrap();
        (store, registry)
    }

    #[tokio::test]
    async fn test_get() {
        let (_, registry) = make_registry().await;
        assert_eq!(registry.len(), 2);
        assert!(registry.get("acme").unwrap().available());
        assert!(!registry.get("closed").unwrap().available());
        assert!(registry.get("missing").is_none());
    }

    #[tokio::test]
    async fn test_add_and_delete() {
        let (_, registry) = make_registry().await;
        registry.add(Tenant::new("beta", doc(true)));
        assert!(registry.get("beta").is_some());

        let removed = registry.delete("beta").unwrap();
        assert_eq!(removed.id(), "beta");
        assert!(registry.get("beta").is_none());
        assert!(registry.delete("beta").is_none());
    }

    #[tokio::test]
    async fn test_add_with_empty_id_is_ignored() {
        let (_, registry) = make_registry().await;
        registry.add(Tenant::new("", doc(true)));
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn test_reload_discards_runtime_overrides() {
        let (store, registry) = make_registry().await;
        registry.add(Tenant::new("beta", doc(true)));
        registry.delete("acme");
        store.put("gamma", doc(true)).await;

        let count = registry.reload().await.unwrap();
        assert_eq!(count, 3);
        assert!(registry.get("acme").is_some());
        assert!(registry.get("gamma").is_some());
        assert!(registry.get("beta").is_none());
    }

    #[tokio::test]
    async fn test_concurrent_readers_and_writers() {
        let (_, registry) = make_registry().await;
        let registry = Arc::new(registry);

        let mut tasks = Vec::new();
        for i in 0..8 {
            let registry = registry.clone();
            tasks.push(tokio::spawn(async move {
                let id = format!("t{i}");
                registry.add(Tenant::new(id.clone(), doc(true)));
                assert!(registry.get("acme").is_some());
                assert!(registry.get(&id).is_some());
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(registry.len(), 10);
    }
}
