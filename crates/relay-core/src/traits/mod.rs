//! Core traits defined in `relay-core` and implemented by other crates.

pub mod tenant_store;

pub use tenant_store::TenantStore;
