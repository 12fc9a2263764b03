//! # relay-tenant
//!
//! Tenant model and registry for the relay:
//!
//! - [`Tenant`]: immutable per-session descriptor built from a tenant record
//! - [`TenantRegistry`]: get/add/delete facade over a snapshot of the tenant
//!   document, swapped atomically on reload
//! - [`store`]: JSON file and in-memory implementations of
//!   [`TenantStore`](relay_core::traits::TenantStore)

pub mod registry;
pub mod store;
pub mod tenant;

pub use registry::TenantRegistry;
pub use tenant::Tenant;
