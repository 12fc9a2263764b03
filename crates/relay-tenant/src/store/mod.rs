//! Tenant document stores.

pub mod file;
pub mod memory;

pub use file::JsonFileTenantStore;
pub use memory::MemoryTenantStore;
