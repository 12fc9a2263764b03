//! # relay-core
//!
//! Core crate for the tenant relay. Contains the unified error system,
//! configuration schemas, the tenant document types, and the
//! [`TenantStore`](traits::TenantStore) contract implemented by
//! `relay-tenant`.
//!
//! This crate has **no** internal dependencies on other relay crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
