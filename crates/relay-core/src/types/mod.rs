//! Core type definitions used across the relay workspace.

pub mod tenant;

pub use tenant::TenantDocument;
