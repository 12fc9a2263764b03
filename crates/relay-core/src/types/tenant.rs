//! Tenant records as they appear in the backing document.

use serde::{Deserialize, Serialize};

/// One tenant entry of the tenant document.
///
/// The document itself is a JSON object keyed by tenant id; the id is not
/// repeated inside the record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantDocument {
    /// Whether the tenant accepts connections. Missing means unavailable.
    #[serde(default)]
    pub available: bool,
    /// Ordered authorization scheme names.
    #[serde(default)]
    pub auths: Vec<String>,
    /// Permitted inbound event names; empty permits every event.
    #[serde(default)]
    pub events: Vec<String>,
    /// Prefix room names with the tenant id.
    #[serde(default)]
    pub namespaced_broadcast: bool,
}
