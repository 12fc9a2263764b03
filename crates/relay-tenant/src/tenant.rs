//! Tenant descriptor.

use std::collections::HashSet;

use relay_core::types::TenantDocument;

/// Separator between the tenant id and the channel in namespaced room names.
const NAMESPACE_SEPARATOR: char = '/';

/// An isolated namespace of peers, channels, and authorization policy.
///
/// Built once from a [`TenantDocument`] and never mutated afterwards; the
/// registry replaces whole tenants instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tenant {
    id: String,
    available: bool,
    /// Scheme names, lowercased, in configured order.
    auths: Vec<String>,
    events: HashSet<String>,
    namespaced_broadcast: bool,
}

impl Tenant {
    /// Builds a tenant from its document record.
    pub fn new(id: impl Into<String>, doc: TenantDocument) -> Self {
        Self {
            id: id.into(),
            available: doc.available,
            auths: doc
                .auths
                .iter()
                .map(|a| a.trim().to_lowercase())
                .filter(|a| !a.is_empty())
                .collect(),
            events: doc.events.into_iter().collect(),
            namespaced_broadcast: doc.namespaced_broadcast,
        }
    }

    /// Tenant id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether the tenant accepts connections.
    pub fn available(&self) -> bool {
        self.available
    }

    /// Authorization scheme names in the order they are tried.
    pub fn auths(&self) -> &[String] {
        &self.auths
    }

    /// Whether room names are prefixed with the tenant id.
    pub fn namespaced_broadcast(&self) -> bool {
        self.namespaced_broadcast
    }

    /// Whether peers of this tenant may emit `event`.
    pub fn supports(&self, event: &str) -> bool {
        self.events.is_empty() || self.events.contains(event)
    }

    /// Room name backing `channel` for this tenant.
    pub fn room_name(&self, channel: &str) -> String {
        if self.namespaced_broadcast {
            format!("{}{NAMESPACE_SEPARATOR}{channel}", self.id)
        } else {
            channel.to_string()
        }
    }

    /// Inverse of [`room_name`](Self::room_name): the channel a room belongs to.
    pub fn channel_name<'a>(&self, room: &'a str) -> &'a str {
        if !self.namespaced_broadcast {
            return room;
        }
        room.strip_prefix(self.id.as_str())
            .and_then(|rest| rest.strip_prefix(NAMESPACE_SEPARATOR))
            .unwrap_or(room)
    }
}
