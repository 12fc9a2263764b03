//! Static peer credential table shared by the simple and REST providers.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;

use relay_core::config::PeerRecord;

use super::AuthDecision;
use super::credentials::PeerCredentials;
use crate::context::PeerDescriptor;

/// Peer records keyed by id, swapped as a whole on replace.
#[derive(Debug)]
pub struct PeerTable {
    peers: ArcSwap<HashMap<String, PeerRecord>>,
}

impl PeerTable {
    /// Creates a table from configured records. Later duplicates win.
    pub fn new(records: impl IntoIterator<Item = PeerRecord>) -> Self {
        Self {
            peers: ArcSwap::from_pointee(index(records)),
        }
    }

    /// Atomically replaces every record.
    pub fn replace(&self, records: impl IntoIterator<Item = PeerRecord>) {
        self.peers.store(Arc::new(index(records)));
    }

    /// Checks credentials against the table.
    ///
    /// Returns `None` when the peer id is not in the table, so a caller can
    /// fall through to another source.
    pub fn verify(&self, creds: &PeerCredentials, tenant: &str) -> Option<AuthDecision> {
        let peers = self.peers.load();
        let record = peers.get(&creds.peer_id)?;

        if record.tenant != tenant {
            return Some(AuthDecision::deny(format!(
                "peer '{}' does not belong to tenant '{tenant}'",
                creds.peer_id
            )));
        }
        if record.key != creds.secret {
            return Some(AuthDecision::deny(format!(
                "invalid key for peer '{}'",
                creds.peer_id
            )));
        }
        Some(AuthDecision::Allow(PeerDescriptor::from(record)))
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.peers.load().len()
    }

    /// Returns `true` if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn index(records: impl IntoIterator<Item = PeerRecord>) -> HashMap<String, PeerRecord> {
    records
        .into_iter()
        .filter(|r| !r.id.is_empty())
        .map(|r| (r.id.clone(), r))
        .collect()
}
