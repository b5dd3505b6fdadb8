//! Activity log storage trait.

use crate::StoreError;
use proofpass_types::{
    ActionKind, ActionScope, ActivityLogEntry, Address, CertificateId, Timestamp,
};

/// An activity entry that has not been appended yet.
///
/// The store assigns the sequence number when the batch carrying it commits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewActivity {
    pub actor: Address,
    pub target: Address,
    pub scope: ActionScope,
    pub action: ActionKind,
    pub certificate_id: Option<CertificateId>,
    pub details: String,
    pub timestamp: Timestamp,
}

impl NewActivity {
    /// Seal the entry at sequence position `seq`.
    pub fn into_entry(self, seq: u64) -> ActivityLogEntry {
        ActivityLogEntry {
            seq,
            actor: self.actor,
            target: self.target,
            scope: self.scope,
            action: self.action,
            certificate_id: self.certificate_id,
            details: self.details,
            timestamp: self.timestamp,
        }
    }
}

/// Trait for reading the append-only activity log.
///
/// Ranges are in insertion order. An offset past the end yields an empty
/// vector, never an error.
pub trait ActivityStore {
    /// Number of entries in the log.
    fn activity_len(&self) -> Result<u64, StoreError>;

    /// Up to `limit` entries starting at sequence `offset`.
    fn get_activity_range(
        &self,
        offset: u64,
        limit: usize,
    ) -> Result<Vec<ActivityLogEntry>, StoreError>;

    /// Up to `limit` entries involving `address` (as actor or target),
    /// skipping the first `offset` such entries.
    fn get_activity_for(
        &self,
        address: &Address,
        offset: u64,
        limit: usize,
    ) -> Result<Vec<ActivityLogEntry>, StoreError>;
}
