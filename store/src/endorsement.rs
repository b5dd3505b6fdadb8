//! Endorsement storage trait.

use crate::StoreError;
use proofpass_types::{Address, Endorsement};

pub trait EndorsementStore {
    /// Every endorsement received by `user`, oldest first.
    fn get_endorsements_for(&self, user: &Address) -> Result<Vec<Endorsement>, StoreError>;

    fn endorsement_count(&self) -> Result<u64, StoreError>;
}
