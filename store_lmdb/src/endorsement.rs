//! LMDB implementation of EndorsementStore.
//!
//! Endorsements are keyed `user ++ seq`, where `seq` is a global counter
//! kept in the meta database. A user's endorsements are one prefix scan and
//! come back in the order they were given.

use proofpass_store::{EndorsementStore, StoreError};
use proofpass_types::{Address, Endorsement};

use crate::environment::scan_prefix;
use crate::{LmdbEnvironment, LmdbError};

/// Meta key holding the number of endorsements ever written (big-endian u64).
pub(crate) const ENDORSEMENT_COUNT_KEY: &[u8] = b"endorsement_count";

impl EndorsementStore for LmdbEnvironment {
    fn get_endorsements_for(&self, user: &Address) -> Result<Vec<Endorsement>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let entries = scan_prefix(&self.endorsements_db, &rtxn, user.as_bytes())?;
        let mut endorsements = Vec::with_capacity(entries.len());
        for (_, bytes) in entries {
            endorsements.push(bincode::deserialize(&bytes).map_err(LmdbError::from)?);
        }
        Ok(endorsements)
    }

    fn endorsement_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let count = self
            .meta_db
            .get(&rtxn, ENDORSEMENT_COUNT_KEY)
            .map_err(LmdbError::from)?
            .and_then(|b| b.try_into().ok().map(u64::from_be_bytes))
            .unwrap_or(0);
        Ok(count)
    }
}
