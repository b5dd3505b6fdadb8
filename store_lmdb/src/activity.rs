//! LMDB implementation of ActivityStore.
//!
//! The log lives in `activity` keyed by big-endian sequence number, so a
//! page is a single forward range read. `activity_by_address` holds
//! `address ++ seq` for both the actor and the target of every entry.

use std::ops::Bound;

use proofpass_store::{ActivityStore, StoreError};
use proofpass_types::{ActivityLogEntry, Address};

use crate::keys::{increment_prefix, trailing_u64};
use crate::{LmdbEnvironment, LmdbError};

impl LmdbEnvironment {
    fn read_activity(&self, rtxn: &heed::RoTxn, seq: u64) -> Result<ActivityLogEntry, LmdbError> {
        let bytes = self
            .activity_db
            .get(rtxn, &seq.to_be_bytes())?
            .ok_or_else(|| {
                LmdbError::DanglingIndex(format!("activity entry {} is missing", seq))
            })?;
        Ok(bincode::deserialize(bytes)?)
    }
}

impl ActivityStore for LmdbEnvironment {
    fn activity_len(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let len = self.activity_db.len(&rtxn).map_err(LmdbError::from)?;
        Ok(len)
    }

    fn get_activity_range(
        &self,
        offset: u64,
        limit: usize,
    ) -> Result<Vec<ActivityLogEntry>, StoreError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let start = offset.to_be_bytes();
        let bounds = (Bound::Included(&start[..]), Bound::<&[u8]>::Unbounded);
        let iter = self
            .activity_db
            .range(&rtxn, &bounds)
            .map_err(LmdbError::from)?;

        let mut entries = Vec::with_capacity(limit.min(1024));
        for result in iter.take(limit) {
            let (_, bytes) = result.map_err(LmdbError::from)?;
            entries.push(bincode::deserialize(bytes).map_err(LmdbError::from)?);
        }
        Ok(entries)
    }

    fn get_activity_for(
        &self,
        address: &Address,
        offset: u64,
        limit: usize,
    ) -> Result<Vec<ActivityLogEntry>, StoreError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let prefix = address.as_bytes().as_slice();
        let mut upper = prefix.to_vec();
        let upper_bound = if increment_prefix(&mut upper) {
            Bound::Excluded(upper.as_slice())
        } else {
            Bound::Unbounded
        };
        let bounds = (Bound::Included(prefix), upper_bound);
        let iter = self
            .activity_by_address_db
            .range(&rtxn, &bounds)
            .map_err(LmdbError::from)?;

        let skip = usize::try_from(offset).unwrap_or(usize::MAX);
        let mut entries = Vec::new();
        for result in iter.skip(skip).take(limit) {
            let (key, _) = result.map_err(LmdbError::from)?;
            let seq = trailing_u64(key)?;
            entries.push(self.read_activity(&rtxn, seq)?);
        }
        Ok(entries)
    }
}
