//! LMDB implementation of IssuerStore.

use proofpass_store::{IssuerStore, StoreError};
use proofpass_types::{Address, IssuerRequest, RequestId};

use crate::keys::{decode_address, decode_u64};
use crate::{LmdbEnvironment, LmdbError};

impl LmdbEnvironment {
    fn read_issuer_request(
        &self,
        rtxn: &heed::RoTxn,
        id: u64,
    ) -> Result<Option<IssuerRequest>, LmdbError> {
        match self.issuer_requests_db.get(rtxn, &id.to_be_bytes())? {
            Some(bytes) => Ok(Some(bincode::deserialize(bytes)?)),
            None => Ok(None),
        }
    }
}

impl IssuerStore for LmdbEnvironment {
    fn get_issuer_request(&self, id: RequestId) -> Result<Option<IssuerRequest>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.read_issuer_request(&rtxn, id.get())?)
    }

    fn issuer_request_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let count = self.issuer_requests_db.len(&rtxn).map_err(LmdbError::from)?;
        Ok(count)
    }

    fn get_latest_issuer_request(
        &self,
        requester: &Address,
    ) -> Result<Option<IssuerRequest>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let Some(id_bytes) = self
            .latest_issuer_requests_db
            .get(&rtxn, requester.as_bytes())
            .map_err(LmdbError::from)?
        else {
            return Ok(None);
        };
        let id = decode_u64(id_bytes)?;
        let request = self.read_issuer_request(&rtxn, id)?.ok_or_else(|| {
            LmdbError::DanglingIndex(format!(
                "latest issuer request {} for {} is missing",
                id, requester
            ))
        })?;
        Ok(Some(request))
    }

    fn get_pending_issuer_requests(&self) -> Result<Vec<IssuerRequest>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut pending = Vec::new();
        let iter = self
            .latest_issuer_requests_db
            .iter(&rtxn)
            .map_err(LmdbError::from)?;
        for result in iter {
            let (_, id_bytes) = result.map_err(LmdbError::from)?;
            let id = decode_u64(id_bytes)?;
            if let Some(request) = self.read_issuer_request(&rtxn, id)? {
                if request.is_pending() {
                    pending.push(request);
                }
            }
        }
        pending.sort_by_key(|r| r.id);
        Ok(pending)
    }

    fn is_authorized_issuer(&self, address: &Address) -> Result<bool, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .issuers_db
            .get(&rtxn, address.as_bytes())
            .map_err(LmdbError::from)?;
        Ok(matches!(val, Some([1])))
    }

    fn get_issuers(&self) -> Result<Vec<(Address, bool)>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut issuers = Vec::new();
        let iter = self.issuers_db.iter(&rtxn).map_err(LmdbError::from)?;
        for result in iter {
            let (key, val) = result.map_err(LmdbError::from)?;
            issuers.push((decode_address(key)?, val == [1]));
        }
        Ok(issuers)
    }
}
