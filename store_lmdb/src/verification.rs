//! LMDB implementation of VerificationRequestStore.
//!
//! Requests are keyed by id. Two indexes sit beside them:
//! - `certificate_requests`: `certificate_id ++ request_id`, listing a
//!   certificate's requests in submission order by prefix scan;
//! - `pending_verifications`: `certificate_id ++ requester -> request_id`,
//!   present only while the request is pending. This is the point lookup
//!   behind the duplicate-pending check.

use proofpass_store::{StoreError, VerificationRequestStore};
use proofpass_types::{Address, CertificateId, RequestId, VerificationRequest};

use crate::environment::scan_prefix;
use crate::keys::{decode_u64, pending_verification_key, trailing_u64};
use crate::{LmdbEnvironment, LmdbError};

impl VerificationRequestStore for LmdbEnvironment {
    fn get_verification_request(
        &self,
        id: RequestId,
    ) -> Result<Option<VerificationRequest>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .verification_requests_db
            .get(&rtxn, &id.to_be_bytes())
            .map_err(LmdbError::from)?;
        match val {
            Some(bytes) => Ok(Some(bincode::deserialize(bytes).map_err(LmdbError::from)?)),
            None => Ok(None),
        }
    }

    fn verification_request_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let count = self
            .verification_requests_db
            .len(&rtxn)
            .map_err(LmdbError::from)?;
        Ok(count)
    }

    fn get_pending_verification(
        &self,
        certificate: CertificateId,
        requester: &Address,
    ) -> Result<Option<RequestId>, StoreError> {
        let key = pending_verification_key(certificate, requester);
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .pending_verifications_db
            .get(&rtxn, &key)
            .map_err(LmdbError::from)?;
        match val {
            Some(bytes) => Ok(Some(RequestId::new(decode_u64(bytes)?))),
            None => Ok(None),
        }
    }

    fn get_verification_requests_for(
        &self,
        certificate: CertificateId,
    ) -> Result<Vec<VerificationRequest>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let index = scan_prefix(
            &self.certificate_requests_db,
            &rtxn,
            &certificate.to_be_bytes(),
        )?;
        let mut requests = Vec::with_capacity(index.len());
        for (key, _) in index {
            let id = trailing_u64(&key)?;
            let bytes = self
                .verification_requests_db
                .get(&rtxn, &id.to_be_bytes())
                .map_err(LmdbError::from)?
                .ok_or_else(|| {
                    LmdbError::DanglingIndex(format!(
                        "certificate {} lists missing verification request {}",
                        certificate, id
                    ))
                })?;
            requests.push(bincode::deserialize(bytes).map_err(LmdbError::from)?);
        }
        Ok(requests)
    }
}
