//! LMDB implementation of CertificateStore.
//!
//! Certificates are keyed by big-endian id; `owner_certificates` holds the
//! composite key `owner ++ id` so a holder's certificates are one prefix scan.

use proofpass_store::{CertificateStore, StoreError};
use proofpass_types::{Address, Certificate, CertificateId};

use crate::environment::scan_prefix;
use crate::keys::trailing_u64;
use crate::{LmdbEnvironment, LmdbError};

impl CertificateStore for LmdbEnvironment {
    fn get_certificate(&self, id: CertificateId) -> Result<Option<Certificate>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .certificates_db
            .get(&rtxn, &id.to_be_bytes())
            .map_err(LmdbError::from)?;
        match val {
            Some(bytes) => {
                let certificate: Certificate =
                    bincode::deserialize(bytes).map_err(LmdbError::from)?;
                Ok(Some(certificate))
            }
            None => Ok(None),
        }
    }

    fn certificate_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let count = self.certificates_db.len(&rtxn).map_err(LmdbError::from)?;
        Ok(count)
    }

    fn get_certificates_of(&self, owner: &Address) -> Result<Vec<CertificateId>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let entries = scan_prefix(&self.owner_certificates_db, &rtxn, owner.as_bytes())?;
        let mut ids = Vec::with_capacity(entries.len());
        for (key, _) in entries {
            ids.push(CertificateId::new(trailing_u64(&key)?));
        }
        Ok(ids)
    }
}
