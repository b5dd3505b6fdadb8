//! Certificate storage trait.

use crate::StoreError;
use proofpass_types::{Address, Certificate, CertificateId};

/// Trait for reading issued certificates.
pub trait CertificateStore {
    /// Get a certificate by id, or `None` if it was never issued.
    fn get_certificate(&self, id: CertificateId) -> Result<Option<Certificate>, StoreError>;

    /// Number of certificates ever issued (the highest assigned id).
    fn certificate_count(&self) -> Result<u64, StoreError>;

    /// Ids of every certificate held by `owner`, in issuance order.
    fn get_certificates_of(&self, owner: &Address) -> Result<Vec<CertificateId>, StoreError>;
}
