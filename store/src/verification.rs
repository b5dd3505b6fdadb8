//! Verification request storage trait.

use crate::StoreError;
use proofpass_types::{Address, CertificateId, RequestId, VerificationRequest};

/// Trait for reading certificate verification requests.
///
/// Backends keep a `(certificate, requester) -> request id` index of pending
/// requests so the duplicate check is a point lookup.
pub trait VerificationRequestStore {
    fn get_verification_request(
        &self,
        id: RequestId,
    ) -> Result<Option<VerificationRequest>, StoreError>;

    /// Total number of verification requests ever submitted.
    fn verification_request_count(&self) -> Result<u64, StoreError>;

    /// The pending request `requester` holds against `certificate`, if any.
    fn get_pending_verification(
        &self,
        certificate: CertificateId,
        requester: &Address,
    ) -> Result<Option<RequestId>, StoreError>;

    /// Every request against `certificate`, in submission order.
    fn get_verification_requests_for(
        &self,
        certificate: CertificateId,
    ) -> Result<Vec<VerificationRequest>, StoreError>;
}
