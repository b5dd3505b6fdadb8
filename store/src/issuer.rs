//! Issuer authorization storage trait.

use crate::StoreError;
use proofpass_types::{Address, IssuerRequest, RequestId};

/// Trait for reading issuer requests and the authorized-issuer set.
pub trait IssuerStore {
    fn get_issuer_request(&self, id: RequestId) -> Result<Option<IssuerRequest>, StoreError>;

    /// Total number of issuer requests ever submitted.
    fn issuer_request_count(&self) -> Result<u64, StoreError>;

    /// The most recent request submitted by `requester`.
    fn get_latest_issuer_request(
        &self,
        requester: &Address,
    ) -> Result<Option<IssuerRequest>, StoreError>;

    /// Every request still pending, in submission order.
    fn get_pending_issuer_requests(&self) -> Result<Vec<IssuerRequest>, StoreError>;

    /// Whether `address` is currently in the authorized-issuer set.
    fn is_authorized_issuer(&self, address: &Address) -> Result<bool, StoreError>;

    /// Every address that was ever authorized, with its current flag.
    fn get_issuers(&self) -> Result<Vec<(Address, bool)>, StoreError>;
}
