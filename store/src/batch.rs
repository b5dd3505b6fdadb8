//! Backend-neutral write batches.
//!
//! A registry mutation stages every record it touches in one [`WriteBatch`]
//! and hands it to [`LedgerStore::commit`](crate::LedgerStore::commit). The
//! backend applies the whole batch in a single transaction, so a failed
//! mutation never leaves partial state behind.
//!
//! ```ignore
//! let mut batch = WriteBatch::new();
//! batch.put_verification_request(request);
//! batch.append_activity(entry);
//! store.commit(batch)?;
//! ```

use proofpass_types::{
    Address, Certificate, Employer, Endorsement, IssuerRequest, VerificationRequest,
};

use crate::NewActivity;

/// A single staged write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BatchOp {
    /// Insert a newly issued certificate and index it under its owner.
    PutCertificate(Certificate),
    /// Insert or update a verification request. The backend keeps the
    /// pending index in step with the request status.
    PutVerificationRequest(VerificationRequest),
    /// Insert or update an issuer request and mark it as the requester's latest.
    PutIssuerRequest(IssuerRequest),
    /// Set an address's membership in the authorized-issuer set.
    SetIssuer { address: Address, authorized: bool },
    /// Insert or replace an employer profile, keyed by its address.
    PutEmployer(Employer),
    PutEndorsement(Endorsement),
    /// Append to the activity log at the next sequence number.
    AppendActivity(NewActivity),
}

/// An ordered list of writes applied atomically.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_certificate(&mut self, certificate: Certificate) {
        self.ops.push(BatchOp::PutCertificate(certificate));
    }

    pub fn put_verification_request(&mut self, request: VerificationRequest) {
        self.ops.push(BatchOp::PutVerificationRequest(request));
    }

    pub fn put_issuer_request(&mut self, request: IssuerRequest) {
        self.ops.push(BatchOp::PutIssuerRequest(request));
    }

    pub fn set_issuer(&mut self, address: Address, authorized: bool) {
        self.ops.push(BatchOp::SetIssuer {
            address,
            authorized,
        });
    }

    pub fn put_employer(&mut self, employer: Employer) {
        self.ops.push(BatchOp::PutEmployer(employer));
    }

    pub fn put_endorsement(&mut self, endorsement: Endorsement) {
        self.ops.push(BatchOp::PutEndorsement(endorsement));
    }

    pub fn append_activity(&mut self, entry: NewActivity) {
        self.ops.push(BatchOp::AppendActivity(entry));
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<BatchOp> {
        self.ops
    }
}
