//! Abstract storage traits for the ProofPass registry.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The registry depends only on [`LedgerStore`]: point reads through
//! the per-entity traits, and writes through a single atomic
//! [`WriteBatch`] per mutation.

pub mod activity;
pub mod batch;
pub mod certificate;
pub mod employer;
pub mod endorsement;
pub mod error;
pub mod issuer;
pub mod meta;
pub mod verification;

pub use activity::{ActivityStore, NewActivity};
pub use batch::{BatchOp, WriteBatch};
pub use certificate::CertificateStore;
pub use employer::EmployerStore;
pub use endorsement::EndorsementStore;
pub use error::StoreError;
pub use issuer::IssuerStore;
pub use meta::MetaStore;
pub use verification::VerificationRequestStore;

/// Everything the registry needs from persistent storage.
///
/// `commit` must apply every operation in the batch or none of them, and
/// readers must never observe a half-applied batch.
pub trait LedgerStore:
    CertificateStore
    + VerificationRequestStore
    + IssuerStore
    + EmployerStore
    + EndorsementStore
    + ActivityStore
    + Send
    + Sync
{
    /// Atomically apply a batch of writes.
    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;
}
