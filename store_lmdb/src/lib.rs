//! LMDB storage backend for the ProofPass registry.
//!
//! Implements every storage trait from `proofpass-store` using the `heed`
//! LMDB bindings. Each logical table maps to one LMDB database within a
//! single environment, and every [`WriteBatch`](proofpass_store::WriteBatch)
//! commits in one LMDB write transaction.

pub mod activity;
pub mod certificate;
pub mod employer;
pub mod endorsement;
pub mod environment;
pub mod error;
pub mod integrity;
pub mod issuer;
pub mod keys;
pub mod meta;
pub mod migration;
pub mod verification;
pub mod write_batch;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use integrity::{check_data_dir, check_integrity, IntegrityReport};
pub use migration::{Migrator, CURRENT_SCHEMA_VERSION};
