//! LMDB environment setup.

use std::ops::Bound;
use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions, RoTxn};

use crate::keys::increment_prefix;
use crate::LmdbError;

/// Names of every database the registry keeps in one environment.
pub const DATABASE_NAMES: &[&str] = &[
    "certificates",
    "owner_certificates",
    "verification_requests",
    "certificate_requests",
    "pending_verifications",
    "issuer_requests",
    "latest_issuer_requests",
    "issuers",
    "employers",
    "endorsements",
    "activity",
    "activity_by_address",
    "meta",
];

/// Wraps the LMDB environment and all database handles.
///
/// Implements every `proofpass-store` trait, so an `Arc<LmdbEnvironment>`
/// can be handed to the registry as its ledger.
pub struct LmdbEnvironment {
    pub(crate) env: Arc<Env>,
    /// `certificate_id -> Certificate`
    pub(crate) certificates_db: Database<Bytes, Bytes>,
    /// `owner ++ certificate_id -> ()`
    pub(crate) owner_certificates_db: Database<Bytes, Bytes>,
    /// `request_id -> VerificationRequest`
    pub(crate) verification_requests_db: Database<Bytes, Bytes>,
    /// `certificate_id ++ request_id -> ()`
    pub(crate) certificate_requests_db: Database<Bytes, Bytes>,
    /// `certificate_id ++ requester -> request_id`, pending requests only
    pub(crate) pending_verifications_db: Database<Bytes, Bytes>,
    /// `request_id -> IssuerRequest`
    pub(crate) issuer_requests_db: Database<Bytes, Bytes>,
    /// `requester -> request_id`
    pub(crate) latest_issuer_requests_db: Database<Bytes, Bytes>,
    /// `address -> [authorized as u8]`
    pub(crate) issuers_db: Database<Bytes, Bytes>,
    /// `address -> Employer`
    pub(crate) employers_db: Database<Bytes, Bytes>,
    /// `user ++ seq -> Endorsement`
    pub(crate) endorsements_db: Database<Bytes, Bytes>,
    /// `seq -> ActivityLogEntry`
    pub(crate) activity_db: Database<Bytes, Bytes>,
    /// `address ++ seq -> ()`
    pub(crate) activity_by_address_db: Database<Bytes, Bytes>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path.
    pub fn open(path: &Path, max_dbs: u32, map_size: usize) -> Result<Self, LmdbError> {
        if (max_dbs as usize) < DATABASE_NAMES.len() {
            return Err(LmdbError::Schema(format!(
                "max_dbs {} is below the {} databases the registry needs",
                max_dbs,
                DATABASE_NAMES.len()
            )));
        }
        std::fs::create_dir_all(path)?;

        // SAFETY: the registry opens each environment directory once per
        // process and never maps the same file twice.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(max_dbs)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let certificates_db = env.create_database(&mut wtxn, Some("certificates"))?;
        let owner_certificates_db = env.create_database(&mut wtxn, Some("owner_certificates"))?;
        let verification_requests_db =
            env.create_database(&mut wtxn, Some("verification_requests"))?;
        let certificate_requests_db =
            env.create_database(&mut wtxn, Some("certificate_requests"))?;
        let pending_verifications_db =
            env.create_database(&mut wtxn, Some("pending_verifications"))?;
        let issuer_requests_db = env.create_database(&mut wtxn, Some("issuer_requests"))?;
        let latest_issuer_requests_db =
            env.create_database(&mut wtxn, Some("latest_issuer_requests"))?;
        let issuers_db = env.create_database(&mut wtxn, Some("issuers"))?;
        let employers_db = env.create_database(&mut wtxn, Some("employers"))?;
        let endorsements_db = env.create_database(&mut wtxn, Some("endorsements"))?;
        let activity_db = env.create_database(&mut wtxn, Some("activity"))?;
        let activity_by_address_db =
            env.create_database(&mut wtxn, Some("activity_by_address"))?;
        let meta_db = env.create_database(&mut wtxn, Some("meta"))?;
        wtxn.commit()?;

        tracing::debug!(path = %path.display(), map_size, "opened LMDB environment");

        Ok(Self {
            env: Arc::new(env),
            certificates_db,
            owner_certificates_db,
            verification_requests_db,
            certificate_requests_db,
            pending_verifications_db,
            issuer_requests_db,
            latest_issuer_requests_db,
            issuers_db,
            employers_db,
            endorsements_db,
            activity_db,
            activity_by_address_db,
            meta_db,
        })
    }

    /// The underlying heed environment.
    pub fn env(&self) -> &Arc<Env> {
        &self.env
    }
}

/// Prefix range-scan: collect all keys (with their values) that start with
/// `prefix`, in key order.
pub(crate) fn scan_prefix(
    db: &Database<Bytes, Bytes>,
    rtxn: &RoTxn,
    prefix: &[u8],
) -> Result<Vec<(Vec<u8>, Vec<u8>)>, LmdbError> {
    let mut upper = prefix.to_vec();
    let bounded = increment_prefix(&mut upper);
    let bounds = (
        Bound::Included(prefix),
        if bounded {
            Bound::Excluded(upper.as_slice())
        } else {
            Bound::Unbounded
        },
    );
    let iter = db.range(rtxn, &bounds)?;
    let mut results = Vec::new();
    for result in iter {
        let (key, val) = result?;
        results.push((key.to_vec(), val.to_vec()));
    }
    Ok(results)
}
