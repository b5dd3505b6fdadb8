//! LMDB database integrity checks.
//!
//! Run on startup so that a damaged registry is reported before the RPC
//! server begins accepting mutations.

use std::path::Path;

use crate::environment::DATABASE_NAMES;
use crate::keys::decode_u64;
use crate::{LmdbEnvironment, LmdbError};

/// Summary of an integrity check run.
#[derive(Debug)]
pub struct IntegrityReport {
    pub databases_checked: u32,
    pub total_entries: u64,
    pub errors: Vec<String>,
}

impl IntegrityReport {
    /// Returns `true` if no errors were detected.
    pub fn is_healthy(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check LMDB database integrity.
///
/// Counts the entries of every registry database, then verifies that the
/// activity log has no gaps and that every pending-request index entry
/// points at a stored, still-pending request. Problems are collected in the
/// report; only a failure to start the read transaction is a hard error.
pub fn check_integrity(env: &LmdbEnvironment) -> Result<IntegrityReport, LmdbError> {
    let mut report = IntegrityReport {
        databases_checked: 0,
        total_entries: 0,
        errors: Vec::new(),
    };

    let rtxn = env.env.read_txn()?;

    for &db_name in DATABASE_NAMES {
        match env
            .env
            .open_database::<heed::types::Bytes, heed::types::Bytes>(&rtxn, Some(db_name))
        {
            Ok(Some(db)) => {
                report.databases_checked += 1;
                match db.len(&rtxn) {
                    Ok(count) => report.total_entries += count,
                    Err(e) => report
                        .errors
                        .push(format!("failed to read database '{}': {}", db_name, e)),
                }
            }
            Ok(None) => report
                .errors
                .push(format!("database '{}' is missing", db_name)),
            Err(e) => report
                .errors
                .push(format!("failed to open database '{}': {}", db_name, e)),
        }
    }

    // Activity keys must be exactly 0..len.
    match env.activity_db.iter(&rtxn) {
        Ok(iter) => {
            for (expected, result) in iter.enumerate() {
                match result.map_err(LmdbError::from).and_then(|(k, _)| decode_u64(k)) {
                    Ok(seq) if seq == expected as u64 => {}
                    Ok(seq) => {
                        report.errors.push(format!(
                            "activity log gap: expected sequence {} but found {}",
                            expected, seq
                        ));
                        break;
                    }
                    Err(e) => {
                        report.errors.push(format!("unreadable activity key: {}", e));
                        break;
                    }
                }
            }
        }
        Err(e) => report.errors.push(format!("failed to scan activity: {}", e)),
    }

    match env.pending_verifications_db.iter(&rtxn) {
        Ok(iter) => {
            for result in iter {
                let id = match result.map_err(LmdbError::from).and_then(|(_, v)| decode_u64(v)) {
                    Ok(id) => id,
                    Err(e) => {
                        report.errors.push(format!("unreadable pending entry: {}", e));
                        continue;
                    }
                };
                let still_pending = env
                    .verification_requests_db
                    .get(&rtxn, &id.to_be_bytes())
                    .map_err(LmdbError::from)
                    .and_then(|bytes| match bytes {
                        Some(b) => Ok(Some(bincode::deserialize::<
                            proofpass_types::VerificationRequest,
                        >(b)?)),
                        None => Ok(None),
                    });
                match still_pending {
                    Ok(Some(request)) if request.is_pending() => {}
                    Ok(Some(_)) => report.errors.push(format!(
                        "pending index lists resolved verification request {}",
                        id
                    )),
                    Ok(None) => report.errors.push(format!(
                        "pending index lists missing verification request {}",
                        id
                    )),
                    Err(e) => report
                        .errors
                        .push(format!("failed to read verification request {}: {}", id, e)),
                }
            }
        }
        Err(e) => report
            .errors
            .push(format!("failed to scan pending index: {}", e)),
    }

    tracing::debug!(
        databases = report.databases_checked,
        entries = report.total_entries,
        errors = report.errors.len(),
        "integrity check finished"
    );
    Ok(report)
}

/// Check if the LMDB data directory looks valid before opening.
///
/// Returns `Ok(())` for a fresh (nonexistent) directory. Returns an error
/// if the directory exists but `data.mdb` is missing, which suggests
/// corruption or misconfiguration.
pub fn check_data_dir(path: &Path) -> Result<(), String> {
    if !path.exists() {
        return Ok(());
    }
    let data_file = path.join("data.mdb");
    if !data_file.exists() {
        return Err(format!(
            "LMDB directory exists but data.mdb is missing at {}",
            path.display()
        ));
    }
    Ok(())
}
