//! Applies a [`WriteBatch`] inside a single LMDB write transaction.
//!
//! Every index write that a batch op implies (owner index, pending index,
//! activity address index) happens in the same transaction as the record
//! itself. If any step fails the transaction is dropped and LMDB aborts it,
//! so nothing from the batch becomes visible.

use heed::RwTxn;

use proofpass_store::{BatchOp, LedgerStore, NewActivity, StoreError, WriteBatch};
use proofpass_types::{
    Address, Certificate, Employer, Endorsement, IssuerRequest, VerificationRequest,
};

use crate::endorsement::ENDORSEMENT_COUNT_KEY;
use crate::keys::{
    address_seq_key, certificate_request_key, decode_u64, owner_certificate_key,
    pending_verification_key,
};
use crate::{LmdbEnvironment, LmdbError};

/// An open write transaction plus the counters a batch advances.
struct LmdbBatch<'a> {
    txn: RwTxn<'a>,
    env: &'a LmdbEnvironment,
    next_activity_seq: u64,
}

impl<'a> LmdbBatch<'a> {
    fn begin(env: &'a LmdbEnvironment) -> Result<Self, LmdbError> {
        let txn = env.env.write_txn()?;
        let next_activity_seq = env.activity_db.len(&txn)?;
        Ok(Self {
            txn,
            env,
            next_activity_seq,
        })
    }

    fn apply(&mut self, op: BatchOp) -> Result<(), LmdbError> {
        match op {
            BatchOp::PutCertificate(certificate) => self.put_certificate(&certificate),
            BatchOp::PutVerificationRequest(request) => self.put_verification_request(&request),
            BatchOp::PutIssuerRequest(request) => self.put_issuer_request(&request),
            BatchOp::SetIssuer {
                address,
                authorized,
            } => self.set_issuer(&address, authorized),
            BatchOp::PutEmployer(employer) => self.put_employer(&employer),
            BatchOp::PutEndorsement(endorsement) => self.put_endorsement(&endorsement),
            BatchOp::AppendActivity(entry) => self.append_activity(entry),
        }
    }

    // ── Certificates ────────────────────────────────────────────────────

    fn put_certificate(&mut self, certificate: &Certificate) -> Result<(), LmdbError> {
        let bytes = bincode::serialize(certificate)?;
        self.env
            .certificates_db
            .put(&mut self.txn, &certificate.id.to_be_bytes(), &bytes)?;
        let owner_key = owner_certificate_key(&certificate.owner, certificate.id);
        self.env
            .owner_certificates_db
            .put(&mut self.txn, &owner_key, &[])?;
        Ok(())
    }

    // ── Verification requests ───────────────────────────────────────────

    fn put_verification_request(&mut self, request: &VerificationRequest) -> Result<(), LmdbError> {
        let bytes = bincode::serialize(request)?;
        self.env
            .verification_requests_db
            .put(&mut self.txn, &request.id.to_be_bytes(), &bytes)?;

        let listing = certificate_request_key(request.certificate_id, request.id);
        self.env
            .certificate_requests_db
            .put(&mut self.txn, &listing, &[])?;

        let pending_key = pending_verification_key(request.certificate_id, &request.requester);
        if request.is_pending() {
            self.env.pending_verifications_db.put(
                &mut self.txn,
                &pending_key,
                &request.id.to_be_bytes(),
            )?;
        } else {
            let current = self
                .env
                .pending_verifications_db
                .get(&self.txn, &pending_key)?
                .map(decode_u64)
                .transpose()?;
            if current == Some(request.id.get()) {
                self.env
                    .pending_verifications_db
                    .delete(&mut self.txn, &pending_key)?;
            }
        }
        Ok(())
    }

    // ── Issuers ─────────────────────────────────────────────────────────

    fn put_issuer_request(&mut self, request: &IssuerRequest) -> Result<(), LmdbError> {
        let bytes = bincode::serialize(request)?;
        self.env
            .issuer_requests_db
            .put(&mut self.txn, &request.id.to_be_bytes(), &bytes)?;
        self.env.latest_issuer_requests_db.put(
            &mut self.txn,
            request.requester.as_bytes(),
            &request.id.to_be_bytes(),
        )?;
        Ok(())
    }

    fn set_issuer(&mut self, address: &Address, authorized: bool) -> Result<(), LmdbError> {
        self.env
            .issuers_db
            .put(&mut self.txn, address.as_bytes(), &[authorized as u8])?;
        Ok(())
    }

    // ── Employers ───────────────────────────────────────────────────────

    fn put_employer(&mut self, employer: &Employer) -> Result<(), LmdbError> {
        let bytes = bincode::serialize(employer)?;
        self.env
            .employers_db
            .put(&mut self.txn, employer.address.as_bytes(), &bytes)?;
        Ok(())
    }

    // ── Endorsements ────────────────────────────────────────────────────

    fn put_endorsement(&mut self, endorsement: &Endorsement) -> Result<(), LmdbError> {
        let seq = self
            .env
            .meta_db
            .get(&self.txn, ENDORSEMENT_COUNT_KEY)?
            .and_then(|b| b.try_into().ok().map(u64::from_be_bytes))
            .unwrap_or(0);
        let bytes = bincode::serialize(endorsement)?;
        let key = address_seq_key(&endorsement.user, seq);
        self.env.endorsements_db.put(&mut self.txn, &key, &bytes)?;
        self.env.meta_db.put(
            &mut self.txn,
            ENDORSEMENT_COUNT_KEY,
            &seq.saturating_add(1).to_be_bytes(),
        )?;
        Ok(())
    }

    // ── Activity log ────────────────────────────────────────────────────

    fn append_activity(&mut self, entry: NewActivity) -> Result<(), LmdbError> {
        let seq = self.next_activity_seq;
        let entry = entry.into_entry(seq);
        let bytes = bincode::serialize(&entry)?;
        self.env
            .activity_db
            .put(&mut self.txn, &seq.to_be_bytes(), &bytes)?;

        let actor_key = address_seq_key(&entry.actor, seq);
        self.env
            .activity_by_address_db
            .put(&mut self.txn, &actor_key, &[])?;
        if entry.target != entry.actor {
            let target_key = address_seq_key(&entry.target, seq);
            self.env
                .activity_by_address_db
                .put(&mut self.txn, &target_key, &[])?;
        }
        self.next_activity_seq += 1;
        Ok(())
    }

    fn commit(self) -> Result<(), LmdbError> {
        self.txn.commit()?;
        Ok(())
    }
}

impl LedgerStore for LmdbEnvironment {
    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let op_count = batch.len();
        let mut lmdb_batch = LmdbBatch::begin(self)?;
        for op in batch.into_ops() {
            lmdb_batch.apply(op)?;
        }
        lmdb_batch.commit()?;
        tracing::trace!(ops = op_count, "committed write batch");
        Ok(())
    }
}
