//! Nullable store — thread-safe in-memory ledger for testing.

use proofpass_store::{
    ActivityStore, BatchOp, CertificateStore, EmployerStore, EndorsementStore, IssuerStore,
    LedgerStore, MetaStore, StoreError, VerificationRequestStore, WriteBatch,
};
use proofpass_types::{
    ActivityLogEntry, Address, Certificate, CertificateId, Employer, Endorsement,
    IssuerRequest, RequestId, VerificationRequest,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

#[derive(Default)]
struct LedgerState {
    certificates: BTreeMap<CertificateId, Certificate>,
    verification_requests: BTreeMap<RequestId, VerificationRequest>,
    pending_verifications: HashMap<(CertificateId, Address), RequestId>,
    issuer_requests: BTreeMap<RequestId, IssuerRequest>,
    latest_issuer_requests: HashMap<Address, RequestId>,
    issuers: BTreeMap<Address, bool>,
    employers: BTreeMap<Address, Employer>,
    endorsements: Vec<Endorsement>,
    activity: Vec<ActivityLogEntry>,
    meta: HashMap<String, Vec<u8>>,
}

impl LedgerState {
    fn apply(&mut self, op: BatchOp) {
        match op {
            BatchOp::PutCertificate(certificate) => {
                self.certificates.insert(certificate.id, certificate);
            }
            BatchOp::PutVerificationRequest(request) => {
                let key = (request.certificate_id, request.requester);
                if request.is_pending() {
                    self.pending_verifications.insert(key, request.id);
                } else if self.pending_verifications.get(&key) == Some(&request.id) {
                    self.pending_verifications.remove(&key);
                }
                self.verification_requests.insert(request.id, request);
            }
            BatchOp::PutIssuerRequest(request) => {
                self.latest_issuer_requests
                    .insert(request.requester, request.id);
                self.issuer_requests.insert(request.id, request);
            }
            BatchOp::SetIssuer {
                address,
                authorized,
            } => {
                self.issuers.insert(address, authorized);
            }
            BatchOp::PutEmployer(employer) => {
                self.employers.insert(employer.address, employer);
            }
            BatchOp::PutEndorsement(endorsement) => {
                self.endorsements.push(endorsement);
            }
            BatchOp::AppendActivity(entry) => {
                let seq = self.activity.len() as u64;
                self.activity.push(entry.into_entry(seq));
            }
        }
    }
}

/// An in-memory implementation of every store trait.
///
/// All state sits behind one mutex, so a committed batch becomes visible to
/// readers all at once. Thread-safe for use with tokio's multi-threaded runtime.
pub struct NullStore {
    state: Mutex<LedgerState>,
    fail_next_commit: AtomicBool,
    commits: Mutex<u64>,
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LedgerState::default()),
            fail_next_commit: AtomicBool::new(false),
            commits: Mutex::new(0),
        }
    }

    /// Make the next `commit` fail with a backend error without applying
    /// anything.
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }

    /// Number of batches committed so far.
    pub fn commit_count(&self) -> u64 {
        *self.commits.lock().unwrap()
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CertificateStore for NullStore {
    fn get_certificate(&self, id: CertificateId) -> Result<Option<Certificate>, StoreError> {
        Ok(self.state.lock().unwrap().certificates.get(&id).cloned())
    }

    fn certificate_count(&self) -> Result<u64, StoreError> {
        Ok(self.state.lock().unwrap().certificates.len() as u64)
    }

    fn get_certificates_of(&self, owner: &Address) -> Result<Vec<CertificateId>, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .certificates
            .values()
            .filter(|c| c.owner == *owner)
            .map(|c| c.id)
            .collect())
    }
}

impl VerificationRequestStore for NullStore {
    fn get_verification_request(
        &self,
        id: RequestId,
    ) -> Result<Option<VerificationRequest>, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .verification_requests
            .get(&id)
            .cloned())
    }

    fn verification_request_count(&self) -> Result<u64, StoreError> {
        Ok(self.state.lock().unwrap().verification_requests.len() as u64)
    }

    fn get_pending_verification(
        &self,
        certificate: CertificateId,
        requester: &Address,
    ) -> Result<Option<RequestId>, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .pending_verifications
            .get(&(certificate, *requester))
            .copied())
    }

    fn get_verification_requests_for(
        &self,
        certificate: CertificateId,
    ) -> Result<Vec<VerificationRequest>, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .verification_requests
            .values()
            .filter(|r| r.certificate_id == certificate)
            .cloned()
            .collect())
    }
}

impl IssuerStore for NullStore {
    fn get_issuer_request(&self, id: RequestId) -> Result<Option<IssuerRequest>, StoreError> {
        Ok(self.state.lock().unwrap().issuer_requests.get(&id).cloned())
    }

    fn issuer_request_count(&self) -> Result<u64, StoreError> {
        Ok(self.state.lock().unwrap().issuer_requests.len() as u64)
    }

    fn get_latest_issuer_request(
        &self,
        requester: &Address,
    ) -> Result<Option<IssuerRequest>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .latest_issuer_requests
            .get(requester)
            .and_then(|id| state.issuer_requests.get(id))
            .cloned())
    }

    fn get_pending_issuer_requests(&self) -> Result<Vec<IssuerRequest>, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .issuer_requests
            .values()
            .filter(|r| r.is_pending())
            .cloned()
            .collect())
    }

    fn is_authorized_issuer(&self, address: &Address) -> Result<bool, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .issuers
            .get(address)
            .copied()
            .unwrap_or(false))
    }

    fn get_issuers(&self) -> Result<Vec<(Address, bool)>, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .issuers
            .iter()
            .map(|(a, f)| (*a, *f))
            .collect())
    }
}

impl EmployerStore for NullStore {
    fn get_employer(&self, address: &Address) -> Result<Option<Employer>, StoreError> {
        Ok(self.state.lock().unwrap().employers.get(address).cloned())
    }

    fn get_employers(&self) -> Result<Vec<Employer>, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .employers
            .values()
            .cloned()
            .collect())
    }
}

impl EndorsementStore for NullStore {
    fn get_endorsements_for(&self, user: &Address) -> Result<Vec<Endorsement>, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .endorsements
            .iter()
            .filter(|e| e.user == *user)
            .cloned()
            .collect())
    }

    fn endorsement_count(&self) -> Result<u64, StoreError> {
        Ok(self.state.lock().unwrap().endorsements.len() as u64)
    }
}

impl ActivityStore for NullStore {
    fn activity_len(&self) -> Result<u64, StoreError> {
        Ok(self.state.lock().unwrap().activity.len() as u64)
    }

    fn get_activity_range(
        &self,
        offset: u64,
        limit: usize,
    ) -> Result<Vec<ActivityLogEntry>, StoreError> {
        let state = self.state.lock().unwrap();
        let start = usize::try_from(offset).unwrap_or(usize::MAX);
        Ok(state
            .activity
            .iter()
            .skip(start)
            .take(limit)
            .cloned()
            .collect())
    }

    fn get_activity_for(
        &self,
        address: &Address,
        offset: u64,
        limit: usize,
    ) -> Result<Vec<ActivityLogEntry>, StoreError> {
        let state = self.state.lock().unwrap();
        let start = usize::try_from(offset).unwrap_or(usize::MAX);
        Ok(state
            .activity
            .iter()
            .filter(|e| e.involves(address))
            .skip(start)
            .take(limit)
            .cloned()
            .collect())
    }
}

impl LedgerStore for NullStore {
    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        if self.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Backend("injected commit failure".into()));
        }
        let mut state = self.state.lock().unwrap();
        for op in batch.into_ops() {
            state.apply(op);
        }
        *self.commits.lock().unwrap() += 1;
        Ok(())
    }
}

impl MetaStore for NullStore {
    fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.state
            .lock()
            .unwrap()
            .meta
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.state.lock().unwrap().meta.get(key).cloned())
    }

    fn get_schema_version(&self) -> Result<u32, StoreError> {
        Ok(self
            .get_meta("schema_version")?
            .and_then(|b| b.try_into().ok().map(u32::from_le_bytes))
            .unwrap_or(0))
    }

    fn set_schema_version(&self, version: u32) -> Result<(), StoreError> {
        self.put_meta("schema_version", &version.to_le_bytes())
    }
}
