//! The registry running on the LMDB backend.

use std::sync::Arc;

use proofpass_nullables::NullClock;
use proofpass_registry::{RegistryConfig, RegistryError, VerificationRegistry};
use proofpass_store_lmdb::{check_integrity, LmdbEnvironment, Migrator};
use proofpass_types::{ActionKind, Address, CertificateId, RequestStatus};

fn addr(n: u8) -> Address {
    Address::new([n; 20])
}

const OWNER: u8 = 0xA0;
const ISSUER: u8 = 0x11;
const REQUESTER: u8 = 0x22;

fn open(dir: &std::path::Path) -> Arc<LmdbEnvironment> {
    let env = LmdbEnvironment::open(dir, 16, 10 * 1024 * 1024).expect("open env");
    Migrator::run(&env).expect("migrate");
    Arc::new(env)
}

fn registry(env: Arc<LmdbEnvironment>) -> VerificationRegistry {
    VerificationRegistry::new(
        env,
        Arc::new(NullClock::new(1_000)),
        RegistryConfig::new(addr(OWNER)),
    )
    .expect("registry")
}

#[test]
fn rejection_scenario_on_lmdb() {
    let dir = tempfile::tempdir().unwrap();
    let env = open(dir.path());
    let registry = registry(env.clone());

    registry.authorize_issuer(addr(OWNER), addr(ISSUER)).unwrap();
    for n in 1..=7u8 {
        registry
            .issue_certificate(addr(ISSUER), addr(n), &format!("ipfs://cert-{n}"))
            .unwrap();
    }
    let cert = CertificateId::new(7);
    let start = registry.activity_log_length().unwrap();

    registry
        .submit_verification_request(addr(REQUESTER), cert, "employment check")
        .unwrap();
    let err = registry
        .submit_verification_request(addr(REQUESTER), cert, "employment check")
        .unwrap_err();
    assert!(matches!(err, RegistryError::DuplicatePendingRequest(_)));

    registry
        .reject_verification_request(addr(ISSUER), cert, addr(REQUESTER), "insufficient proof")
        .unwrap();
    let err = registry
        .approve_verification_request(addr(ISSUER), cert, addr(REQUESTER))
        .unwrap_err();
    assert!(matches!(err, RegistryError::AlreadyResolved(_)));

    let requests = registry.certificate_verification_requests(cert).unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].status, RequestStatus::Rejected);

    let entries = registry.activity_logs(start, 10).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!((entries[0].actor, entries[0].action), (addr(REQUESTER), ActionKind::Request));
    assert_eq!((entries[1].actor, entries[1].action), (addr(ISSUER), ActionKind::Reject));
    assert_eq!(entries[1].details, "insufficient proof");

    let report = check_integrity(&env).unwrap();
    assert!(report.is_healthy(), "{:?}", report.errors);
}

#[test]
fn issuer_scenario_on_lmdb() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry(open(dir.path()));
    let a = addr(0x77);

    registry.submit_issuer_request(a, "want to issue degrees").unwrap();
    registry.approve_issuer_request(addr(OWNER), a).unwrap();
    assert!(registry.is_authorized_issuer(&a).unwrap());
    registry.submit_issuer_request(a, "second").unwrap();
    assert_eq!(registry.pending_requesters().unwrap(), vec![a]);
    assert_eq!(registry.activity_log_length().unwrap(), 3);
}

#[test]
fn state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let registry = registry(open(dir.path()));
        registry.authorize_issuer(addr(OWNER), addr(ISSUER)).unwrap();
        let cert = registry
            .issue_certificate(addr(ISSUER), addr(3), "ipfs://x")
            .unwrap();
        registry
            .submit_verification_request(addr(REQUESTER), cert, "check")
            .unwrap();
        registry
            .register_employer(addr(4), "Acme", "widgets", "https://acme.example")
            .unwrap();
        registry.add_endorsement(addr(4), addr(3), "rust", "").unwrap();
    }

    let registry = registry(open(dir.path()));
    let cert = CertificateId::new(1);
    assert_eq!(registry.total_supply().unwrap(), 1);
    assert_eq!(registry.certificates_of(&addr(3)).unwrap()[0].id, cert);
    assert_eq!(registry.user_endorsements(&addr(3)).unwrap().len(), 1);
    assert!(registry.is_employer(&addr(4)).unwrap());
    assert_eq!(registry.activity_log_length().unwrap(), 5);

    // The pending index is persisted too.
    let err = registry
        .submit_verification_request(addr(REQUESTER), cert, "again")
        .unwrap_err();
    assert!(matches!(err, RegistryError::DuplicatePendingRequest(_)));

    // Sequence numbers continue after the reopen.
    registry.revoke_issuer(addr(OWNER), addr(ISSUER)).unwrap();
    let last = registry.activity_logs(5, 1).unwrap();
    assert_eq!(last[0].seq, 5);
}

#[test]
fn pages_and_filters_on_lmdb() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry(open(dir.path()));
    for n in 1..=5u8 {
        registry.authorize_issuer(addr(OWNER), addr(n)).unwrap();
    }
    let sizes: Vec<_> = registry
        .activity_pages(2)
        .map(|p| p.unwrap().len())
        .collect();
    assert_eq!(sizes, vec![2, 2, 1]);

    let for_three = registry.activity_logs_for(&addr(3), 0, 10).unwrap();
    assert_eq!(for_three.len(), 1);
    assert_eq!(for_three[0].seq, 2);
    assert_eq!(registry.activity_logs_for(&addr(OWNER), 3, 10).unwrap().len(), 2);
    assert!(registry.activity_logs(5, 10).unwrap().is_empty());
}
