use std::sync::Arc;

use proptest::prelude::*;

use proofpass_nullables::{NullClock, NullStore};
use proofpass_registry::{RegistryConfig, RegistryError, VerificationRegistry};
use proofpass_types::{Address, CertificateId, RequestStatus};

const OWNER: u8 = 0xA0;
const ISSUER: u8 = 0x11;

fn addr(n: u8) -> Address {
    Address::new([n; 20])
}

/// One step against a registry that already holds certificates #1..=3.
#[derive(Clone, Debug)]
enum Op {
    Submit { requester: u8, cert: u64 },
    Approve { requester: u8, cert: u64 },
    Reject { requester: u8, cert: u64 },
    IssuerRequest { requester: u8 },
    ApproveIssuer { requester: u8 },
    Authorize { address: u8 },
    Revoke { address: u8 },
    RegisterEmployer { address: u8 },
    Endorse { endorser: u8, user: u8 },
}

fn op() -> impl Strategy<Value = Op> {
    let requester = 1u8..5;
    let cert = 1u64..5;
    prop_oneof![
        (requester.clone(), cert.clone()).prop_map(|(requester, cert)| Op::Submit { requester, cert }),
        (requester.clone(), cert.clone()).prop_map(|(requester, cert)| Op::Approve { requester, cert }),
        (requester.clone(), cert).prop_map(|(requester, cert)| Op::Reject { requester, cert }),
        requester.clone().prop_map(|requester| Op::IssuerRequest { requester }),
        requester.clone().prop_map(|requester| Op::ApproveIssuer { requester }),
        requester.clone().prop_map(|address| Op::Authorize { address }),
        requester.clone().prop_map(|address| Op::Revoke { address }),
        requester.clone().prop_map(|address| Op::RegisterEmployer { address }),
        (requester.clone(), requester).prop_map(|(endorser, user)| Op::Endorse { endorser, user }),
    ]
}

fn setup() -> VerificationRegistry {
    let registry = VerificationRegistry::new(
        Arc::new(NullStore::new()),
        Arc::new(NullClock::new(0)),
        RegistryConfig::new(addr(OWNER)),
    )
    .unwrap();
    registry.authorize_issuer(addr(OWNER), addr(ISSUER)).unwrap();
    for holder in 0x30..0x33u8 {
        registry
            .issue_certificate(addr(ISSUER), addr(holder), "ipfs://cert")
            .unwrap();
    }
    registry
}

fn apply(registry: &VerificationRegistry, op: &Op) -> Result<(), RegistryError> {
    match *op {
        Op::Submit { requester, cert } => registry
            .submit_verification_request(addr(requester), CertificateId::new(cert), "check")
            .map(drop),
        Op::Approve { requester, cert } => registry
            .approve_verification_request(addr(ISSUER), CertificateId::new(cert), addr(requester))
            .map(drop),
        Op::Reject { requester, cert } => registry
            .reject_verification_request(
                addr(ISSUER),
                CertificateId::new(cert),
                addr(requester),
                "no",
            )
            .map(drop),
        Op::IssuerRequest { requester } => registry
            .submit_issuer_request(addr(requester), "please")
            .map(drop),
        Op::ApproveIssuer { requester } => registry
            .approve_issuer_request(addr(OWNER), addr(requester))
            .map(drop),
        Op::Authorize { address } => registry.authorize_issuer(addr(OWNER), addr(address)),
        Op::Revoke { address } => registry.revoke_issuer(addr(OWNER), addr(address)),
        Op::RegisterEmployer { address } => registry
            .register_employer(addr(address), "Acme", "widgets", "https://acme.example")
            .map(drop),
        Op::Endorse { endorser, user } => {
            registry.add_endorsement(addr(endorser), addr(user), "rust", "")
        }
    }
}

proptest! {
    /// The log grows by exactly one entry per accepted mutation and not at
    /// all for a refused one.
    #[test]
    fn log_grows_once_per_accepted_mutation(ops in prop::collection::vec(op(), 1..60)) {
        let registry = setup();
        for op in &ops {
            let before = registry.activity_log_length().unwrap();
            let accepted = apply(&registry, op).is_ok();
            let after = registry.activity_log_length().unwrap();
            prop_assert_eq!(after, before + u64::from(accepted), "{:?}", op);
        }
        let entries = registry.activity_logs(0, 1000).unwrap();
        prop_assert!(entries.iter().enumerate().all(|(i, e)| e.seq == i as u64));
    }

    /// No certificate ever has two pending requests from one requester, and
    /// no address ever has two pending issuer requests.
    #[test]
    fn at_most_one_pending_request(ops in prop::collection::vec(op(), 1..60)) {
        let registry = setup();
        for op in &ops {
            let _ = apply(&registry, op);
        }
        for cert in 1..=3u64 {
            let requests = registry
                .certificate_verification_requests(CertificateId::new(cert))
                .unwrap();
            for requester in 1..5u8 {
                let pending = requests
                    .iter()
                    .filter(|r| r.requester == addr(requester) && r.status == RequestStatus::Pending)
                    .count();
                prop_assert!(pending <= 1);
            }
        }
        let mut pending = registry.pending_requesters().unwrap();
        let total = pending.len();
        pending.sort();
        pending.dedup();
        prop_assert_eq!(pending.len(), total);
    }

    /// Every stored endorsement was given by a registered employer.
    #[test]
    fn endorsements_only_from_employers(ops in prop::collection::vec(op(), 1..60)) {
        let registry = setup();
        for op in &ops {
            let _ = apply(&registry, op);
        }
        for user in 1..5u8 {
            for endorsement in registry.user_endorsements(&addr(user)).unwrap() {
                prop_assert!(registry.is_employer(&endorsement.endorser).unwrap());
            }
        }
    }
}
