//! Fundamental types for the ProofPass registry.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! addresses, identifiers, timestamps, and the records the registry persists
//! (certificates, verification and issuer requests, employers, endorsements,
//! activity entries).

pub mod activity;
pub mod address;
pub mod certificate;
pub mod employer;
pub mod endorsement;
pub mod error;
pub mod request;
pub mod time;

pub use activity::{ActionKind, ActionScope, ActivityLogEntry};
pub use address::Address;
pub use certificate::{Certificate, CertificateId};
pub use employer::Employer;
pub use endorsement::Endorsement;
pub use error::AddressError;
pub use request::{IssuerRequest, RequestId, RequestStatus, VerificationRequest};
pub use time::{Clock, SystemClock, Timestamp};
