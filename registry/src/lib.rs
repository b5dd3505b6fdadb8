//! The ProofPass verification registry.
//!
//! Owns the lifecycle of two request kinds that share one state machine:
//!
//! ```text
//!         submit
//!  (none) ------> pending --approve--> approved (terminal)
//!                    |
//!                    +--reject--> rejected (terminal)
//! ```
//!
//! - **Verification requests**: a requester asks a certificate's issuer to
//!   confirm it. At most one pending request per (requester, certificate).
//! - **Issuer requests**: an address asks the owner for the right to issue
//!   certificates. At most one pending request per address.
//!
//! Alongside these the registry keeps the authorized-issuer set, issues
//! soulbound certificates, registers employers, records the skill
//! endorsements those employers give, and appends exactly one activity log
//! entry per successful mutation.

pub mod access;
pub mod activity;
pub mod config;
pub mod error;
pub mod metrics;
pub mod registry;

pub use access::Role;
pub use activity::ActivityPages;
pub use config::RegistryConfig;
pub use error::RegistryError;
pub use metrics::{MetricsError, RegistryMetrics};
pub use registry::{IssuerStatus, VerificationRegistry};
