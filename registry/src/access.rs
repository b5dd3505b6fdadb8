//! Capability checks.
//!
//! Every privileged mutation names the role it needs and asks [`require`]
//! whether the caller holds it. Roles are evaluated against persisted state
//! at the time of the call, never cached.

use std::fmt;

use proofpass_store::LedgerStore;
use proofpass_types::{Address, CertificateId};

use crate::RegistryError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// The registry owner fixed in configuration.
    Owner,
    /// Any address currently in the authorized-issuer set.
    AuthorizedIssuer,
    /// The recorded issuer of one certificate. Held even after the issuer
    /// has been revoked, so open requests on its certificates stay resolvable.
    CertificateIssuer(CertificateId),
    /// Any address with a registered employer profile, verified or not.
    Employer,
    /// Held by every address.
    Requester,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owner => f.write_str("owner"),
            Self::AuthorizedIssuer => f.write_str("authorized issuer"),
            Self::CertificateIssuer(id) => write!(f, "issuer of certificate {}", id),
            Self::Employer => f.write_str("registered employer"),
            Self::Requester => f.write_str("requester"),
        }
    }
}

/// Whether `caller` holds `role`.
///
/// `CertificateIssuer` on an unknown certificate is `NotFound` rather than
/// `false`, so callers report the missing certificate first.
pub fn holds(
    ledger: &dyn LedgerStore,
    owner: &Address,
    caller: &Address,
    role: Role,
) -> Result<bool, RegistryError> {
    match role {
        Role::Owner => Ok(caller == owner),
        Role::AuthorizedIssuer => Ok(ledger.is_authorized_issuer(caller)?),
        Role::CertificateIssuer(id) => {
            let certificate = ledger
                .get_certificate(id)?
                .ok_or_else(|| RegistryError::NotFound(format!("certificate {}", id)))?;
            Ok(certificate.issuer == *caller)
        }
        Role::Employer => Ok(ledger.get_employer(caller)?.is_some()),
        Role::Requester => Ok(true),
    }
}

/// Fail with `Unauthorized` unless `caller` holds `role`.
pub fn require(
    ledger: &dyn LedgerStore,
    owner: &Address,
    caller: &Address,
    role: Role,
) -> Result<(), RegistryError> {
    if holds(ledger, owner, caller, role)? {
        Ok(())
    } else {
        Err(RegistryError::Unauthorized {
            caller: caller.to_string(),
            role,
        })
    }
}
