//! Append-only activity log records.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Address, CertificateId, Timestamp};

/// Which flow an activity entry belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionScope {
    /// Certificate verification requests.
    Verification,
    /// Issuer-authorization requests and direct authorize/revoke toggles.
    IssuerAuthorization,
    /// Certificate issuance.
    Certificate,
    /// Skill endorsements.
    Endorsement,
    /// Employer registration and verification.
    Employer,
}

impl ActionScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verification => "VERIFICATION",
            Self::IssuerAuthorization => "ISSUER",
            Self::Certificate => "CERTIFICATE",
            Self::Endorsement => "ENDORSEMENT",
            Self::Employer => "EMPLOYER",
        }
    }
}

/// What happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    Request,
    Approve,
    Reject,
    Authorize,
    Revoke,
    Issue,
    Endorse,
    Register,
    Verify,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Request => "REQUEST",
            Self::Approve => "APPROVE",
            Self::Reject => "REJECT",
            Self::Authorize => "AUTHORIZE",
            Self::Revoke => "REVOKE",
            Self::Issue => "ISSUE",
            Self::Endorse => "ENDORSE",
            Self::Register => "REGISTER",
            Self::Verify => "VERIFY",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable entry in the activity log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    /// Zero-based insertion sequence. Assigned by the store on append.
    pub seq: u64,
    pub actor: Address,
    pub target: Address,
    pub scope: ActionScope,
    pub action: ActionKind,
    pub certificate_id: Option<CertificateId>,
    pub details: String,
    pub timestamp: Timestamp,
}

impl ActivityLogEntry {
    /// Combined label such as `VERIFICATION_REJECT` or `ISSUER_AUTHORIZE`.
    pub fn label(&self) -> String {
        format!("{}_{}", self.scope.as_str(), self.action.as_str())
    }

    /// Whether `address` is the actor or the target of this entry.
    pub fn involves(&self, address: &Address) -> bool {
        self.actor == *address || self.target == *address
    }
}
