//! Verification and issuer-authorization requests.
//!
//! Both request kinds share one lifecycle: created `Pending`, resolved exactly
//! once to `Approved` or `Rejected`, terminal afterwards. A fresh submission
//! after resolution is a new record with a new [`RequestId`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Address, CertificateId, Timestamp};

/// Sequential identifier of a request, unique within its request kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
    pub const FIRST: Self = Self(1);

    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    pub fn to_be_bytes(&self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a request is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Awaiting a decision.
    Pending,
    /// Accepted. Terminal.
    Approved,
    /// Declined. Terminal.
    Rejected,
}

impl RequestStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Whether no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        !self.is_pending()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A requester's ask to have a certificate confirmed by its issuer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRequest {
    pub id: RequestId,
    pub requester: Address,
    pub certificate_id: CertificateId,
    pub reason: String,
    pub submitted_at: Timestamp,
    pub status: RequestStatus,
    /// Set only when `status` is `Rejected`.
    pub rejection_reason: Option<String>,
    pub resolved_by: Option<Address>,
    pub resolved_at: Option<Timestamp>,
}

impl VerificationRequest {
    pub fn is_pending(&self) -> bool {
        self.status.is_pending()
    }
}

/// An address asking to join the authorized-issuer set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerRequest {
    pub id: RequestId,
    pub requester: Address,
    pub reason: String,
    pub submitted_at: Timestamp,
    pub status: RequestStatus,
    pub rejection_reason: Option<String>,
    pub resolved_at: Option<Timestamp>,
}

impl IssuerRequest {
    pub fn is_pending(&self) -> bool {
        self.status.is_pending()
    }
}
