//! Soulbound certificate records.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Address, Timestamp};

/// Identifier of an issued certificate. Assigned sequentially from 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CertificateId(u64);

impl CertificateId {
    /// The first identifier ever assigned.
    pub const FIRST: Self = Self(1);

    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    /// The identifier that follows this one.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Big-endian bytes, used as an ordered storage key.
    pub fn to_be_bytes(&self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for CertificateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A non-transferable certificate bound to its owner.
///
/// Nothing about a certificate changes after issuance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    pub id: CertificateId,
    /// The holder. Fixed forever.
    pub owner: Address,
    /// The authorized issuer that minted it.
    pub issuer: Address,
    /// Content pointer to the metadata document (e.g. an IPFS CID).
    pub metadata_uri: String,
    pub issued_at: Timestamp,
}
