//! Organizations registered to endorse skills.

use serde::{Deserialize, Serialize};

use crate::{Address, Timestamp};

/// A registered employer profile. `verified` is set by the registry owner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employer {
    pub address: Address,
    pub name: String,
    pub description: String,
    pub website: String,
    pub verified: bool,
    pub registered_at: Timestamp,
}
