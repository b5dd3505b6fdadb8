//! Skill endorsements between addresses.

use serde::{Deserialize, Serialize};

use crate::{Address, Timestamp};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endorsement {
    pub endorser: Address,
    pub user: Address,
    pub skill: String,
    pub comment: String,
    pub timestamp: Timestamp,
}
