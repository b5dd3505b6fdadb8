//! Registry configuration, injected once at startup.

use proofpass_types::Address;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_TEXT_LEN: usize = 1024;
pub const DEFAULT_MAX_PAGE_SIZE: usize = 1000;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// The owner address: resolves issuer requests and toggles issuers.
    pub owner: Address,

    /// Longest accepted reason, rejection reason, metadata URI, skill or
    /// comment, in characters.
    #[serde(default = "default_max_text_len")]
    pub max_text_len: usize,

    /// Upper bound applied to every activity log page.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
}

fn default_max_text_len() -> usize {
    DEFAULT_MAX_TEXT_LEN
}

fn default_max_page_size() -> usize {
    DEFAULT_MAX_PAGE_SIZE
}

impl RegistryConfig {
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            max_text_len: DEFAULT_MAX_TEXT_LEN,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}
