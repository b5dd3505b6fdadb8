//! Offset-based pagination for list endpoints.
//!
//! The upper bound on a page is the registry's configured
//! `max_page_size`; this module only supplies the default.

use serde::{Deserialize, Serialize};

/// Default page size when `limit` is not specified.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Pagination parameters accepted by list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationParams {
    /// Position of the first item to return.
    pub offset: Option<u64>,
    /// Number of items per page (default 100). Zero yields an empty page.
    pub limit: Option<u32>,
}

impl PaginationParams {
    /// The page size actually served: the requested limit, clamped to
    /// `max_page_size`.
    pub fn effective_limit(&self, max_page_size: usize) -> usize {
        let requested = self.limit.unwrap_or(DEFAULT_PAGE_SIZE);
        usize::try_from(requested)
            .unwrap_or(usize::MAX)
            .min(max_page_size)
    }

    pub fn effective_offset(&self) -> u64 {
        self.offset.unwrap_or(0)
    }
}

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, Serialize)]
pub struct PaginationMeta {
    /// Offset to pass for the next page, or `None` if this is the last page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_offset: Option<u64>,
}

/// Compute the next-page offset given the current offset and the number of
/// items returned. Returns `None` when fewer items than `page_size` came
/// back (the end was reached) or the page size is zero.
pub fn next_offset(current_offset: u64, returned: usize, page_size: usize) -> Option<u64> {
    if page_size == 0 || returned < page_size {
        None
    } else {
        Some(current_offset + returned as u64)
    }
}
