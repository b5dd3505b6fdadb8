//! Lazy paging over the activity log.

use std::sync::Arc;

use proofpass_store::LedgerStore;
use proofpass_types::ActivityLogEntry;

use crate::RegistryError;

/// Walks the activity log one page at a time, oldest first.
///
/// Each call to `next` issues one range read, so entries appended while the
/// walk is in progress show up in later pages. The walk ends after the first
/// short page. Cloning a fresh walk or calling [`ActivityPages::restart`]
/// starts again from the beginning.
#[derive(Clone)]
pub struct ActivityPages {
    ledger: Arc<dyn LedgerStore>,
    page_size: usize,
    offset: u64,
    done: bool,
}

impl ActivityPages {
    pub(crate) fn new(ledger: Arc<dyn LedgerStore>, page_size: usize) -> Self {
        Self {
            ledger,
            page_size: page_size.max(1),
            offset: 0,
            done: false,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Sequence number of the first entry the next page will contain.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn restart(&mut self) {
        self.offset = 0;
        self.done = false;
    }
}

impl Iterator for ActivityPages {
    type Item = Result<Vec<ActivityLogEntry>, RegistryError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let page = match self.ledger.get_activity_range(self.offset, self.page_size) {
            Ok(page) => page,
            Err(e) => {
                self.done = true;
                return Some(Err(e.into()));
            }
        };
        if page.len() < self.page_size {
            self.done = true;
        }
        if page.is_empty() {
            return None;
        }
        self.offset += page.len() as u64;
        Some(Ok(page))
    }
}
