//! Employer profile storage trait.

use crate::StoreError;
use proofpass_types::{Address, Employer};

pub trait EmployerStore {
    fn get_employer(&self, address: &Address) -> Result<Option<Employer>, StoreError>;

    /// Every registered employer, ordered by address.
    fn get_employers(&self) -> Result<Vec<Employer>, StoreError>;
}
