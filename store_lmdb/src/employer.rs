//! LMDB implementation of EmployerStore.

use proofpass_store::{EmployerStore, StoreError};
use proofpass_types::{Address, Employer};

use crate::{LmdbEnvironment, LmdbError};

impl EmployerStore for LmdbEnvironment {
    fn get_employer(&self, address: &Address) -> Result<Option<Employer>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self
            .employers_db
            .get(&rtxn, address.as_bytes())
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Ok(Some(bincode::deserialize(bytes).map_err(LmdbError::from)?)),
            None => Ok(None),
        }
    }

    fn get_employers(&self) -> Result<Vec<Employer>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut employers = Vec::new();
        for result in self.employers_db.iter(&rtxn).map_err(LmdbError::from)? {
            let (_, bytes) = result.map_err(LmdbError::from)?;
            employers.push(bincode::deserialize(bytes).map_err(LmdbError::from)?);
        }
        Ok(employers)
    }
}
