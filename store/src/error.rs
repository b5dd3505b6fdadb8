use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    /// An index entry points at a record that does not exist.
    #[error("database is corrupted: {0}")]
    Corruption(String),
}
