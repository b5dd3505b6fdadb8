//! Shared utilities for ProofPass binaries.

pub mod logging;

pub use logging::{init_logging, LogFormat, LoggingError};
