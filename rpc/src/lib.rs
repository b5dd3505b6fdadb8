//! JSON RPC server for the ProofPass registry.
//!
//! Provides endpoints for:
//! - `POST /`: every registry operation, selected by the `action` field
//! - `GET /health`: liveness
//! - `GET /metrics`: Prometheus text exposition, when enabled

pub mod error;
pub mod handlers;
pub mod pagination;
pub mod server;

pub use error::RpcError;
pub use handlers::RpcRequest;
pub use server::{router, RpcServer, RpcState};
