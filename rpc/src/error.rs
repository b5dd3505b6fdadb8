//! RPC error types and their HTTP rendering.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use proofpass_registry::RegistryError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("metrics are disabled")]
    MetricsDisabled,

    #[error("server error: {0}")]
    Server(String),
}

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl RpcError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Registry(e) => e.kind(),
            Self::InvalidRequest(_) => "invalid_input",
            Self::MetricsDisabled => "not_found",
            Self::Server(_) => "server",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::FORBIDDEN,
            "duplicate_pending_request" | "already_resolved" => StatusCode::CONFLICT,
            "invalid_input" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, "rpc request failed");
        }
        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_kind() {
        let cases = [
            (RegistryError::NotFound("c".into()), StatusCode::NOT_FOUND),
            (
                RegistryError::DuplicatePendingRequest("r".into()),
                StatusCode::CONFLICT,
            ),
            (RegistryError::AlreadyResolved("r".into()), StatusCode::CONFLICT),
            (RegistryError::InvalidInput("r".into()), StatusCode::BAD_REQUEST),
        ];
        for (err, status) in cases {
            assert_eq!(RpcError::from(err).status(), status);
        }
        assert_eq!(
            RpcError::InvalidRequest("bad json".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RpcError::Server("join".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
