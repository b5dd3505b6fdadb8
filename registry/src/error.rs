use proofpass_store::StoreError;
use thiserror::Error;

use crate::Role;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("{caller} lacks the {role} role")]
    Unauthorized { caller: String, role: Role },

    #[error("a pending request already exists: {0}")]
    DuplicatePendingRequest(String),

    #[error("request already resolved: {0}")]
    AlreadyResolved(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl RegistryError {
    /// Stable snake_case name of the error kind, used on the wire and as a
    /// metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Unauthorized { .. } => "unauthorized",
            Self::DuplicatePendingRequest(_) => "duplicate_pending_request",
            Self::AlreadyResolved(_) => "already_resolved",
            Self::InvalidInput(_) => "invalid_input",
            Self::Store(_) => "store",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proofpass_types::CertificateId;

    #[test]
    fn kinds_are_snake_case() {
        let cases = [
            (RegistryError::NotFound("x".into()), "not_found"),
            (
                RegistryError::Unauthorized {
                    caller: "0x01".into(),
                    role: Role::CertificateIssuer(CertificateId::new(7)),
                },
                "unauthorized",
            ),
            (
                RegistryError::DuplicatePendingRequest("x".into()),
                "duplicate_pending_request",
            ),
            (RegistryError::AlreadyResolved("x".into()), "already_resolved"),
            (RegistryError::InvalidInput("x".into()), "invalid_input"),
            (
                RegistryError::Store(StoreError::Backend("disk".into())),
                "store",
            ),
        ];
        for (err, kind) in cases {
            assert_eq!(err.kind(), kind);
        }
    }

    #[test]
    fn unauthorized_names_the_role() {
        let err = RegistryError::Unauthorized {
            caller: "0xabc".into(),
            role: Role::CertificateIssuer(CertificateId::new(7)),
        };
        assert_eq!(err.to_string(), "0xabc lacks the issuer of certificate #7 role");
    }
}
