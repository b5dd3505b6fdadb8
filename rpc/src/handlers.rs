//! RPC request and response bodies, and dispatch onto the registry.

use proofpass_registry::{IssuerStatus, VerificationRegistry};
use proofpass_types::{
    ActivityLogEntry, Address, Certificate, CertificateId, Employer, Endorsement, IssuerRequest,
    RequestId, VerificationRequest,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RpcError;
use crate::pagination::{next_offset, PaginationMeta, PaginationParams};

/// One call, tagged by its `action` field.
///
/// Mutations carry the `caller` address acting on the registry.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RpcRequest {
    // ── Verification requests ───────────────────────────────────────────
    SubmitVerificationRequest {
        caller: Address,
        certificate_id: CertificateId,
        reason: String,
    },
    ApproveVerificationRequest {
        caller: Address,
        certificate_id: CertificateId,
        requester: Address,
    },
    RejectVerificationRequest {
        caller: Address,
        certificate_id: CertificateId,
        requester: Address,
        reason: String,
    },

    // ── Issuer authorization ────────────────────────────────────────────
    SubmitIssuerRequest {
        caller: Address,
        reason: String,
    },
    ApproveIssuerRequest {
        caller: Address,
        requester: Address,
    },
    RejectIssuerRequest {
        caller: Address,
        requester: Address,
        reason: String,
    },
    AuthorizeIssuer {
        caller: Address,
        address: Address,
    },
    RevokeIssuer {
        caller: Address,
        address: Address,
    },

    // ── Certificates and endorsements ───────────────────────────────────
    IssueCertificate {
        caller: Address,
        recipient: Address,
        metadata_uri: String,
    },
    AddEndorsement {
        caller: Address,
        user: Address,
        skill: String,
        #[serde(default)]
        comment: String,
    },

    // ── Employers ───────────────────────────────────────────────────────
    RegisterEmployer {
        caller: Address,
        name: String,
        description: String,
        website: String,
    },
    VerifyEmployer {
        caller: Address,
        address: Address,
    },

    // ── Queries ─────────────────────────────────────────────────────────
    PendingRequesters,
    IssuerRequest {
        address: Address,
    },
    CertificateVerificationRequests {
        certificate_id: CertificateId,
    },
    ActivityLogs {
        offset: Option<u64>,
        limit: Option<u32>,
        address: Option<Address>,
    },
    Issuers,
    IsAuthorizedIssuer {
        address: Address,
    },
    Certificate {
        certificate_id: CertificateId,
    },
    CertificatesOf {
        owner: Address,
    },
    TotalSupply,
    UserEndorsements {
        user: Address,
    },
    IsEmployer {
        address: Address,
    },
    Employer {
        address: Address,
    },
    Employers,
    Owner,
}

impl RpcRequest {
    /// The snake_case action name, for logging.
    pub fn action(&self) -> &'static str {
        match self {
            Self::SubmitVerificationRequest { .. } => "submit_verification_request",
            Self::ApproveVerificationRequest { .. } => "approve_verification_request",
            Self::RejectVerificationRequest { .. } => "reject_verification_request",
            Self::SubmitIssuerRequest { .. } => "submit_issuer_request",
            Self::ApproveIssuerRequest { .. } => "approve_issuer_request",
            Self::RejectIssuerRequest { .. } => "reject_issuer_request",
            Self::AuthorizeIssuer { .. } => "authorize_issuer",
            Self::RevokeIssuer { .. } => "revoke_issuer",
            Self::IssueCertificate { .. } => "issue_certificate",
            Self::AddEndorsement { .. } => "add_endorsement",
            Self::RegisterEmployer { .. } => "register_employer",
            Self::VerifyEmployer { .. } => "verify_employer",
            Self::PendingRequesters => "pending_requesters",
            Self::IssuerRequest { .. } => "issuer_request",
            Self::CertificateVerificationRequests { .. } => "certificate_verification_requests",
            Self::ActivityLogs { .. } => "activity_logs",
            Self::Issuers => "issuers",
            Self::IsAuthorizedIssuer { .. } => "is_authorized_issuer",
            Self::Certificate { .. } => "certificate",
            Self::CertificatesOf { .. } => "certificates_of",
            Self::TotalSupply => "total_supply",
            Self::UserEndorsements { .. } => "user_endorsements",
            Self::IsEmployer { .. } => "is_employer",
            Self::Employer { .. } => "employer",
            Self::Employers => "employers",
            Self::Owner => "owner",
        }
    }
}

// ── Responses ────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct RequestIdResponse {
    pub request_id: RequestId,
}

#[derive(Serialize)]
pub struct AcceptedResponse {
    pub accepted: bool,
}

#[derive(Serialize)]
pub struct VerificationRequestResponse {
    pub request: VerificationRequest,
}

#[derive(Serialize)]
pub struct IssuerRequestResponse {
    pub request: Option<IssuerRequest>,
}

#[derive(Serialize)]
pub struct CertificateIdResponse {
    pub certificate_id: CertificateId,
}

#[derive(Serialize)]
pub struct PendingRequestersResponse {
    pub requesters: Vec<Address>,
}

#[derive(Serialize)]
pub struct VerificationRequestsResponse {
    pub requests: Vec<VerificationRequest>,
}

/// An activity entry with its combined label, e.g. `VERIFICATION_REJECT`.
#[derive(Serialize)]
pub struct ActivityEntryView {
    #[serde(flatten)]
    pub entry: ActivityLogEntry,
    pub label: String,
}

impl From<ActivityLogEntry> for ActivityEntryView {
    fn from(entry: ActivityLogEntry) -> Self {
        let label = entry.label();
        Self { entry, label }
    }
}

#[derive(Serialize)]
pub struct ActivityLogsResponse {
    pub entries: Vec<ActivityEntryView>,
    /// Length of the whole log; absent for address-filtered pages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(flatten)]
    pub pagination: PaginationMeta,
}

#[derive(Serialize)]
pub struct IssuersResponse {
    pub issuers: Vec<IssuerStatus>,
}

#[derive(Serialize)]
pub struct IsAuthorizedIssuerResponse {
    pub address: Address,
    pub authorized: bool,
}

#[derive(Serialize)]
pub struct CertificateResponse {
    pub certificate: Certificate,
}

#[derive(Serialize)]
pub struct CertificatesResponse {
    pub certificates: Vec<Certificate>,
}

#[derive(Serialize)]
pub struct TotalSupplyResponse {
    pub total_supply: u64,
}

#[derive(Serialize)]
pub struct EndorsementsResponse {
    pub endorsements: Vec<Endorsement>,
}

#[derive(Serialize)]
pub struct EmployerResponse {
    pub employer: Employer,
}

/// Profile lookup; `employer` is null for an unregistered address.
#[derive(Serialize)]
pub struct EmployerDetailsResponse {
    pub employer: Option<Employer>,
}

#[derive(Serialize)]
pub struct IsEmployerResponse {
    pub address: Address,
    pub employer: bool,
}

#[derive(Serialize)]
pub struct EmployersResponse {
    pub employers: Vec<Employer>,
}

#[derive(Serialize)]
pub struct OwnerResponse {
    pub owner: Address,
}

fn to_json<T: Serialize>(value: T) -> Result<Value, RpcError> {
    serde_json::to_value(value).map_err(|e| RpcError::Server(e.to_string()))
}

const ACCEPTED: AcceptedResponse = AcceptedResponse { accepted: true };

/// Execute one request against the registry.
///
/// Blocking: the registry reads and writes storage synchronously.
pub fn dispatch(registry: &VerificationRegistry, request: RpcRequest) -> Result<Value, RpcError> {
    match request {
        RpcRequest::SubmitVerificationRequest {
            caller,
            certificate_id,
            reason,
        } => {
            let request_id =
                registry.submit_verification_request(caller, certificate_id, &reason)?;
            to_json(RequestIdResponse { request_id })
        }
        RpcRequest::ApproveVerificationRequest {
            caller,
            certificate_id,
            requester,
        } => {
            let request =
                registry.approve_verification_request(caller, certificate_id, requester)?;
            to_json(VerificationRequestResponse { request })
        }
        RpcRequest::RejectVerificationRequest {
            caller,
            certificate_id,
            requester,
            reason,
        } => {
            let request = registry.reject_verification_request(
                caller,
                certificate_id,
                requester,
                &reason,
            )?;
            to_json(VerificationRequestResponse { request })
        }
        RpcRequest::SubmitIssuerRequest { caller, reason } => {
            let request_id = registry.submit_issuer_request(caller, &reason)?;
            to_json(RequestIdResponse { request_id })
        }
        RpcRequest::ApproveIssuerRequest { caller, requester } => {
            let request = registry.approve_issuer_request(caller, requester)?;
            to_json(IssuerRequestResponse {
                request: Some(request),
            })
        }
        RpcRequest::RejectIssuerRequest {
            caller,
            requester,
            reason,
        } => {
            let request = registry.reject_issuer_request(caller, requester, &reason)?;
            to_json(IssuerRequestResponse {
                request: Some(request),
            })
        }
        RpcRequest::AuthorizeIssuer { caller, address } => {
            registry.authorize_issuer(caller, address)?;
            to_json(ACCEPTED)
        }
        RpcRequest::RevokeIssuer { caller, address } => {
            registry.revoke_issuer(caller, address)?;
            to_json(ACCEPTED)
        }
        RpcRequest::IssueCertificate {
            caller,
            recipient,
            metadata_uri,
        } => {
            let certificate_id = registry.issue_certificate(caller, recipient, &metadata_uri)?;
            to_json(CertificateIdResponse { certificate_id })
        }
        RpcRequest::AddEndorsement {
            caller,
            user,
            skill,
            comment,
        } => {
            registry.add_endorsement(caller, user, &skill, &comment)?;
            to_json(ACCEPTED)
        }
        RpcRequest::RegisterEmployer {
            caller,
            name,
            description,
            website,
        } => to_json(EmployerResponse {
            employer: registry.register_employer(caller, &name, &description, &website)?,
        }),
        RpcRequest::VerifyEmployer { caller, address } => to_json(EmployerResponse {
            employer: registry.verify_employer(caller, address)?,
        }),
        RpcRequest::PendingRequesters => to_json(PendingRequestersResponse {
            requesters: registry.pending_requesters()?,
        }),
        RpcRequest::IssuerRequest { address } => to_json(IssuerRequestResponse {
            request: registry.issuer_request(&address)?,
        }),
        RpcRequest::CertificateVerificationRequests { certificate_id } => {
            to_json(VerificationRequestsResponse {
                requests: registry.certificate_verification_requests(certificate_id)?,
            })
        }
        RpcRequest::ActivityLogs {
            offset,
            limit,
            address,
        } => {
            let params = PaginationParams { offset, limit };
            let offset = params.effective_offset();
            let limit = params.effective_limit(registry.config().max_page_size);
            let (entries, total) = match address {
                Some(address) => (registry.activity_logs_for(&address, offset, limit)?, None),
                None => (
                    registry.activity_logs(offset, limit)?,
                    Some(registry.activity_log_length()?),
                ),
            };
            let pagination = PaginationMeta {
                next_offset: next_offset(offset, entries.len(), limit),
            };
            to_json(ActivityLogsResponse {
                entries: entries.into_iter().map(ActivityEntryView::from).collect(),
                total,
                pagination,
            })
        }
        RpcRequest::Issuers => to_json(IssuersResponse {
            issuers: registry.issuers()?,
        }),
        RpcRequest::IsAuthorizedIssuer { address } => to_json(IsAuthorizedIssuerResponse {
            address,
            authorized: registry.is_authorized_issuer(&address)?,
        }),
        RpcRequest::Certificate { certificate_id } => to_json(CertificateResponse {
            certificate: registry.certificate(certificate_id)?,
        }),
        RpcRequest::CertificatesOf { owner } => to_json(CertificatesResponse {
            certificates: registry.certificates_of(&owner)?,
        }),
        RpcRequest::TotalSupply => to_json(TotalSupplyResponse {
            total_supply: registry.total_supply()?,
        }),
        RpcRequest::UserEndorsements { user } => to_json(EndorsementsResponse {
            endorsements: registry.user_endorsements(&user)?,
        }),
        RpcRequest::IsEmployer { address } => to_json(IsEmployerResponse {
            address,
            employer: registry.is_employer(&address)?,
        }),
        RpcRequest::Employer { address } => to_json(EmployerDetailsResponse {
            employer: registry.employer(&address)?,
        }),
        RpcRequest::Employers => to_json(EmployersResponse {
            employers: registry.employers()?,
        }),
        RpcRequest::Owner => to_json(OwnerResponse {
            owner: registry.owner(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn requests_parse_from_tagged_json() {
        let request: RpcRequest = serde_json::from_value(json!({
            "action": "reject_verification_request",
            "caller": "0x1111111111111111111111111111111111111111",
            "certificate_id": 7,
            "requester": "0x2222222222222222222222222222222222222222",
            "reason": "insufficient proof",
        }))
        .unwrap();
        assert_eq!(request.action(), "reject_verification_request");
        match request {
            RpcRequest::RejectVerificationRequest {
                certificate_id,
                reason,
                ..
            } => {
                assert_eq!(certificate_id, CertificateId::new(7));
                assert_eq!(reason, "insufficient proof");
            }
            other => panic!("unexpected request {other:?}"),
        }
    }

    #[test]
    fn employer_registration_parses() {
        let request: RpcRequest = serde_json::from_value(json!({
            "action": "register_employer",
            "caller": "0x1111111111111111111111111111111111111111",
            "name": "Acme",
            "description": "widgets",
            "website": "https://acme.example",
        }))
        .unwrap();
        assert_eq!(request.action(), "register_employer");
        assert!(matches!(request, RpcRequest::RegisterEmployer { ref name, .. } if name == "Acme"));
    }

    #[test]
    fn unit_actions_parse() {
        let request: RpcRequest =
            serde_json::from_value(json!({ "action": "pending_requesters" })).unwrap();
        assert!(matches!(request, RpcRequest::PendingRequesters));
    }

    #[test]
    fn bad_address_is_refused() {
        let result = serde_json::from_value::<RpcRequest>(json!({
            "action": "issuer_request",
            "address": "0x1234",
        }));
        assert!(result.is_err());
    }

    #[test]
    fn endorsement_comment_is_optional() {
        let request: RpcRequest = serde_json::from_value(json!({
            "action": "add_endorsement",
            "caller": "0x1111111111111111111111111111111111111111",
            "user": "0x2222222222222222222222222222222222222222",
            "skill": "rust",
        }))
        .unwrap();
        assert!(matches!(request, RpcRequest::AddEndorsement { ref comment, .. } if comment.is_empty()));
    }
}
