//! The verification registry: business rules over a [`LedgerStore`].

use std::sync::{Arc, Mutex, PoisonError};

use proofpass_store::{LedgerStore, NewActivity, WriteBatch};
use proofpass_types::{
    ActionKind, ActionScope, ActivityLogEntry, Address, Certificate, CertificateId, Clock,
    Employer, Endorsement, IssuerRequest, RequestId, RequestStatus, VerificationRequest,
};
use serde::{Deserialize, Serialize};

use crate::access::{self, Role};
use crate::{ActivityPages, RegistryConfig, RegistryError, RegistryMetrics};

/// One row of the admin issuer listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerStatus {
    pub address: Address,
    pub authorized: bool,
}

/// Certificate verification requests, issuer authorization, certificate
/// issuance, endorsements, and the activity log, all in one ledger.
///
/// Mutations are linearized by an internal write lock held from validation
/// through commit, and each one commits exactly one [`WriteBatch`] carrying
/// its records and its single activity entry. Reads go straight to the
/// store and never wait on the lock.
pub struct VerificationRegistry {
    ledger: Arc<dyn LedgerStore>,
    clock: Arc<dyn Clock>,
    config: RegistryConfig,
    metrics: Option<Arc<RegistryMetrics>>,
    write_lock: Mutex<()>,
}

impl VerificationRegistry {
    pub fn new(
        ledger: Arc<dyn LedgerStore>,
        clock: Arc<dyn Clock>,
        config: RegistryConfig,
    ) -> Result<Self, RegistryError> {
        if config.owner.is_zero() {
            return Err(RegistryError::InvalidInput(
                "owner must not be the zero address".into(),
            ));
        }
        if config.max_page_size == 0 {
            return Err(RegistryError::InvalidInput(
                "max_page_size must be at least 1".into(),
            ));
        }
        Ok(Self {
            ledger,
            clock,
            config,
            metrics: None,
            write_lock: Mutex::new(()),
        })
    }

    /// Count accepted and refused mutations in `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<RegistryMetrics>) -> Self {
        if let Ok(len) = self.ledger.activity_len() {
            metrics.activity_log_length.set(len as i64);
        }
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn owner(&self) -> Address {
        self.config.owner
    }

    /// Fail with `Unauthorized` unless `caller` currently holds `role`.
    pub fn require(&self, caller: &Address, role: Role) -> Result<(), RegistryError> {
        access::require(&*self.ledger, &self.config.owner, caller, role)
    }

    // ── Verification requests ───────────────────────────────────────────

    pub fn submit_verification_request(
        &self,
        requester: Address,
        certificate_id: CertificateId,
        reason: &str,
    ) -> Result<RequestId, RegistryError> {
        self.mutate("submit_verification_request", || {
            self.check_text("reason", reason)?;
            self.require(&requester, Role::Requester)?;
            if requester.is_zero() {
                return Err(RegistryError::InvalidInput(
                    "requester must not be the zero address".into(),
                ));
            }
            let certificate = self.certificate(certificate_id)?;

            if let Some(existing) = self
                .ledger
                .get_pending_verification(certificate_id, &requester)?
            {
                return Err(RegistryError::DuplicatePendingRequest(format!(
                    "{} already has request {} open on certificate {}",
                    requester, existing, certificate_id
                )));
            }

            let now = self.clock.now();
            let id = RequestId::new(self.ledger.verification_request_count()? + 1);
            let mut batch = WriteBatch::new();
            batch.put_verification_request(VerificationRequest {
                id,
                requester,
                certificate_id,
                reason: reason.to_string(),
                submitted_at: now,
                status: RequestStatus::Pending,
                rejection_reason: None,
                resolved_by: None,
                resolved_at: None,
            });
            batch.append_activity(NewActivity {
                actor: requester,
                target: certificate.issuer,
                scope: ActionScope::Verification,
                action: ActionKind::Request,
                certificate_id: Some(certificate_id),
                details: reason.to_string(),
                timestamp: now,
            });
            self.ledger.commit(batch)?;

            tracing::info!(
                request = %id,
                certificate = %certificate_id,
                requester = %requester,
                "verification request submitted"
            );
            Ok(id)
        })
    }

    /// Approve `requester`'s pending request on a certificate. Only the
    /// certificate's issuer may resolve it.
    pub fn approve_verification_request(
        &self,
        approver: Address,
        certificate_id: CertificateId,
        requester: Address,
    ) -> Result<VerificationRequest, RegistryError> {
        self.mutate("approve_verification_request", || {
            self.resolve_verification(approver, certificate_id, requester, None)
        })
    }

    pub fn reject_verification_request(
        &self,
        approver: Address,
        certificate_id: CertificateId,
        requester: Address,
        rejection_reason: &str,
    ) -> Result<VerificationRequest, RegistryError> {
        self.mutate("reject_verification_request", || {
            self.check_text("rejection reason", rejection_reason)?;
            self.resolve_verification(approver, certificate_id, requester, Some(rejection_reason))
        })
    }

    /// Shared approve/reject path. `rejection` is `None` for approval.
    fn resolve_verification(
        &self,
        approver: Address,
        certificate_id: CertificateId,
        requester: Address,
        rejection: Option<&str>,
    ) -> Result<VerificationRequest, RegistryError> {
        self.require(&approver, Role::CertificateIssuer(certificate_id))?;

        let Some(id) = self
            .ledger
            .get_pending_verification(certificate_id, &requester)?
        else {
            let latest = self
                .ledger
                .get_verification_requests_for(certificate_id)?
                .into_iter()
                .filter(|r| r.requester == requester)
                .last();
            return Err(match latest {
                Some(request) => RegistryError::AlreadyResolved(format!(
                    "verification request {} is {}",
                    request.id, request.status
                )),
                None => RegistryError::NotFound(format!(
                    "verification request from {} on certificate {}",
                    requester, certificate_id
                )),
            });
        };

        let mut request = self.ledger.get_verification_request(id)?.ok_or_else(|| {
            RegistryError::Store(proofpass_store::StoreError::Corruption(format!(
                "pending index points at missing verification request {}",
                id
            )))
        })?;

        let now = self.clock.now();
        let (status, action) = match rejection {
            None => (RequestStatus::Approved, ActionKind::Approve),
            Some(_) => (RequestStatus::Rejected, ActionKind::Reject),
        };
        request.status = status;
        request.rejection_reason = rejection.map(str::to_string);
        request.resolved_by = Some(approver);
        request.resolved_at = Some(now);

        let mut batch = WriteBatch::new();
        batch.put_verification_request(request.clone());
        batch.append_activity(NewActivity {
            actor: approver,
            target: requester,
            scope: ActionScope::Verification,
            action,
            certificate_id: Some(certificate_id),
            details: rejection.unwrap_or_default().to_string(),
            timestamp: now,
        });
        self.ledger.commit(batch)?;

        tracing::info!(
            request = %id,
            certificate = %certificate_id,
            requester = %requester,
            status = %status,
            "verification request resolved"
        );
        Ok(request)
    }

    // ── Issuer requests ─────────────────────────────────────────────────

    pub fn submit_issuer_request(
        &self,
        requester: Address,
        reason: &str,
    ) -> Result<RequestId, RegistryError> {
        self.mutate("submit_issuer_request", || {
            self.check_text("reason", reason)?;
            self.require(&requester, Role::Requester)?;
            if requester.is_zero() {
                return Err(RegistryError::InvalidInput(
                    "the zero address cannot become an issuer".into(),
                ));
            }

            if let Some(latest) = self.ledger.get_latest_issuer_request(&requester)? {
                if latest.is_pending() {
                    return Err(RegistryError::DuplicatePendingRequest(format!(
                        "{} already has issuer request {} open",
                        requester, latest.id
                    )));
                }
            }

            let now = self.clock.now();
            let id = RequestId::new(self.ledger.issuer_request_count()? + 1);
            let mut batch = WriteBatch::new();
            batch.put_issuer_request(IssuerRequest {
                id,
                requester,
                reason: reason.to_string(),
                submitted_at: now,
                status: RequestStatus::Pending,
                rejection_reason: None,
                resolved_at: None,
            });
            batch.append_activity(NewActivity {
                actor: requester,
                target: self.config.owner,
                scope: ActionScope::IssuerAuthorization,
                action: ActionKind::Request,
                certificate_id: None,
                details: reason.to_string(),
                timestamp: now,
            });
            self.ledger.commit(batch)?;

            tracing::info!(request = %id, requester = %requester, "issuer request submitted");
            Ok(id)
        })
    }

    /// Approve `requester`'s pending issuer request and add it to the
    /// authorized-issuer set. Owner only.
    pub fn approve_issuer_request(
        &self,
        caller: Address,
        requester: Address,
    ) -> Result<IssuerRequest, RegistryError> {
        self.mutate("approve_issuer_request", || {
            self.resolve_issuer_request(caller, requester, None)
        })
    }

    pub fn reject_issuer_request(
        &self,
        caller: Address,
        requester: Address,
        rejection_reason: &str,
    ) -> Result<IssuerRequest, RegistryError> {
        self.mutate("reject_issuer_request", || {
            self.check_text("rejection reason", rejection_reason)?;
            self.resolve_issuer_request(caller, requester, Some(rejection_reason))
        })
    }

    fn resolve_issuer_request(
        &self,
        caller: Address,
        requester: Address,
        rejection: Option<&str>,
    ) -> Result<IssuerRequest, RegistryError> {
        self.require(&caller, Role::Owner)?;

        let mut request = self
            .ledger
            .get_latest_issuer_request(&requester)?
            .ok_or_else(|| RegistryError::NotFound(format!("issuer request from {}", requester)))?;
        if !request.is_pending() {
            return Err(RegistryError::AlreadyResolved(format!(
                "issuer request {} is {}",
                request.id, request.status
            )));
        }

        let now = self.clock.now();
        let action = match rejection {
            None => ActionKind::Approve,
            Some(_) => ActionKind::Reject,
        };
        request.status = match rejection {
            None => RequestStatus::Approved,
            Some(_) => RequestStatus::Rejected,
        };
        request.rejection_reason = rejection.map(str::to_string);
        request.resolved_at = Some(now);

        let mut batch = WriteBatch::new();
        batch.put_issuer_request(request.clone());
        if rejection.is_none() {
            batch.set_issuer(requester, true);
        }
        batch.append_activity(NewActivity {
            actor: caller,
            target: requester,
            scope: ActionScope::IssuerAuthorization,
            action,
            certificate_id: None,
            details: rejection.unwrap_or_default().to_string(),
            timestamp: now,
        });
        self.ledger.commit(batch)?;

        tracing::info!(
            request = %request.id,
            requester = %requester,
            status = %request.status,
            "issuer request resolved"
        );
        Ok(request)
    }

    // ── Authorized-issuer set ───────────────────────────────────────────

    /// Add `address` to the authorized-issuer set. Re-authorizing succeeds
    /// and still logs one entry.
    pub fn authorize_issuer(&self, caller: Address, address: Address) -> Result<(), RegistryError> {
        self.mutate("authorize_issuer", || self.toggle_issuer(caller, address, true))
    }

    /// Remove `address` from the authorized-issuer set. Revoking an address
    /// that is not authorized succeeds and still logs one entry.
    pub fn revoke_issuer(&self, caller: Address, address: Address) -> Result<(), RegistryError> {
        self.mutate("revoke_issuer", || self.toggle_issuer(caller, address, false))
    }

    fn toggle_issuer(
        &self,
        caller: Address,
        address: Address,
        authorize: bool,
    ) -> Result<(), RegistryError> {
        self.require(&caller, Role::Owner)?;
        if address.is_zero() {
            return Err(RegistryError::InvalidInput(
                "issuer must not be the zero address".into(),
            ));
        }

        let currently = self.ledger.is_authorized_issuer(&address)?;
        let changed = currently != authorize;
        let (action, details) = match (authorize, changed) {
            (true, true) => (ActionKind::Authorize, ""),
            (true, false) => (ActionKind::Authorize, "already authorized"),
            (false, true) => (ActionKind::Revoke, ""),
            (false, false) => (ActionKind::Revoke, "not authorized"),
        };

        let mut batch = WriteBatch::new();
        if changed {
            batch.set_issuer(address, authorize);
        }
        batch.append_activity(NewActivity {
            actor: caller,
            target: address,
            scope: ActionScope::IssuerAuthorization,
            action,
            certificate_id: None,
            details: details.to_string(),
            timestamp: self.clock.now(),
        });
        self.ledger.commit(batch)?;

        tracing::info!(issuer = %address, action = %action, changed, "issuer set updated");
        Ok(())
    }

    // ── Certificates and endorsements ───────────────────────────────────

    /// Mint a soulbound certificate to `recipient`. The caller must be an
    /// authorized issuer and is recorded as the certificate's issuer.
    pub fn issue_certificate(
        &self,
        issuer: Address,
        recipient: Address,
        metadata_uri: &str,
    ) -> Result<CertificateId, RegistryError> {
        self.mutate("issue_certificate", || {
            self.require(&issuer, Role::AuthorizedIssuer)?;
            if recipient.is_zero() {
                return Err(RegistryError::InvalidInput(
                    "recipient must not be the zero address".into(),
                ));
            }
            self.check_text("metadata uri", metadata_uri)?;

            let now = self.clock.now();
            let id = CertificateId::new(self.ledger.certificate_count()? + 1);
            let mut batch = WriteBatch::new();
            batch.put_certificate(Certificate {
                id,
                owner: recipient,
                issuer,
                metadata_uri: metadata_uri.to_string(),
                issued_at: now,
            });
            batch.append_activity(NewActivity {
                actor: issuer,
                target: recipient,
                scope: ActionScope::Certificate,
                action: ActionKind::Issue,
                certificate_id: Some(id),
                details: metadata_uri.to_string(),
                timestamp: now,
            });
            self.ledger.commit(batch)?;

            tracing::info!(certificate = %id, issuer = %issuer, recipient = %recipient, "certificate issued");
            Ok(id)
        })
    }

    /// Record a skill endorsement. Only registered employers may endorse.
    pub fn add_endorsement(
        &self,
        endorser: Address,
        user: Address,
        skill: &str,
        comment: &str,
    ) -> Result<(), RegistryError> {
        self.mutate("add_endorsement", || {
            self.check_text("skill", skill)?;
            if comment.chars().count() > self.config.max_text_len {
                return Err(RegistryError::InvalidInput(format!(
                    "comment exceeds {} characters",
                    self.config.max_text_len
                )));
            }
            if endorser.is_zero() {
                return Err(RegistryError::InvalidInput(
                    "endorser must not be the zero address".into(),
                ));
            }
            if user.is_zero() {
                return Err(RegistryError::InvalidInput(
                    "cannot endorse the zero address".into(),
                ));
            }
            self.require(&endorser, Role::Employer)?;
            if endorser == user {
                return Err(RegistryError::InvalidInput(
                    "an address cannot endorse itself".into(),
                ));
            }

            let now = self.clock.now();
            let mut batch = WriteBatch::new();
            batch.put_endorsement(Endorsement {
                endorser,
                user,
                skill: skill.to_string(),
                comment: comment.to_string(),
                timestamp: now,
            });
            batch.append_activity(NewActivity {
                actor: endorser,
                target: user,
                scope: ActionScope::Endorsement,
                action: ActionKind::Endorse,
                certificate_id: None,
                details: skill.to_string(),
                timestamp: now,
            });
            self.ledger.commit(batch)?;

            tracing::info!(endorser = %endorser, user = %user, skill, "endorsement added");
            Ok(())
        })
    }

    // ── Employers ───────────────────────────────────────────────────────

    /// Register `caller` as an employer. Each address registers once.
    pub fn register_employer(
        &self,
        caller: Address,
        name: &str,
        description: &str,
        website: &str,
    ) -> Result<Employer, RegistryError> {
        self.mutate("register_employer", || {
            self.check_text("name", name)?;
            self.check_text("description", description)?;
            self.check_text("website", website)?;
            if caller.is_zero() {
                return Err(RegistryError::InvalidInput(
                    "the zero address cannot register as an employer".into(),
                ));
            }
            if self.ledger.get_employer(&caller)?.is_some() {
                return Err(RegistryError::InvalidInput(format!(
                    "{} is already registered as an employer",
                    caller
                )));
            }

            let now = self.clock.now();
            let employer = Employer {
                address: caller,
                name: name.to_string(),
                description: description.to_string(),
                website: website.to_string(),
                verified: false,
                registered_at: now,
            };
            let mut batch = WriteBatch::new();
            batch.put_employer(employer.clone());
            batch.append_activity(NewActivity {
                actor: caller,
                target: caller,
                scope: ActionScope::Employer,
                action: ActionKind::Register,
                certificate_id: None,
                details: name.to_string(),
                timestamp: now,
            });
            self.ledger.commit(batch)?;

            tracing::info!(employer = %caller, name, "employer registered");
            Ok(employer)
        })
    }

    /// Mark a registered employer as verified. Owner only.
    pub fn verify_employer(
        &self,
        caller: Address,
        address: Address,
    ) -> Result<Employer, RegistryError> {
        self.mutate("verify_employer", || {
            self.require(&caller, Role::Owner)?;
            let mut employer = self
                .ledger
                .get_employer(&address)?
                .ok_or_else(|| RegistryError::NotFound(format!("employer {}", address)))?;
            if employer.verified {
                return Err(RegistryError::AlreadyResolved(format!(
                    "employer {} is already verified",
                    address
                )));
            }
            employer.verified = true;

            let mut batch = WriteBatch::new();
            batch.put_employer(employer.clone());
            batch.append_activity(NewActivity {
                actor: caller,
                target: address,
                scope: ActionScope::Employer,
                action: ActionKind::Verify,
                certificate_id: None,
                details: employer.name.clone(),
                timestamp: self.clock.now(),
            });
            self.ledger.commit(batch)?;

            tracing::info!(employer = %address, "employer verified");
            Ok(employer)
        })
    }

    // ── Projections ─────────────────────────────────────────────────────

    pub fn is_authorized_issuer(&self, address: &Address) -> Result<bool, RegistryError> {
        Ok(self.ledger.is_authorized_issuer(address)?)
    }

    /// Every address that was ever authorized, with its current flag.
    pub fn issuers(&self) -> Result<Vec<IssuerStatus>, RegistryError> {
        Ok(self
            .ledger
            .get_issuers()?
            .into_iter()
            .map(|(address, authorized)| IssuerStatus {
                address,
                authorized,
            })
            .collect())
    }

    /// Addresses with a pending issuer request, in submission order.
    pub fn pending_requesters(&self) -> Result<Vec<Address>, RegistryError> {
        Ok(self
            .ledger
            .get_pending_issuer_requests()?
            .into_iter()
            .map(|r| r.requester)
            .collect())
    }

    /// The most recent issuer request from `address`, if any.
    pub fn issuer_request(&self, address: &Address) -> Result<Option<IssuerRequest>, RegistryError> {
        Ok(self.ledger.get_latest_issuer_request(address)?)
    }

    /// Every verification request on a certificate, in submission order.
    /// Empty for an unknown certificate.
    pub fn certificate_verification_requests(
        &self,
        certificate_id: CertificateId,
    ) -> Result<Vec<VerificationRequest>, RegistryError> {
        Ok(self.ledger.get_verification_requests_for(certificate_id)?)
    }

    pub fn total_supply(&self) -> Result<u64, RegistryError> {
        Ok(self.ledger.certificate_count()?)
    }

    pub fn certificate(&self, id: CertificateId) -> Result<Certificate, RegistryError> {
        self.ledger
            .get_certificate(id)?
            .ok_or_else(|| RegistryError::NotFound(format!("certificate {}", id)))
    }

    /// Certificates held by `owner`, lowest id first.
    pub fn certificates_of(&self, owner: &Address) -> Result<Vec<Certificate>, RegistryError> {
        let ids = self.ledger.get_certificates_of(owner)?;
        let mut certificates = Vec::with_capacity(ids.len());
        for id in ids {
            certificates.push(self.certificate(id)?);
        }
        Ok(certificates)
    }

    pub fn is_employer(&self, address: &Address) -> Result<bool, RegistryError> {
        Ok(self.ledger.get_employer(address)?.is_some())
    }

    /// The employer profile registered by `address`, if any.
    pub fn employer(&self, address: &Address) -> Result<Option<Employer>, RegistryError> {
        Ok(self.ledger.get_employer(address)?)
    }

    pub fn employers(&self) -> Result<Vec<Employer>, RegistryError> {
        Ok(self.ledger.get_employers()?)
    }

    pub fn user_endorsements(&self, user: &Address) -> Result<Vec<Endorsement>, RegistryError> {
        Ok(self.ledger.get_endorsements_for(user)?)
    }

    // ── Activity log ────────────────────────────────────────────────────

    pub fn activity_log_length(&self) -> Result<u64, RegistryError> {
        Ok(self.ledger.activity_len()?)
    }

    /// A page of the activity log in insertion order. `limit` is clamped
    /// to the configured maximum page size; an offset past the end gives an
    /// empty page.
    pub fn activity_logs(
        &self,
        offset: u64,
        limit: usize,
    ) -> Result<Vec<ActivityLogEntry>, RegistryError> {
        let limit = limit.min(self.config.max_page_size);
        Ok(self.ledger.get_activity_range(offset, limit)?)
    }

    /// Like [`activity_logs`](Self::activity_logs), restricted to entries
    /// where `address` is the actor or the target. `offset` counts matching
    /// entries.
    pub fn activity_logs_for(
        &self,
        address: &Address,
        offset: u64,
        limit: usize,
    ) -> Result<Vec<ActivityLogEntry>, RegistryError> {
        let limit = limit.min(self.config.max_page_size);
        Ok(self.ledger.get_activity_for(address, offset, limit)?)
    }

    /// Walk the whole log lazily, `page_size` entries at a time.
    pub fn activity_pages(&self, page_size: usize) -> ActivityPages {
        ActivityPages::new(
            Arc::clone(&self.ledger),
            page_size.min(self.config.max_page_size),
        )
    }

    // ── Internals ───────────────────────────────────────────────────────

    /// Run one mutation under the write lock and record its outcome.
    fn mutate<T>(
        &self,
        action: &'static str,
        op: impl FnOnce() -> Result<T, RegistryError>,
    ) -> Result<T, RegistryError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let result = op();
        match &result {
            Ok(_) => {
                if let Some(metrics) = &self.metrics {
                    metrics.record_accepted(action);
                    if let Ok(len) = self.ledger.activity_len() {
                        metrics.activity_log_length.set(len as i64);
                    }
                }
            }
            Err(e) => {
                tracing::debug!(action, kind = e.kind(), error = %e, "mutation refused");
                if let Some(metrics) = &self.metrics {
                    metrics.record_rejected(action, e.kind());
                }
            }
        }
        result
    }

    fn check_text(&self, field: &str, value: &str) -> Result<(), RegistryError> {
        if value.trim().is_empty() {
            return Err(RegistryError::InvalidInput(format!(
                "{} must not be empty",
                field
            )));
        }
        if value.chars().count() > self.config.max_text_len {
            return Err(RegistryError::InvalidInput(format!(
                "{} exceeds {} characters",
                field, self.config.max_text_len
            )));
        }
        Ok(())
    }
}
