use std::sync::Arc;

use chrono::{DateTime, Utc};
use orbita_core::{AppError, AppResult, TenantId};
use orbita_domain::{Action, AuditAction, Principal, Resource, ResourceKind};

use crate::audit_ports::append_best_effort;
use crate::{AuditEvent, AuditRepository, DenyReason, PolicyDecision, PolicyEngine};


/// Message returned for every denial; details stay in logs and audit.
pub const ACCESS_DENIED_MESSAGE: &str = "access denied";

/// Authoritative enforcement point in front of every repository call.
#[derive(Clone)]
pub struct AuthorizationService {
    engine: PolicyEngine,
    audit_repository: Arc<dyn AuditRepository>,
}

impl AuthorizationService {
    /// Creates a new authorization service from a policy and an audit sink.
    #[must_use]
    pub fn new(engine: PolicyEngine, audit_repository: Arc<dyn AuditRepository>) -> Self {
        Self {
            engine,
            audit_repository,
        }
    }

    /// Returns the policy evaluated by this service.
    #[must_use]
    pub fn engine(&self) -> &PolicyEngine {
        &self.engine
    }

    /// Ensures the principal may perform the action on the resource.
    ///
    /// Returns the allowing decision so callers can audit flagged edits.
    pub async fn authorize(
        &self,
        principal: &Principal,
        action: Action,
        resource: &Resource,
        resource_id: &str,
    ) -> AppResult<PolicyDecision> {
        self.authorize_at(principal, action, resource, resource_id, Utc::now())
            .await
    }

    /// Same as [`Self::authorize`] as of `now`.
    pub async fn authorize_at(
        &self,
        principal: &Principal,
        action: Action,
        resource: &Resource,
        resource_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<PolicyDecision> {
        resource.validate()?;

        let decision = self.engine.evaluate_at(principal, action, resource, now);
        match decision {
            PolicyDecision::Deny(reason) => {
                self.record_denial(principal, action, resource.kind(), resource_id, reason)
                    .await;
                Err(denial_error(reason))
            }
            PolicyDecision::Allow | PolicyDecision::AllowAudited(_) => Ok(decision),
        }
    }

    /// Ensures the principal may list every record of `kind` in a company.
    pub async fn authorize_report(
        &self,
        principal: &Principal,
        kind: ResourceKind,
        tenant_id: TenantId,
    ) -> AppResult<()> {
        match self.engine.evaluate_report(principal, kind, tenant_id) {
            PolicyDecision::Deny(reason) => {
                self.record_denial(
                    principal,
                    Action::List,
                    kind,
                    &format!("report:{tenant_id}"),
                    reason,
                )
                .await;
                Err(denial_error(reason))
            }
            PolicyDecision::Allow | PolicyDecision::AllowAudited(_) => Ok(()),
        }
    }

    /// Logs and audits a denial decided outside the policy, e.g. a role
    /// requirement specific to one use-case.
    pub async fn deny(
        &self,
        principal: &Principal,
        action: Action,
        resource: &Resource,
        resource_id: &str,
        reason: DenyReason,
    ) -> AppError {
        self.record_denial(principal, action, resource.kind(), resource_id, reason)
            .await;
        denial_error(reason)
    }

    async fn record_denial(
        &self,
        principal: &Principal,
        action: Action,
        kind: ResourceKind,
        resource_id: &str,
        reason: DenyReason,
    ) {
        let severity = kind.denial_severity(action);

        tracing::warn!(
            user_id = %principal.user_id(),
            role = principal.role().as_str(),
            action = action.as_str(),
            resource_kind = kind.as_str(),
            resource_id,
            reason = reason.as_str(),
            severity = severity.as_str(),
            "access denied"
        );

        let audit_action = if reason == DenyReason::TenantMismatch {
            AuditAction::TenantAccessDenied
        } else {
            AuditAction::AccessDenied
        };

        append_best_effort(
            self.audit_repository.as_ref(),
            AuditEvent {
                tenant_id: principal.tenant_id(),
                subject: principal.user_id().to_string(),
                action: audit_action,
                severity,
                resource_type: kind.as_str().to_owned(),
                resource_id: resource_id.to_owned(),
                detail: Some(format!(
                    "denied '{}' ({})",
                    action.as_str(),
                    reason.as_str()
                )),
            },
        )
        .await;
    }
}

fn denial_error(reason: DenyReason) -> AppError {
    match reason {
        DenyReason::TenantMismatch => AppError::TenantMismatch(ACCESS_DENIED_MESSAGE.to_owned()),
        _ => AppError::Forbidden(ACCESS_DENIED_MESSAGE.to_owned()),
    }
}
