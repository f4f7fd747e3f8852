use async_trait::async_trait;
use orbita_core::{AppResult, TenantId};
use orbita_domain::{AuditAction, AuditSeverity};

/// Immutable audit event payload emitted by application services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Company scope for the event; absent for principals without one.
    pub tenant_id: Option<TenantId>,
    /// User that performed the action.
    pub subject: String,
    /// Stable audit action identifier.
    pub action: AuditAction,
    /// Sensitivity of the event.
    pub severity: AuditSeverity,
    /// Resource type label.
    pub resource_type: String,
    /// Resource identifier.
    pub resource_id: String,
    /// Optional audit detail payload.
    pub detail: Option<String>,
}

/// Port for persisting append-only audit events.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Persists one audit event.
    async fn append_event(&self, event: AuditEvent) -> AppResult<()>;
}

/// Appends an audit event without letting a failure escape.
///
/// The audit trail is a separate write from the operation it describes; a
/// failed append is logged and the primary write stands.
pub(crate) async fn append_best_effort(repository: &dyn AuditRepository, event: AuditEvent) {
    let action = event.action;
    if let Err(error) = repository.append_event(event).await {
        tracing::warn!(
            audit_action = action.as_str(),
            error = %error,
            "failed to append audit event"
        );
    }
}
