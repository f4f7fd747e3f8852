use std::sync::Arc;

use chrono::{DateTime, Utc};
use orbita_core::{AppError, AppResult, TenantId};
use orbita_domain::{
    Action, AuditAction, AuditSeverity, GeoPoint, Principal, Resource, ResourceKind,
    SessionStatus, TimeSheetConfig, TimeSheetSession, TimeSheetSessionId, UserId,
};

use crate::audit_ports::append_best_effort;
use crate::{
    AuditEvent, AuditRepository, AuthorizationService, DenyReason, PolicyEngine,
    ProfileRepository, SessionQuery, TimeSheetRepository,
};


/// Default page size for session lists.
pub const DEFAULT_SESSION_LIST_LIMIT: usize = 100;
/// Largest page a caller may request.
pub const MAX_SESSION_LIST_LIMIT: usize = 500;

/// Caller-side filter for [`TimeSheetService::list_sessions`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionFilter {
    /// Company to list; defaults to the principal's own.
    pub tenant_id: Option<TenantId>,
    /// Collaborator to list; elevated callers get the whole company when absent.
    pub owner_user_id: Option<UserId>,
    /// Inclusive lower bound on clock-in.
    pub started_from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on clock-in.
    pub started_before: Option<DateTime<Utc>>,
    /// Page size; defaults to [`DEFAULT_SESSION_LIST_LIMIT`].
    pub limit: Option<usize>,
}

/// Clock-in/clock-out flow of the time-tracking module.
#[derive(Clone)]
pub struct TimeSheetService {
    repository: Arc<dyn TimeSheetRepository>,
    profile_repository: Arc<dyn ProfileRepository>,
    authorization: AuthorizationService,
    audit_repository: Arc<dyn AuditRepository>,
}

impl TimeSheetService {
    /// Creates a new time-sheet service.
    #[must_use]
    pub fn new(
        repository: Arc<dyn TimeSheetRepository>,
        profile_repository: Arc<dyn ProfileRepository>,
        authorization: AuthorizationService,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            repository,
            profile_repository,
            authorization,
            audit_repository,
        }
    }

    /// Clocks the principal in.
    pub async fn start_session(
        &self,
        principal: &Principal,
        location: Option<GeoPoint>,
    ) -> AppResult<TimeSheetSession> {
        self.start_session_at(principal, location, Utc::now()).await
    }

    /// Clocks the principal in at `now`.
    pub async fn start_session_at(
        &self,
        principal: &Principal,
        location: Option<GeoPoint>,
        now: DateTime<Utc>,
    ) -> AppResult<TimeSheetSession> {
        let tenant_id = principal.tenant_id().ok_or_else(|| {
            AppError::Validation("a company membership is required to record time".to_owned())
        })?;

        let session = TimeSheetSession::open(tenant_id, principal.user_id(), now, location);
        self.authorization
            .authorize_at(
                principal,
                Action::Create,
                &session.as_resource(),
                &session.id.to_string(),
                now,
            )
            .await?;

        if self
            .repository
            .find_open_session(principal.user_id())
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "an open time-sheet session already exists".to_owned(),
            ));
        }

        self.repository.create_session(session.clone()).await?;

        tracing::info!(
            session_id = %session.id,
            user_id = %session.owner_user_id,
            tenant_id = %session.tenant_id,
            "time-sheet session started"
        );

        Ok(session)
    }

    /// Clocks the owner out and stores the computed duration and earnings.
    pub async fn close_session(
        &self,
        principal: &Principal,
        session_id: TimeSheetSessionId,
        location: Option<GeoPoint>,
    ) -> AppResult<TimeSheetSession> {
        self.close_session_at(principal, session_id, location, Utc::now())
            .await
    }

    /// Clocks the owner out at `now`.
    pub async fn close_session_at(
        &self,
        principal: &Principal,
        session_id: TimeSheetSessionId,
        location: Option<GeoPoint>,
        now: DateTime<Utc>,
    ) -> AppResult<TimeSheetSession> {
        let mut session = self.load_session(session_id).await?;

        // The clock-out is a new punch on the owner's record.
        self.authorization
            .authorize_at(
                principal,
                Action::Create,
                &session.as_resource(),
                &session_id.to_string(),
                now,
            )
            .await?;

        let config = self.owner_config(session.owner_user_id).await?;
        let computation = session.close(now, location, &config)?;
        self.repository.save_session(session.clone()).await?;

        tracing::info!(
            session_id = %session.id,
            user_id = %session.owner_user_id,
            adjusted_duration_sec = computation.adjusted_duration_sec,
            earnings = %computation.earnings,
            "time-sheet session closed"
        );

        self.append_session_event(
            principal,
            &session,
            AuditAction::TimeEntryClosed,
            AuditSeverity::Low,
            format!(
                "closed with {}s billable, earnings {}",
                computation.adjusted_duration_sec, computation.earnings
            ),
        )
        .await;

        Ok(session)
    }

    /// Approves or rejects a closed pending session.
    pub async fn review_session(
        &self,
        principal: &Principal,
        session_id: TimeSheetSessionId,
        status: SessionStatus,
    ) -> AppResult<TimeSheetSession> {
        self.review_session_at(principal, session_id, status, Utc::now())
            .await
    }

    /// Approves or rejects a closed pending session as of `now`.
    pub async fn review_session_at(
        &self,
        principal: &Principal,
        session_id: TimeSheetSessionId,
        status: SessionStatus,
        now: DateTime<Utc>,
    ) -> AppResult<TimeSheetSession> {
        let mut session = self.load_session(session_id).await?;
        let resource = session.as_resource();
        let resource_id = session_id.to_string();

        // Reviewing only changes the status, never the recorded punches.
        self.authorization
            .authorize_at(principal, Action::Get, &resource, &resource_id, now)
            .await?;
        // Nobody reviews their own punches, whatever their role.
        if !PolicyEngine::has_elevated_role(principal)
            || principal.user_id() == session.owner_user_id
        {
            return Err(self
                .authorization
                .deny(
                    principal,
                    Action::Update,
                    &resource,
                    &resource_id,
                    DenyReason::InsufficientRole,
                )
                .await);
        }

        session.review(status)?;
        self.repository.save_session(session.clone()).await?;

        let action = match status {
            SessionStatus::Approved => AuditAction::TimeEntryApproved,
            SessionStatus::Pending | SessionStatus::Rejected => AuditAction::TimeEntryRejected,
        };
        self.append_session_event(
            principal,
            &session,
            action,
            AuditSeverity::Medium,
            format!("status set to '{}'", status.as_str()),
        )
        .await;

        Ok(session)
    }

    /// Replaces the recorded interval of a closed session.
    pub async fn correct_session(
        &self,
        principal: &Principal,
        session_id: TimeSheetSessionId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<TimeSheetSession> {
        self.correct_session_at(principal, session_id, start, end, Utc::now())
            .await
    }

    /// Replaces the recorded interval of a closed session as of `now`.
    pub async fn correct_session_at(
        &self,
        principal: &Principal,
        session_id: TimeSheetSessionId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> AppResult<TimeSheetSession> {
        let mut session = self.load_session(session_id).await?;
        let resource = session.as_resource();
        let resource_id = session_id.to_string();

        let decision = self
            .authorization
            .authorize_at(principal, Action::Update, &resource, &resource_id, now)
            .await?;

        if session.status != SessionStatus::Pending && !PolicyEngine::has_elevated_role(principal)
        {
            return Err(self
                .authorization
                .deny(
                    principal,
                    Action::Update,
                    &resource,
                    &resource_id,
                    DenyReason::InsufficientRole,
                )
                .await);
        }

        if session.is_open() {
            return Err(AppError::Conflict(format!(
                "time-sheet session '{session_id}' must be closed before it is corrected"
            )));
        }

        let previous = (session.start, session.end);
        let config = self.owner_config(session.owner_user_id).await?;
        let computation = session.correct(start, end, now, &config)?;
        self.repository.save_session(session.clone()).await?;

        if decision.audit_reason().is_some() || principal.user_id() != session.owner_user_id {
            let previous_end = previous
                .1
                .map(|value| value.to_rfc3339())
                .unwrap_or_default();
            self.append_session_event(
                principal,
                &session,
                AuditAction::TimeEntryCorrected,
                AuditSeverity::Medium,
                format!(
                    "interval {}..{} replaced by {}..{} ({}s billable)",
                    previous.0.to_rfc3339(),
                    previous_end,
                    start.to_rfc3339(),
                    end.to_rfc3339(),
                    computation.adjusted_duration_sec
                ),
            )
            .await;
        }

        Ok(session)
    }

    /// Lists the principal's own sessions, one colleague's, or a company
    /// report for elevated roles.
    pub async fn list_sessions(
        &self,
        principal: &Principal,
        filter: SessionFilter,
    ) -> AppResult<Vec<TimeSheetSession>> {
        let tenant_id = filter
            .tenant_id
            .or(principal.tenant_id())
            .ok_or_else(|| {
                AppError::Validation("a company is required to list sessions".to_owned())
            })?;

        let owner_user_id = filter.owner_user_id.or_else(|| {
            (!PolicyEngine::has_elevated_role(principal)).then_some(principal.user_id())
        });

        match owner_user_id {
            Some(owner_user_id) => {
                let resource =
                    Resource::personal(ResourceKind::TimeEntry, owner_user_id, Some(tenant_id));
                self.authorization
                    .authorize(
                        principal,
                        Action::List,
                        &resource,
                        &format!("owner:{owner_user_id}"),
                    )
                    .await?;
            }
            None => {
                self.authorization
                    .authorize_report(principal, ResourceKind::TimeEntry, tenant_id)
                    .await?;
            }
        }

        self.repository
            .list_sessions(SessionQuery {
                tenant_id,
                owner_user_id,
                started_from: filter.started_from,
                started_before: filter.started_before,
                limit: filter
                    .limit
                    .unwrap_or(DEFAULT_SESSION_LIST_LIMIT)
                    .clamp(1, MAX_SESSION_LIST_LIMIT),
            })
            .await
    }

    async fn load_session(&self, session_id: TimeSheetSessionId) -> AppResult<TimeSheetSession> {
        self.repository
            .find_session(session_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("time-sheet session '{session_id}'")))
    }

    async fn owner_config(&self, owner_user_id: UserId) -> AppResult<TimeSheetConfig> {
        Ok(self
            .profile_repository
            .find_profile(owner_user_id)
            .await?
            .map(|profile| profile.time_sheet)
            .unwrap_or_default())
    }

    async fn append_session_event(
        &self,
        principal: &Principal,
        session: &TimeSheetSession,
        action: AuditAction,
        severity: AuditSeverity,
        detail: String,
    ) {
        append_best_effort(
            self.audit_repository.as_ref(),
            AuditEvent {
                tenant_id: Some(session.tenant_id),
                subject: principal.user_id().to_string(),
                action,
                severity,
                resource_type: ResourceKind::TimeEntry.as_str().to_owned(),
                resource_id: session.id.to_string(),
                detail: Some(detail),
            },
        )
        .await;
    }
}
