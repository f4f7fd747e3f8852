use async_trait::async_trait;
use chrono::{DateTime, Utc};
use orbita_core::{AppResult, TenantId};
use orbita_domain::{TimeSheetSession, TimeSheetSessionId, UserId};

/// Filter for listing sessions of one company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionQuery {
    /// Company whose sessions are listed.
    pub tenant_id: TenantId,
    /// Restricts the list to one collaborator.
    pub owner_user_id: Option<UserId>,
    /// Inclusive lower bound on clock-in.
    pub started_from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on clock-in.
    pub started_before: Option<DateTime<Utc>>,
    /// Maximum number of sessions returned, newest first.
    pub limit: usize,
}

/// Repository port for time-sheet sessions.
#[async_trait]
pub trait TimeSheetRepository: Send + Sync {
    /// Finds a session by id.
    async fn find_session(
        &self,
        session_id: TimeSheetSessionId,
    ) -> AppResult<Option<TimeSheetSession>>;

    /// Finds the open session of a collaborator.
    async fn find_open_session(&self, owner_user_id: UserId)
    -> AppResult<Option<TimeSheetSession>>;

    /// Persists a new session. Fails with a conflict when the owner already
    /// has an open one.
    async fn create_session(&self, session: TimeSheetSession) -> AppResult<()>;

    /// Replaces a stored session.
    async fn save_session(&self, session: TimeSheetSession) -> AppResult<()>;

    /// Lists sessions matching the query, newest first.
    async fn list_sessions(&self, query: SessionQuery) -> AppResult<Vec<TimeSheetSession>>;
}
