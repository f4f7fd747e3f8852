use std::collections::HashMap;

use async_trait::async_trait;
use orbita_application::{SessionQuery, TimeSheetRepository};
use orbita_core::{AppError, AppResult};
use orbita_domain::{TimeSheetSession, TimeSheetSessionId, UserId};
use tokio::sync::RwLock;


/// In-memory time-sheet repository implementation.
#[derive(Debug, Default)]
pub struct InMemoryTimeSheetRepository {
    sessions: RwLock<HashMap<TimeSheetSessionId, TimeSheetSession>>,
}

impl InMemoryTimeSheetRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TimeSheetRepository for InMemoryTimeSheetRepository {
    async fn find_session(
        &self,
        session_id: TimeSheetSessionId,
    ) -> AppResult<Option<TimeSheetSession>> {
        Ok(self.sessions.read().await.get(&session_id).cloned())
    }

    async fn find_open_session(
        &self,
        owner_user_id: UserId,
    ) -> AppResult<Option<TimeSheetSession>> {
        Ok(self
            .sessions
            .read()
            .await
            .values()
            .find(|session| session.owner_user_id == owner_user_id && session.is_open())
            .cloned())
    }

    async fn create_session(&self, session: TimeSheetSession) -> AppResult<()> {
        let mut sessions = self.sessions.write().await;

        if sessions.contains_key(&session.id) {
            return Err(AppError::Conflict(format!(
                "time-sheet session '{}' already exists",
                session.id
            )));
        }

        if session.is_open()
            && sessions
                .values()
                .any(|stored| stored.owner_user_id == session.owner_user_id && stored.is_open())
        {
            return Err(AppError::Conflict(
                "an open time-sheet session already exists".to_owned(),
            ));
        }

        sessions.insert(session.id, session);
        Ok(())
    }

    async fn save_session(&self, session: TimeSheetSession) -> AppResult<()> {
        let mut sessions = self.sessions.write().await;
        let Some(stored) = sessions.get_mut(&session.id) else {
            return Err(AppError::NotFound(format!(
                "time-sheet session '{}'",
                session.id
            )));
        };

        *stored = session;
        Ok(())
    }

    async fn list_sessions(&self, query: SessionQuery) -> AppResult<Vec<TimeSheetSession>> {
        let sessions = self.sessions.read().await;

        let mut values: Vec<TimeSheetSession> = sessions
            .values()
            .filter(|session| session.tenant_id == query.tenant_id)
            .filter(|session| {
                query
                    .owner_user_id
                    .is_none_or(|owner| owner == session.owner_user_id)
            })
            .filter(|session| query.started_from.is_none_or(|from| session.start >= from))
            .filter(|session| {
                query
                    .started_before
                    .is_none_or(|before| session.start < before)
            })
            .cloned()
            .collect();
        values.sort_by(|left, right| right.start.cmp(&left.start));
        values.truncate(query.limit);

        Ok(values)
    }
}
