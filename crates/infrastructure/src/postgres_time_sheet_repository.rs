//! PostgreSQL-backed time-sheet session repository.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use orbita_application::{SessionQuery, TimeSheetRepository};
use orbita_core::{AppError, AppResult, TenantId};
use orbita_domain::{GeoPoint, SessionStatus, TimeSheetSession, TimeSheetSessionId, UserId};

use crate::postgres_error::{is_unique_violation, map_database_error};

#[cfg(test)]
mod tests;

const SESSION_COLUMNS: &str = r#"
    id,
    tenant_id,
    owner_user_id,
    start_at,
    end_at,
    duration_sec,
    earnings,
    status,
    start_latitude,
    start_longitude,
    end_latitude,
    end_longitude,
    created_at
"#;

/// PostgreSQL implementation of the time-sheet repository port.
#[derive(Clone)]
pub struct PostgresTimeSheetRepository {
    pool: PgPool,
}

impl PostgresTimeSheetRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    id: uuid::Uuid,
    tenant_id: uuid::Uuid,
    owner_user_id: uuid::Uuid,
    start_at: DateTime<Utc>,
    end_at: Option<DateTime<Utc>>,
    duration_sec: Option<i64>,
    earnings: Option<Decimal>,
    status: String,
    start_latitude: Option<f64>,
    start_longitude: Option<f64>,
    end_latitude: Option<f64>,
    end_longitude: Option<f64>,
    created_at: DateTime<Utc>,
}

impl TryFrom<SessionRow> for TimeSheetSession {
    type Error = AppError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        let status = SessionStatus::from_str(row.status.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "invalid stored status for session '{}': {error}",
                row.id
            ))
        })?;

        Ok(Self {
            id: TimeSheetSessionId::from_uuid(row.id),
            tenant_id: TenantId::from_uuid(row.tenant_id),
            owner_user_id: UserId::from_uuid(row.owner_user_id),
            start: row.start_at,
            end: row.end_at,
            duration_sec: row.duration_sec,
            earnings: row.earnings,
            status,
            location_start: stored_point(row.start_latitude, row.start_longitude)?,
            location_end: stored_point(row.end_latitude, row.end_longitude)?,
            created_at: row.created_at,
        })
    }
}

fn stored_point(latitude: Option<f64>, longitude: Option<f64>) -> AppResult<Option<GeoPoint>> {
    match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => GeoPoint::new(latitude, longitude)
            .map(Some)
            .map_err(|error| AppError::Internal(format!("invalid stored location: {error}"))),
        _ => Ok(None),
    }
}

#[async_trait]
impl TimeSheetRepository for PostgresTimeSheetRepository {
    async fn find_session(
        &self,
        session_id: TimeSheetSessionId,
    ) -> AppResult<Option<TimeSheetSession>> {
        let row = sqlx::query_as::<_, SessionRow>(&format!(
            "SELECT {SESSION_COLUMNS} FROM time_sheet_sessions WHERE id = $1"
        ))
        .bind(session_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| map_database_error("load time-sheet session", error))?;

        row.map(TimeSheetSession::try_from).transpose()
    }

    async fn find_open_session(
        &self,
        owner_user_id: UserId,
    ) -> AppResult<Option<TimeSheetSession>> {
        let row = sqlx::query_as::<_, SessionRow>(&format!(
            "SELECT {SESSION_COLUMNS} FROM time_sheet_sessions \
             WHERE owner_user_id = $1 AND end_at IS NULL"
        ))
        .bind(owner_user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| map_database_error("load open time-sheet session", error))?;

        row.map(TimeSheetSession::try_from).transpose()
    }

    async fn create_session(&self, session: TimeSheetSession) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO time_sheet_sessions (
                id,
                tenant_id,
                owner_user_id,
                start_at,
                end_at,
                duration_sec,
                earnings,
                status,
                start_latitude,
                start_longitude,
                end_latitude,
                end_longitude,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(session.id.as_uuid())
        .bind(session.tenant_id.as_uuid())
        .bind(session.owner_user_id.as_uuid())
        .bind(session.start)
        .bind(session.end)
        .bind(session.duration_sec)
        .bind(session.earnings)
        .bind(session.status.as_str())
        .bind(session.location_start.map(|point| point.latitude()))
        .bind(session.location_start.map(|point| point.longitude()))
        .bind(session.location_end.map(|point| point.latitude()))
        .bind(session.location_end.map(|point| point.longitude()))
        .bind(session.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(error) if is_unique_violation(&error) => Err(AppError::Conflict(
                "an open time-sheet session already exists".to_owned(),
            )),
            Err(error) => Err(map_database_error("create time-sheet session", error)),
        }
    }

    async fn save_session(&self, session: TimeSheetSession) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE time_sheet_sessions
            SET start_at = $2,
                end_at = $3,
                duration_sec = $4,
                earnings = $5,
                status = $6,
                start_latitude = $7,
                start_longitude = $8,
                end_latitude = $9,
                end_longitude = $10
            WHERE id = $1
            "#,
        )
        .bind(session.id.as_uuid())
        .bind(session.start)
        .bind(session.end)
        .bind(session.duration_sec)
        .bind(session.earnings)
        .bind(session.status.as_str())
        .bind(session.location_start.map(|point| point.latitude()))
        .bind(session.location_start.map(|point| point.longitude()))
        .bind(session.location_end.map(|point| point.latitude()))
        .bind(session.location_end.map(|point| point.longitude()))
        .execute(&self.pool)
        .await
        .map_err(|error| map_database_error("save time-sheet session", error))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "time-sheet session '{}'",
                session.id
            )));
        }

        Ok(())
    }

    async fn list_sessions(&self, query: SessionQuery) -> AppResult<Vec<TimeSheetSession>> {
        let limit = i64::try_from(query.limit).unwrap_or(i64::MAX);
        let rows = sqlx::query_as::<_, SessionRow>(&format!(
            "SELECT {SESSION_COLUMNS} FROM time_sheet_sessions \
             WHERE tenant_id = $1 \
               AND ($2::uuid IS NULL OR owner_user_id = $2) \
               AND ($3::timestamptz IS NULL OR start_at >= $3) \
               AND ($4::timestamptz IS NULL OR start_at < $4) \
             ORDER BY start_at DESC \
             LIMIT $5"
        ))
        .bind(query.tenant_id.as_uuid())
        .bind(query.owner_user_id.map(|user_id| user_id.as_uuid()))
        .bind(query.started_from)
        .bind(query.started_before)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| map_database_error("list time-sheet sessions", error))?;

        rows.into_iter().map(TimeSheetSession::try_from).collect()
    }
}
