use async_trait::async_trait;
use sqlx::PgPool;

use orbita_application::{AuditEvent, AuditRepository};
use orbita_core::AppResult;

use crate::postgres_error::map_database_error;


/// PostgreSQL-backed append-only audit repository.
#[derive(Clone)]
pub struct PostgresAuditRepository {
    pool: PgPool,
}

impl PostgresAuditRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditRepository for PostgresAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_log_entries (
                tenant_id,
                subject,
                action,
                severity,
                resource_type,
                resource_id,
                detail
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(event.tenant_id.map(|tenant_id| tenant_id.as_uuid()))
        .bind(event.subject)
        .bind(event.action.as_str())
        .bind(event.severity.as_str())
        .bind(event.resource_type)
        .bind(event.resource_id)
        .bind(event.detail)
        .execute(&self.pool)
        .await
        .map_err(|error| map_database_error("append audit event", error))?;

        Ok(())
    }
}
