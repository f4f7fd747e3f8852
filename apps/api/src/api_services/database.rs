use std::time::Duration;

use orbita_core::AppError;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens the pool and applies pending migrations.
///
/// An unreachable server is reported as [`AppError::Unavailable`] so the
/// process supervisor can tell it apart from a broken migration.
pub async fn connect_and_migrate(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(database_url)
        .await
        .map_err(|error| AppError::Unavailable(format!("database unreachable: {error}")))?;

    let migrator = sqlx::migrate!("../../crates/infrastructure/migrations");
    migrator
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("migration failed: {error}")))?;

    tracing::info!(
        max_connections,
        migrations = migrator.iter().count(),
        "database ready"
    );

    Ok(pool)
}
