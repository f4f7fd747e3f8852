//! PostgreSQL-backed user profile repository.

use std::str::FromStr;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;

use orbita_application::{ProfileRepository, UserProfile};
use orbita_core::{AppError, AppResult, TenantId};
use orbita_domain::{ActiveModules, Role, TimeSheetConfig, UserId};

use crate::postgres_error::map_database_error;


/// PostgreSQL implementation of the profile repository port.
#[derive(Clone)]
pub struct PostgresProfileRepository {
    pool: PgPool,
}

impl PostgresProfileRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    user_id: uuid::Uuid,
    display_name: Option<String>,
    role: String,
    tenant_id: Option<uuid::Uuid>,
    active_modules: Vec<String>,
    tolerance_minutes: i64,
    lunch_break_minutes: i64,
    lunch_threshold_minutes: i64,
    hourly_rate: Decimal,
}

impl TryFrom<ProfileRow> for UserProfile {
    type Error = AppError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let role = Role::from_str(row.role.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "invalid stored role for user '{}': {error}",
                row.user_id
            ))
        })?;

        let (active_modules, unknown_modules) =
            ActiveModules::from_storage_values(row.active_modules);
        if !unknown_modules.is_empty() {
            tracing::warn!(
                user_id = %row.user_id,
                unknown_modules = ?unknown_modules,
                "ignoring unknown stored modules"
            );
        }

        Ok(Self {
            user_id: UserId::from_uuid(row.user_id),
            display_name: row.display_name,
            role,
            tenant_id: row.tenant_id.map(TenantId::from_uuid),
            active_modules,
            time_sheet: TimeSheetConfig {
                tolerance_minutes: row.tolerance_minutes,
                lunch_break_minutes: row.lunch_break_minutes,
                lunch_threshold_minutes: row.lunch_threshold_minutes,
                hourly_rate: row.hourly_rate,
            },
        })
    }
}

#[async_trait]
impl ProfileRepository for PostgresProfileRepository {
    async fn find_profile(&self, user_id: UserId) -> AppResult<Option<UserProfile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT
                user_id,
                display_name,
                role,
                tenant_id,
                active_modules,
                tolerance_minutes,
                lunch_break_minutes,
                lunch_threshold_minutes,
                hourly_rate
            FROM user_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| map_database_error("load user profile", error))?;

        row.map(UserProfile::try_from).transpose()
    }

    async fn list_profiles(&self, tenant_id: TenantId) -> AppResult<Vec<UserProfile>> {
        let rows = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT
                user_id,
                display_name,
                role,
                tenant_id,
                active_modules,
                tolerance_minutes,
                lunch_break_minutes,
                lunch_threshold_minutes,
                hourly_rate
            FROM user_profiles
            WHERE tenant_id = $1
            ORDER BY display_name NULLS LAST, user_id
            "#,
        )
        .bind(tenant_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| map_database_error("list user profiles", error))?;

        rows.into_iter().map(UserProfile::try_from).collect()
    }

    async fn save_profile(&self, profile: UserProfile) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_profiles (
                user_id,
                display_name,
                role,
                tenant_id,
                active_modules,
                tolerance_minutes,
                lunch_break_minutes,
                lunch_threshold_minutes,
                hourly_rate,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, now())
            ON CONFLICT (user_id) DO UPDATE
            SET display_name = EXCLUDED.display_name,
                role = EXCLUDED.role,
                tenant_id = EXCLUDED.tenant_id,
                active_modules = EXCLUDED.active_modules,
                tolerance_minutes = EXCLUDED.tolerance_minutes,
                lunch_break_minutes = EXCLUDED.lunch_break_minutes,
                lunch_threshold_minutes = EXCLUDED.lunch_threshold_minutes,
                hourly_rate = EXCLUDED.hourly_rate,
                updated_at = now()
            "#,
        )
        .bind(profile.user_id.as_uuid())
        .bind(profile.display_name)
        .bind(profile.role.as_str())
        .bind(profile.tenant_id.map(|tenant_id| tenant_id.as_uuid()))
        .bind(profile.active_modules.storage_values())
        .bind(profile.time_sheet.tolerance_minutes)
        .bind(profile.time_sheet.lunch_break_minutes)
        .bind(profile.time_sheet.lunch_threshold_minutes)
        .bind(profile.time_sheet.hourly_rate)
        .execute(&self.pool)
        .await
        .map_err(|error| map_database_error("save user profile", error))?;

        Ok(())
    }
}
