//! Opaque bearer tokens stored as SHA-256 hashes in `user_sessions`.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use sqlx::PgPool;

use orbita_application::IdentityProvider;
use orbita_core::{AppResult, UserIdentity};

use crate::postgres_error::map_database_error;


/// PostgreSQL implementation of the identity provider port.
#[derive(Clone)]
pub struct PostgresSessionIdentityProvider {
    pool: PgPool,
}

impl PostgresSessionIdentityProvider {
    /// Creates a provider with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SessionIdentityRow {
    user_id: uuid::Uuid,
    email: Option<String>,
    email_verified: bool,
}

#[async_trait]
impl IdentityProvider for PostgresSessionIdentityProvider {
    async fn verify(&self, token: &str) -> AppResult<Option<UserIdentity>> {
        let row = sqlx::query_as::<_, SessionIdentityRow>(
            r#"
            SELECT users.id AS user_id, users.email, users.email_verified
            FROM user_sessions
            INNER JOIN users ON users.id = user_sessions.user_id
            WHERE user_sessions.token_hash = $1
              AND user_sessions.revoked_at IS NULL
              AND user_sessions.expires_at > now()
            "#,
        )
        .bind(hash_session_token(token))
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| map_database_error("verify session token", error))?;

        Ok(row.map(|row| UserIdentity::new(row.user_id.to_string(), row.email, row.email_verified)))
    }

    async fn revoke(&self, token: &str) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE user_sessions
            SET revoked_at = now()
            WHERE token_hash = $1
              AND revoked_at IS NULL
            "#,
        )
        .bind(hash_session_token(token))
        .execute(&self.pool)
        .await
        .map_err(|error| map_database_error("revoke session token", error))?;

        Ok(())
    }
}

/// Computes the stored form of a bearer token.
pub(crate) fn hash_session_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
