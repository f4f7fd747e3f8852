//! Redis-backed principal cache shared by every API instance.

use std::time::Duration;

use async_trait::async_trait;
use orbita_application::PrincipalCache;
use orbita_core::{AppError, AppResult};
use orbita_domain::{Principal, UserId};
use redis::AsyncCommands;

/// Redis implementation of the principal cache port.
#[derive(Clone)]
pub struct RedisPrincipalCache {
    client: redis::Client,
    key_prefix: String,
    ttl: Duration,
}

impl RedisPrincipalCache {
    /// Creates a cache adapter with a configured Redis client, key prefix and
    /// entry TTL.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>, ttl: Duration) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
            ttl,
        }
    }

    fn key_for(&self, user_id: UserId) -> String {
        format!("{}:principal:{user_id}", self.key_prefix)
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Unavailable(format!("failed to connect to redis: {error}")))
    }
}

#[async_trait]
impl PrincipalCache for RedisPrincipalCache {
    async fn get(&self, user_id: UserId) -> AppResult<Option<Principal>> {
        let mut connection = self.connection().await?;
        let encoded: Option<String> =
            connection.get(self.key_for(user_id)).await.map_err(|error| {
                AppError::Unavailable(format!("failed to read principal cache entry: {error}"))
            })?;

        encoded
            .as_deref()
            .map(|value| {
                serde_json::from_str::<Principal>(value).map_err(|error| {
                    AppError::Internal(format!("invalid principal cache entry: {error}"))
                })
            })
            .transpose()
    }

    async fn put(&self, principal: Principal) -> AppResult<()> {
        let ttl_seconds = self.ttl.as_secs();
        if ttl_seconds == 0 {
            return Ok(());
        }

        let key = self.key_for(principal.user_id());
        let value = serde_json::to_string(&principal).map_err(|error| {
            AppError::Internal(format!("failed to encode principal cache entry: {error}"))
        })?;

        let mut connection = self.connection().await?;
        connection
            .set_ex(key, value, ttl_seconds)
            .await
            .map_err(|error| {
                AppError::Unavailable(format!("failed to write principal cache entry: {error}"))
            })
    }

    async fn invalidate(&self, user_id: UserId) -> AppResult<()> {
        let mut connection = self.connection().await?;
        connection
            .del(self.key_for(user_id))
            .await
            .map_err(|error| {
                AppError::Unavailable(format!("failed to drop principal cache entry: {error}"))
            })
    }
}
