use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use orbita_application::PrincipalCache;
use orbita_core::AppResult;
use orbita_domain::{Principal, UserId};
use tokio::sync::RwLock;


#[derive(Debug, Clone)]
struct PrincipalCacheEntry {
    principal: Principal,
    expires_at: Instant,
}

/// Bounded in-process cache of resolved principals.
pub struct InMemoryPrincipalCache {
    entries: RwLock<HashMap<UserId, PrincipalCacheEntry>>,
    ttl: Duration,
    capacity: usize,
}

impl InMemoryPrincipalCache {
    /// Creates an empty cache. A zero TTL or capacity disables caching.
    #[must_use]
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            capacity,
        }
    }

    /// Returns the number of stored entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns whether nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl PrincipalCache for InMemoryPrincipalCache {
    async fn get(&self, user_id: UserId) -> AppResult<Option<Principal>> {
        {
            let entries = self.entries.read().await;
            match entries.get(&user_id) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Ok(Some(entry.principal.clone()));
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }

        let mut entries = self.entries.write().await;
        if entries
            .get(&user_id)
            .is_some_and(|entry| entry.expires_at <= Instant::now())
        {
            entries.remove(&user_id);
        }

        Ok(None)
    }

    async fn put(&self, principal: Principal) -> AppResult<()> {
        if self.ttl.is_zero() || self.capacity == 0 {
            return Ok(());
        }

        let now = Instant::now();
        let expires_at = now.checked_add(self.ttl).unwrap_or(now);
        let user_id = principal.user_id();

        let mut entries = self.entries.write().await;
        if !entries.contains_key(&user_id) && entries.len() >= self.capacity {
            entries.retain(|_, entry| entry.expires_at > now);

            if entries.len() >= self.capacity {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.expires_at)
                    .map(|(key, _)| *key);
                if let Some(oldest) = oldest {
                    entries.remove(&oldest);
                }
            }
        }

        entries.insert(
            user_id,
            PrincipalCacheEntry {
                principal,
                expires_at,
            },
        );

        Ok(())
    }

    async fn invalidate(&self, user_id: UserId) -> AppResult<()> {
        self.entries.write().await.remove(&user_id);
        Ok(())
    }
}
