use std::collections::HashMap;

use async_trait::async_trait;
use orbita_application::{ProfileRepository, UserProfile};
use orbita_core::{AppResult, TenantId};
use orbita_domain::UserId;
use tokio::sync::RwLock;

/// In-memory profile repository implementation.
#[derive(Debug, Default)]
pub struct InMemoryProfileRepository {
    profiles: RwLock<HashMap<UserId, UserProfile>>,
}

impl InMemoryProfileRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn find_profile(&self, user_id: UserId) -> AppResult<Option<UserProfile>> {
        Ok(self.profiles.read().await.get(&user_id).cloned())
    }

    async fn list_profiles(&self, tenant_id: TenantId) -> AppResult<Vec<UserProfile>> {
        let profiles = self.profiles.read().await;

        let mut values: Vec<UserProfile> = profiles
            .values()
            .filter(|profile| profile.tenant_id == Some(tenant_id))
            .cloned()
            .collect();
        values.sort_by(|left, right| {
            left.display_name
                .cmp(&right.display_name)
                .then_with(|| left.user_id.as_uuid().cmp(&right.user_id.as_uuid()))
        });

        Ok(values)
    }

    async fn save_profile(&self, profile: UserProfile) -> AppResult<()> {
        self.profiles.write().await.insert(profile.user_id, profile);
        Ok(())
    }
}
