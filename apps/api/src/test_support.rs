use std::sync::Arc;
use std::time::Duration;

use orbita_application::{PolicyConfig, ProfileRepository, RetryPolicy, UserProfile};
use orbita_core::{TenantId, UserIdentity};
use orbita_domain::{Principal, Role, UserId};
use orbita_infrastructure::{
    InMemoryAuditRepository, InMemoryIdentityProvider, InMemoryPrincipalCache,
    InMemoryProfileRepository, InMemoryTimeSheetRepository,
};

use crate::api_services::{ServiceAdapters, assemble_app_state};
use crate::state::AppState;

/// Application state over in-memory adapters.
pub struct TestApp {
    pub state: AppState,
    pub identity_provider: Arc<InMemoryIdentityProvider>,
    pub profiles: Arc<InMemoryProfileRepository>,
    pub tenant_id: TenantId,
}

impl TestApp {
    pub fn new() -> Self {
        let identity_provider = Arc::new(InMemoryIdentityProvider::new());
        let profiles = Arc::new(InMemoryProfileRepository::new());
        let adapters = ServiceAdapters {
            identity_provider: identity_provider.clone(),
            profile_repository: profiles.clone(),
            time_sheet_repository: Arc::new(InMemoryTimeSheetRepository::new()),
            audit_repository: Arc::new(InMemoryAuditRepository::new()),
            principal_cache: Arc::new(InMemoryPrincipalCache::new(Duration::from_secs(60), 64)),
        };

        Self {
            state: assemble_app_state(adapters, PolicyConfig::default(), RetryPolicy::none()),
            identity_provider,
            profiles,
            tenant_id: TenantId::new(),
        }
    }

    /// Stores a complete profile in the company and issues `token` for it.
    pub async fn member(&self, role: Role, token: &str) -> Principal {
        let user_id = UserId::new();
        let profile = UserProfile::new(user_id, role, Some(self.tenant_id));
        assert!(self.profiles.save_profile(profile.clone()).await.is_ok());
        self.identity_provider
            .insert_token(
                token,
                UserIdentity::new(user_id.to_string(), None, true),
            )
            .await;

        profile.to_principal(None, true)
    }
}
