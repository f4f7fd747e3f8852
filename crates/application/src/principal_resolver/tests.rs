use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use orbita_core::{AppError, AppResult, TenantId, UserIdentity};
use orbita_domain::{Principal, Role, SystemModule, UserId};
use tokio::sync::Mutex;

use crate::{IdentityProvider, PrincipalCache, ProfileRepository, UserProfile};

use super::{PrincipalResolver, RetryPolicy};

#[derive(Default)]
struct FakeIdentityProvider {
    identities: HashMap<String, UserIdentity>,
    revoked: Mutex<Vec<String>>,
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn verify(&self, token: &str) -> AppResult<Option<UserIdentity>> {
        if self.revoked.lock().await.iter().any(|value| value == token) {
            return Ok(None);
        }
        Ok(self.identities.get(token).cloned())
    }

    async fn revoke(&self, token: &str) -> AppResult<()> {
        self.revoked.lock().await.push(token.to_owned());
        Ok(())
    }
}

#[derive(Default)]
struct FakeProfileRepository {
    profiles: Mutex<HashMap<UserId, UserProfile>>,
    transient_failures: Mutex<u32>,
    permanent_failure: bool,
    calls: Mutex<u32>,
}

#[async_trait]
impl ProfileRepository for FakeProfileRepository {
    async fn find_profile(&self, user_id: UserId) -> AppResult<Option<UserProfile>> {
        *self.calls.lock().await += 1;

        if self.permanent_failure {
            return Err(AppError::Internal("profile row is corrupt".to_owned()));
        }

        let mut transient_failures = self.transient_failures.lock().await;
        if *transient_failures > 0 {
            *transient_failures -= 1;
            return Err(AppError::Unavailable("store offline".to_owned()));
        }

        Ok(self.profiles.lock().await.get(&user_id).cloned())
    }

    async fn list_profiles(&self, tenant_id: TenantId) -> AppResult<Vec<UserProfile>> {
        Ok(self
            .profiles
            .lock()
            .await
            .values()
            .filter(|profile| profile.tenant_id == Some(tenant_id))
            .cloned()
            .collect())
    }

    async fn save_profile(&self, profile: UserProfile) -> AppResult<()> {
        self.profiles.lock().await.insert(profile.user_id, profile);
        Ok(())
    }
}

#[derive(Default)]
struct FakePrincipalCache {
    entries: Mutex<HashMap<UserId, Principal>>,
}

#[async_trait]
impl PrincipalCache for FakePrincipalCache {
    async fn get(&self, user_id: UserId) -> AppResult<Option<Principal>> {
        Ok(self.entries.lock().await.get(&user_id).cloned())
    }

    async fn put(&self, principal: Principal) -> AppResult<()> {
        self.entries
            .lock()
            .await
            .insert(principal.user_id(), principal);
        Ok(())
    }

    async fn invalidate(&self, user_id: UserId) -> AppResult<()> {
        self.entries.lock().await.remove(&user_id);
        Ok(())
    }
}

fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        initial_backoff: Duration::ZERO,
        max_backoff: Duration::ZERO,
    }
}

struct Fixture {
    resolver: PrincipalResolver,
    profiles: Arc<FakeProfileRepository>,
    cache: Arc<FakePrincipalCache>,
    identity_provider: Arc<FakeIdentityProvider>,
    user_id: UserId,
}

fn fixture(profiles: FakeProfileRepository, retry_policy: RetryPolicy) -> Fixture {
    let user_id = UserId::new();
    let identity_provider = Arc::new(FakeIdentityProvider {
        identities: HashMap::from([
            (
                "token-1".to_owned(),
                UserIdentity::new(
                    user_id.to_string(),
                    Some("ana@orbita.app".to_owned()),
                    true,
                ),
            ),
            (
                "token-opaque".to_owned(),
                UserIdentity::new("firebase-uid-123", None, false),
            ),
        ]),
        revoked: Mutex::new(Vec::new()),
    });
    let profiles = Arc::new(profiles);
    let cache = Arc::new(FakePrincipalCache::default());
    let resolver = PrincipalResolver::new(
        identity_provider.clone(),
        profiles.clone(),
        cache.clone(),
        retry_policy,
    );

    Fixture {
        resolver,
        profiles,
        cache,
        identity_provider,
        user_id,
    }
}

async fn seed_profile(fixture: &Fixture, role: Role, tenant_id: Option<TenantId>) {
    let mut profile = UserProfile::new(fixture.user_id, role, tenant_id);
    profile.active_modules = [SystemModule::Ponto, SystemModule::Chamados]
        .into_iter()
        .collect();
    fixture
        .profiles
        .profiles
        .lock()
        .await
        .insert(fixture.user_id, profile);
}

#[tokio::test]
async fn missing_or_blank_credential_is_unauthorized() {
    let fixture = fixture(FakeProfileRepository::default(), fast_retry(1));

    for token in [None, Some(""), Some("   ")] {
        let result = fixture.resolver.resolve(token).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }
}

#[tokio::test]
async fn unknown_or_malformed_credential_is_unauthorized() {
    let fixture = fixture(FakeProfileRepository::default(), fast_retry(1));

    let unknown = fixture.resolver.resolve(Some("token-404")).await;
    assert!(matches!(unknown, Err(AppError::Unauthorized(_))));

    let opaque_subject = fixture.resolver.resolve(Some("token-opaque")).await;
    assert!(matches!(opaque_subject, Err(AppError::Unauthorized(_))));
}

#[tokio::test]
async fn complete_profile_resolves_role_company_and_modules() {
    let fixture = fixture(FakeProfileRepository::default(), fast_retry(1));
    let tenant_id = TenantId::new();
    seed_profile(&fixture, Role::Gestor, Some(tenant_id)).await;

    let principal = fixture
        .resolver
        .resolve(Some("token-1"))
        .await
        .unwrap_or_else(|_| panic!("test"));

    assert_eq!(principal.user_id(), fixture.user_id);
    assert_eq!(principal.role(), Role::Gestor);
    assert_eq!(principal.tenant_id(), Some(tenant_id));
    assert!(principal.has_module(SystemModule::Chamados));
    assert!(principal.email_verified());
    assert_eq!(
        principal.email().map(|email| email.as_str()),
        Some("ana@orbita.app")
    );
}

#[tokio::test]
async fn missing_profile_resolves_onboarding_default() {
    let fixture = fixture(FakeProfileRepository::default(), fast_retry(1));

    let principal = fixture
        .resolver
        .resolve(Some("token-1"))
        .await
        .unwrap_or_else(|_| panic!("test"));

    assert_eq!(principal.role(), Role::Colaborador);
    assert!(principal.tenant_id().is_none());
    assert!(principal.active_modules().is_empty());
}

#[tokio::test]
async fn profile_without_company_is_incomplete_unless_superadmin() {
    let incomplete = fixture(FakeProfileRepository::default(), fast_retry(1));
    seed_profile(&incomplete, Role::Admin, None).await;
    let principal = incomplete.resolver.resolve(Some("token-1")).await.ok();
    assert_eq!(principal.map(|value| value.role()), Some(Role::Colaborador));

    let operator = fixture(FakeProfileRepository::default(), fast_retry(1));
    seed_profile(&operator, Role::SuperAdmin, None).await;
    let principal = operator.resolver.resolve(Some("token-1")).await.ok();
    assert_eq!(principal.map(|value| value.role()), Some(Role::SuperAdmin));
}

#[tokio::test]
async fn transient_profile_failures_are_retried() {
    let fixture = fixture(
        FakeProfileRepository {
            transient_failures: Mutex::new(2),
            ..FakeProfileRepository::default()
        },
        fast_retry(3),
    );
    seed_profile(&fixture, Role::Admin, Some(TenantId::new())).await;

    let principal = fixture.resolver.resolve(Some("token-1")).await.ok();
    assert_eq!(principal.map(|value| value.role()), Some(Role::Admin));
    assert_eq!(*fixture.profiles.calls.lock().await, 3);
}

#[tokio::test]
async fn exhausted_retries_degrade_without_caching() {
    let fixture = fixture(
        FakeProfileRepository {
            transient_failures: Mutex::new(5),
            ..FakeProfileRepository::default()
        },
        fast_retry(2),
    );
    seed_profile(&fixture, Role::Admin, Some(TenantId::new())).await;

    let principal = fixture.resolver.resolve(Some("token-1")).await.ok();
    assert_eq!(principal.map(|value| value.role()), Some(Role::Colaborador));
    assert_eq!(*fixture.profiles.calls.lock().await, 2);
    assert!(fixture.cache.entries.lock().await.is_empty());
}

#[tokio::test]
async fn permanent_profile_failure_is_not_retried() {
    let fixture = fixture(
        FakeProfileRepository {
            permanent_failure: true,
            ..FakeProfileRepository::default()
        },
        fast_retry(4),
    );

    let principal = fixture.resolver.resolve(Some("token-1")).await.ok();
    assert_eq!(principal.and_then(|value| value.tenant_id()), None);
    assert_eq!(*fixture.profiles.calls.lock().await, 1);
}

#[tokio::test]
async fn cached_principal_skips_profile_lookup() {
    let fixture = fixture(FakeProfileRepository::default(), fast_retry(1));
    seed_profile(&fixture, Role::Gestor, Some(TenantId::new())).await;

    let first = fixture.resolver.resolve(Some("token-1")).await.ok();
    let second = fixture.resolver.resolve(Some("token-1")).await.ok();

    assert_eq!(first, second);
    assert_eq!(*fixture.profiles.calls.lock().await, 1);
}

#[tokio::test]
async fn invalidation_picks_up_role_change() {
    let fixture = fixture(FakeProfileRepository::default(), fast_retry(1));
    let tenant_id = TenantId::new();
    seed_profile(&fixture, Role::Colaborador, Some(tenant_id)).await;
    assert!(fixture.resolver.resolve(Some("token-1")).await.is_ok());

    seed_profile(&fixture, Role::Admin, Some(tenant_id)).await;
    let stale = fixture.resolver.resolve(Some("token-1")).await.ok();
    assert_eq!(stale.map(|value| value.role()), Some(Role::Colaborador));

    assert!(fixture.resolver.invalidate(fixture.user_id).await.is_ok());
    let fresh = fixture.resolver.resolve(Some("token-1")).await.ok();
    assert_eq!(fresh.map(|value| value.role()), Some(Role::Admin));
}

#[tokio::test]
async fn logout_revokes_credential_and_clears_cache() {
    let fixture = fixture(FakeProfileRepository::default(), fast_retry(1));
    seed_profile(&fixture, Role::Gestor, Some(TenantId::new())).await;
    assert!(fixture.resolver.resolve(Some("token-1")).await.is_ok());

    assert!(fixture.resolver.logout(Some("token-1")).await.is_ok());

    assert!(fixture.cache.entries.lock().await.is_empty());
    assert_eq!(
        fixture.identity_provider.revoked.lock().await.as_slice(),
        ["token-1".to_owned()]
    );
    assert!(matches!(
        fixture.resolver.resolve(Some("token-1")).await,
        Err(AppError::Unauthorized(_))
    ));
}

#[test]
fn backoff_doubles_until_capped() {
    let policy = RetryPolicy {
        max_attempts: 6,
        initial_backoff: Duration::from_millis(100),
        max_backoff: Duration::from_millis(500),
    };

    assert_eq!(policy.backoff_after(1), Duration::from_millis(100));
    assert_eq!(policy.backoff_after(2), Duration::from_millis(200));
    assert_eq!(policy.backoff_after(3), Duration::from_millis(400));
    assert_eq!(policy.backoff_after(4), Duration::from_millis(500));
    assert_eq!(policy.backoff_after(40), Duration::from_millis(500));
}
