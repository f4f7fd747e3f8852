use std::sync::Arc;

use orbita_application::{
    AccessGate, AuditRepository, AuthorizationService, IdentityProvider, PolicyConfig,
    PolicyEngine, PrincipalCache, PrincipalResolver, ProfileRepository, ProfileService,
    RetryPolicy, TimeSheetRepository, TimeSheetService,
};
use orbita_core::AppError;
use orbita_infrastructure::{
    InMemoryPrincipalCache, PostgresAuditRepository, PostgresProfileRepository,
    PostgresSessionIdentityProvider, PostgresTimeSheetRepository, RedisPrincipalCache,
};
use sqlx::PgPool;

use crate::api_config::{ApiConfig, PrincipalCacheBackend, PrincipalCacheConfig};
use crate::state::AppState;

const PRINCIPAL_CACHE_KEY_PREFIX: &str = "orbita";

/// Port implementations the services are wired over.
pub struct ServiceAdapters {
    pub identity_provider: Arc<dyn IdentityProvider>,
    pub profile_repository: Arc<dyn ProfileRepository>,
    pub time_sheet_repository: Arc<dyn TimeSheetRepository>,
    pub audit_repository: Arc<dyn AuditRepository>,
    pub principal_cache: Arc<dyn PrincipalCache>,
}

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> Result<AppState, AppError> {
    let adapters = ServiceAdapters {
        identity_provider: Arc::new(PostgresSessionIdentityProvider::new(pool.clone())),
        profile_repository: Arc::new(PostgresProfileRepository::new(pool.clone())),
        time_sheet_repository: Arc::new(PostgresTimeSheetRepository::new(pool.clone())),
        audit_repository: Arc::new(PostgresAuditRepository::new(pool)),
        principal_cache: build_principal_cache(&config.principal_cache)?,
    };

    Ok(assemble_app_state(
        adapters,
        config.policy,
        config.resolver_retry,
    ))
}

pub fn assemble_app_state(
    adapters: ServiceAdapters,
    policy: PolicyConfig,
    resolver_retry: RetryPolicy,
) -> AppState {
    let engine = PolicyEngine::new(policy);
    let authorization_service =
        AuthorizationService::new(engine, adapters.audit_repository.clone());

    AppState {
        principal_resolver: PrincipalResolver::new(
            adapters.identity_provider,
            adapters.profile_repository.clone(),
            adapters.principal_cache.clone(),
            resolver_retry,
        ),
        access_gate: AccessGate::new(engine),
        time_sheet_service: TimeSheetService::new(
            adapters.time_sheet_repository,
            adapters.profile_repository.clone(),
            authorization_service.clone(),
            adapters.audit_repository.clone(),
        ),
        profile_service: ProfileService::new(
            adapters.profile_repository,
            adapters.principal_cache,
            authorization_service,
            adapters.audit_repository,
        ),
    }
}

fn build_principal_cache(
    config: &PrincipalCacheConfig,
) -> Result<Arc<dyn PrincipalCache>, AppError> {
    match &config.backend {
        PrincipalCacheBackend::InMemory => {
            tracing::info!(
                ttl_seconds = config.ttl.as_secs(),
                capacity = config.capacity,
                "using in-memory principal cache"
            );
            Ok(Arc::new(InMemoryPrincipalCache::new(
                config.ttl,
                config.capacity,
            )))
        }
        PrincipalCacheBackend::Redis { redis_url } => {
            let client = redis::Client::open(redis_url.as_str())
                .map_err(|error| AppError::Validation(format!("invalid REDIS_URL: {error}")))?;
            tracing::info!(ttl_seconds = config.ttl.as_secs(), "using redis principal cache");
            Ok(Arc::new(RedisPrincipalCache::new(
                client,
                PRINCIPAL_CACHE_KEY_PREFIX,
                config.ttl,
            )))
        }
    }
}
