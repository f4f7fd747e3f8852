//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_audit_repository;
mod in_memory_identity_provider;
mod in_memory_principal_cache;
mod in_memory_profile_repository;
mod in_memory_time_sheet_repository;
mod postgres_audit_repository;
mod postgres_error;
mod postgres_profile_repository;
mod postgres_session_identity_provider;
#[cfg(test)]
mod postgres_test_support;
mod postgres_time_sheet_repository;
mod redis_principal_cache;

pub use in_memory_audit_repository::InMemoryAuditRepository;
pub use in_memory_identity_provider::InMemoryIdentityProvider;
pub use in_memory_principal_cache::InMemoryPrincipalCache;
pub use in_memory_profile_repository::InMemoryProfileRepository;
pub use in_memory_time_sheet_repository::InMemoryTimeSheetRepository;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_profile_repository::PostgresProfileRepository;
pub use postgres_session_identity_provider::PostgresSessionIdentityProvider;
pub use postgres_time_sheet_repository::PostgresTimeSheetRepository;
pub use redis_principal_cache::RedisPrincipalCache;
