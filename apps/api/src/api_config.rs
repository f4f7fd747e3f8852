use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use orbita_application::{AdminMasterScope, PolicyConfig, RetryPolicy};
use orbita_core::AppError;
use orbita_domain::rules::DEFAULT_EDIT_WINDOW_SECONDS;
use tracing_subscriber::EnvFilter;


const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_PRINCIPAL_CACHE_TTL_SECONDS: u64 = 300;
const DEFAULT_PRINCIPAL_CACHE_CAPACITY: usize = 10_000;

/// Where resolved principals are cached between requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrincipalCacheBackend {
    InMemory,
    Redis { redis_url: String },
}

#[derive(Debug, Clone)]
pub struct PrincipalCacheConfig {
    pub backend: PrincipalCacheBackend,
    pub ttl: Duration,
    pub capacity: usize,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub database_max_connections: u32,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub principal_cache: PrincipalCacheConfig,
    pub policy: PolicyConfig,
    pub resolver_retry: RetryPolicy,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");
        Self::from_lookup(migrate_only, |name| env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(migrate_only: bool, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = required_non_empty_env(&lookup, "DATABASE_URL")?;
        let database_max_connections = parse_env(
            &lookup,
            "DATABASE_MAX_CONNECTIONS",
            DEFAULT_DATABASE_MAX_CONNECTIONS,
        )?
        .max(1);
        let frontend_url =
            lookup("FRONTEND_URL").unwrap_or_else(|| "http://localhost:3000".to_owned());

        let api_host = lookup("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = lookup("API_PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let backend = match lookup("PRINCIPAL_CACHE_BACKEND")
            .unwrap_or_else(|| "in_memory".to_owned())
            .trim()
        {
            "in_memory" => PrincipalCacheBackend::InMemory,
            "redis" => PrincipalCacheBackend::Redis {
                redis_url: required_non_empty_env(&lookup, "REDIS_URL")?,
            },
            other => {
                return Err(AppError::Validation(format!(
                    "PRINCIPAL_CACHE_BACKEND must be either 'in_memory' or 'redis', got '{other}'"
                )));
            }
        };
        let principal_cache = PrincipalCacheConfig {
            backend,
            ttl: Duration::from_secs(parse_env(
                &lookup,
                "PRINCIPAL_CACHE_TTL_SECONDS",
                DEFAULT_PRINCIPAL_CACHE_TTL_SECONDS,
            )?),
            capacity: parse_env(
                &lookup,
                "PRINCIPAL_CACHE_CAPACITY",
                DEFAULT_PRINCIPAL_CACHE_CAPACITY,
            )?,
        };

        let edit_window_seconds = parse_env(
            &lookup,
            "POLICY_EDIT_WINDOW_SECONDS",
            DEFAULT_EDIT_WINDOW_SECONDS,
        )?;
        if edit_window_seconds < 0 {
            return Err(AppError::Validation(
                "POLICY_EDIT_WINDOW_SECONDS must not be negative".to_owned(),
            ));
        }
        let admin_master_scope = match lookup("POLICY_ADMINMASTER_SCOPE") {
            Some(value) if !value.trim().is_empty() => AdminMasterScope::from_str(value.trim())?,
            _ => AdminMasterScope::default(),
        };
        let policy = PolicyConfig {
            edit_window: chrono::Duration::seconds(edit_window_seconds),
            admin_master_scope,
        };

        let retry_defaults = RetryPolicy::default();
        let resolver_retry = RetryPolicy {
            max_attempts: parse_env(
                &lookup,
                "RESOLVER_MAX_ATTEMPTS",
                retry_defaults.max_attempts,
            )?
            .max(1),
            initial_backoff: Duration::from_millis(parse_env(
                &lookup,
                "RESOLVER_INITIAL_BACKOFF_MS",
                u64::try_from(retry_defaults.initial_backoff.as_millis()).unwrap_or(100),
            )?),
            max_backoff: retry_defaults.max_backoff,
        };

        Ok(Self {
            migrate_only,
            database_url,
            database_max_connections,
            frontend_url,
            api_host,
            api_port,
            principal_cache,
            policy,
            resolver_retry,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_non_empty_env<F>(lookup: &F, name: &str) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(name).ok_or_else(|| AppError::Validation(format!("{name} is required")))?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

fn parse_env<F, T>(lookup: &F, name: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<T>()
            .map_err(|error| AppError::Validation(format!("invalid {name} '{value}': {error}"))),
        _ => Ok(default),
    }
}
