use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use orbita_core::{AppError, AppResult, UserIdentity};
use orbita_domain::{EmailAddress, Principal, UserId};

use crate::{IdentityProvider, PrincipalCache, ProfileRepository, UserProfile};

#[cfg(test)]
mod tests;

/// Exponential backoff applied to transient store failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_backoff: Duration,
    /// Upper bound for any single delay.
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// Runs the operation once, with no retries.
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Returns the delay after the given failed attempt (1-based).
    ///
    /// Formula: `min(max_backoff, initial_backoff * 2^(attempt - 1))`.
    #[must_use]
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        let factor = 2_u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Runs `operation`, retrying only [`AppError::Unavailable`] failures.
    pub async fn run<T, F, Fut>(&self, operation_name: &str, mut operation: F) -> AppResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match operation().await {
                Err(error) if error.is_transient() && attempt < max_attempts => {
                    let delay = self.backoff_after(attempt);
                    tracing::debug!(
                        operation = operation_name,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %error,
                        "retrying after transient failure"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(2),
        }
    }
}

/// Derives the principal of a request from its session credential.
#[derive(Clone)]
pub struct PrincipalResolver {
    identity_provider: Arc<dyn IdentityProvider>,
    profile_repository: Arc<dyn ProfileRepository>,
    cache: Arc<dyn PrincipalCache>,
    retry_policy: RetryPolicy,
}

impl PrincipalResolver {
    /// Creates a resolver from its collaborators.
    #[must_use]
    pub fn new(
        identity_provider: Arc<dyn IdentityProvider>,
        profile_repository: Arc<dyn ProfileRepository>,
        cache: Arc<dyn PrincipalCache>,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self {
            identity_provider,
            profile_repository,
            cache,
            retry_policy,
        }
    }

    /// Resolves the principal behind a bearer credential.
    ///
    /// Fails only with [`AppError::Unauthorized`] for an absent or invalid
    /// credential, or [`AppError::Unavailable`] when the credential itself
    /// cannot be checked. A missing, incomplete or unreadable profile yields
    /// the onboarding default principal instead.
    pub async fn resolve(&self, token: Option<&str>) -> AppResult<Principal> {
        let identity = self.verify(token).await?;
        let user_id = user_id_from_identity(&identity)?;
        let email = identity
            .email()
            .and_then(|value| EmailAddress::new(value).ok());
        let email_verified = identity.email_verified();

        match self.cache.get(user_id).await {
            Ok(Some(principal)) => return Ok(principal.with_email(email, email_verified)),
            Ok(None) => {}
            Err(error) => {
                tracing::warn!(user_id = %user_id, error = %error, "principal cache read failed");
            }
        }

        let principal = match self.load_profile(user_id).await {
            Ok(Some(profile)) if profile.is_complete() => {
                profile.to_principal(email, email_verified)
            }
            Ok(Some(profile)) => {
                tracing::warn!(
                    user_id = %user_id,
                    role = profile.role.as_str(),
                    "profile without company; using onboarding principal"
                );
                Principal::onboarding_default(user_id, email, email_verified)
            }
            Ok(None) => {
                tracing::debug!(user_id = %user_id, "no profile yet; using onboarding principal");
                Principal::onboarding_default(user_id, email, email_verified)
            }
            Err(AppError::Unauthorized(message)) => return Err(AppError::Unauthorized(message)),
            Err(error) => {
                tracing::warn!(
                    user_id = %user_id,
                    error = %error,
                    "profile lookup failed; degrading to onboarding principal"
                );
                return Ok(Principal::onboarding_default(user_id, email, email_verified));
            }
        };

        if let Err(error) = self.cache.put(principal.clone()).await {
            tracing::warn!(user_id = %user_id, error = %error, "principal cache write failed");
        }

        Ok(principal)
    }

    /// Ends the session behind the credential and forgets its principal.
    pub async fn logout(&self, token: Option<&str>) -> AppResult<()> {
        let identity = self.verify(token).await?;
        let user_id = user_id_from_identity(&identity)?;

        if let Some(token) = normalized_token(token) {
            self.identity_provider.revoke(token).await?;
        }

        self.invalidate(user_id).await
    }

    /// Drops any cached principal of the user, e.g. after a role change.
    pub async fn invalidate(&self, user_id: UserId) -> AppResult<()> {
        self.cache.invalidate(user_id).await
    }

    /// Reads the profile behind a principal with the resolver's retry policy.
    pub async fn load_profile(&self, user_id: UserId) -> AppResult<Option<UserProfile>> {
        self.retry_policy
            .run("find_profile", || self.profile_repository.find_profile(user_id))
            .await
    }

    async fn verify(&self, token: Option<&str>) -> AppResult<UserIdentity> {
        let token = normalized_token(token)
            .ok_or_else(|| AppError::Unauthorized("missing credential".to_owned()))?;

        self.retry_policy
            .run("verify_credential", || self.identity_provider.verify(token))
            .await?
            .ok_or_else(|| AppError::Unauthorized("invalid credential".to_owned()))
    }
}

fn normalized_token(token: Option<&str>) -> Option<&str> {
    token.map(str::trim).filter(|value| !value.is_empty())
}

fn user_id_from_identity(identity: &UserIdentity) -> AppResult<UserId> {
    UserId::from_str(identity.subject())
        .map_err(|_| AppError::Unauthorized("credential subject is not a user id".to_owned()))
}
