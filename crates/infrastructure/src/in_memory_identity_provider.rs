use std::collections::HashMap;

use async_trait::async_trait;
use orbita_application::IdentityProvider;
use orbita_core::{AppResult, UserIdentity};
use tokio::sync::RwLock;

/// Token table held in memory, for local runs and tests.
#[derive(Debug, Default)]
pub struct InMemoryIdentityProvider {
    tokens: RwLock<HashMap<String, UserIdentity>>,
}

impl InMemoryIdentityProvider {
    /// Creates a provider that knows no tokens.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a bearer token for an identity.
    pub async fn insert_token(&self, token: impl Into<String>, identity: UserIdentity) {
        self.tokens.write().await.insert(token.into(), identity);
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn verify(&self, token: &str) -> AppResult<Option<UserIdentity>> {
        Ok(self.tokens.read().await.get(token).cloned())
    }

    async fn revoke(&self, token: &str) -> AppResult<()> {
        self.tokens.write().await.remove(token);
        Ok(())
    }
}
