use async_trait::async_trait;
use orbita_core::{AppResult, TenantId, UserIdentity};
use orbita_domain::{ActiveModules, EmailAddress, Principal, Role, TimeSheetConfig, UserId};

/// Mutable profile record of a user, keyed by user id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    /// Owner of the profile.
    pub user_id: UserId,
    /// Optional name shown in reports.
    pub display_name: Option<String>,
    /// Privilege level.
    pub role: Role,
    /// Company membership.
    pub tenant_id: Option<TenantId>,
    /// Modules enabled for the user's company.
    pub active_modules: ActiveModules,
    /// Pay rules applied to the user's time-sheet sessions.
    pub time_sheet: TimeSheetConfig,
}

impl UserProfile {
    /// Creates a profile with no modules and a zero pay configuration.
    #[must_use]
    pub fn new(user_id: UserId, role: Role, tenant_id: Option<TenantId>) -> Self {
        Self {
            user_id,
            display_name: None,
            role,
            tenant_id,
            active_modules: ActiveModules::none(),
            time_sheet: TimeSheetConfig::default(),
        }
    }

    /// Returns whether the profile carries every field its role needs.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.role.requires_tenant() || self.tenant_id.is_some()
    }

    /// Builds the principal for this profile and a verified credential.
    #[must_use]
    pub fn to_principal(&self, email: Option<EmailAddress>, email_verified: bool) -> Principal {
        Principal::new(self.user_id, self.role, self.tenant_id)
            .with_email(email, email_verified)
            .with_active_modules(self.active_modules.clone())
    }
}

/// External identity boundary: verifies session credentials.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the identity behind the credential, or `None` when unknown.
    async fn verify(&self, token: &str) -> AppResult<Option<UserIdentity>>;

    /// Ends the session behind the credential.
    async fn revoke(&self, token: &str) -> AppResult<()>;
}

/// Repository port for user profile records.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Finds the profile of a user.
    async fn find_profile(&self, user_id: UserId) -> AppResult<Option<UserProfile>>;

    /// Lists the profiles of one company.
    async fn list_profiles(&self, tenant_id: TenantId) -> AppResult<Vec<UserProfile>>;

    /// Creates or replaces a profile.
    async fn save_profile(&self, profile: UserProfile) -> AppResult<()>;
}

/// Bounded, expiring store of resolved principals.
#[async_trait]
pub trait PrincipalCache: Send + Sync {
    /// Returns a live cached principal.
    async fn get(&self, user_id: UserId) -> AppResult<Option<Principal>>;

    /// Stores a principal for the configured TTL.
    async fn put(&self, principal: Principal) -> AppResult<()>;

    /// Drops the cached principal of a user.
    async fn invalidate(&self, user_id: UserId) -> AppResult<()>;
}
