use orbita_core::TenantId;
use serde::{Deserialize, Serialize};

use crate::{ActiveModules, EmailAddress, Role, SystemModule, UserId};

/// Resolved identity of the current request.
///
/// Built fresh for every session check from the verified credential and the
/// mutable profile record. A principal without a company is valid: it is the
/// onboarding default and every tenant-scoped check denies it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    user_id: UserId,
    email: Option<EmailAddress>,
    email_verified: bool,
    role: Role,
    tenant_id: Option<TenantId>,
    active_modules: ActiveModules,
}

impl Principal {
    /// Creates a principal with no email and no enabled modules.
    #[must_use]
    pub fn new(user_id: UserId, role: Role, tenant_id: Option<TenantId>) -> Self {
        Self {
            user_id,
            email: None,
            email_verified: false,
            role,
            tenant_id,
            active_modules: ActiveModules::none(),
        }
    }

    /// Creates the deny-by-default principal used before onboarding completes.
    #[must_use]
    pub fn onboarding_default(
        user_id: UserId,
        email: Option<EmailAddress>,
        email_verified: bool,
    ) -> Self {
        Self::new(user_id, Role::Colaborador, None).with_email(email, email_verified)
    }

    /// Sets the email and its verification state.
    #[must_use]
    pub fn with_email(mut self, email: Option<EmailAddress>, email_verified: bool) -> Self {
        self.email = email;
        self.email_verified = email_verified;
        self
    }

    /// Sets the enabled modules of the principal's company.
    #[must_use]
    pub fn with_modules(mut self, modules: impl IntoIterator<Item = SystemModule>) -> Self {
        self.active_modules = modules.into_iter().collect();
        self
    }

    /// Replaces the enabled module set.
    #[must_use]
    pub fn with_active_modules(mut self, active_modules: ActiveModules) -> Self {
        self.active_modules = active_modules;
        self
    }

    /// Returns the stable user identifier.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the email, if known.
    #[must_use]
    pub fn email(&self) -> Option<&EmailAddress> {
        self.email.as_ref()
    }

    /// Returns whether the email ownership was confirmed.
    #[must_use]
    pub fn email_verified(&self) -> bool {
        self.email_verified
    }

    /// Returns the role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the company, if the principal belongs to one.
    #[must_use]
    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    /// Returns the enabled modules.
    #[must_use]
    pub fn active_modules(&self) -> &ActiveModules {
        &self.active_modules
    }

    /// Returns whether the module is enabled for the principal's company.
    #[must_use]
    pub fn has_module(&self, module: SystemModule) -> bool {
        self.active_modules.contains(module)
    }
}
