use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use orbita_core::{AppError, TenantId};
use orbita_domain::rules::{self, DEFAULT_EDIT_WINDOW_SECONDS};
use orbita_domain::{Action, Principal, Resource, ResourceKind, ResourceScope, Role};

#[cfg(test)]
mod tests;

/// How far the `adminmaster` role may cross company boundaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AdminMasterScope {
    /// Same override as `superadmin`.
    Global,
    /// Bypasses company scoping except on financial records.
    #[default]
    NonFinancial,
    /// Stays inside its own company like every other role.
    TenantBound,
}

impl AdminMasterScope {
    /// Returns a stable configuration value for this scope.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::NonFinancial => "non_financial",
            Self::TenantBound => "tenant_bound",
        }
    }
}

impl FromStr for AdminMasterScope {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "global" => Ok(Self::Global),
            "non_financial" => Ok(Self::NonFinancial),
            "tenant_bound" => Ok(Self::TenantBound),
            _ => Err(AppError::Validation(format!(
                "unknown adminmaster scope '{value}'"
            ))),
        }
    }
}

/// Tunables of the access policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyConfig {
    /// How long an owner may still modify a freshly recorded time entry.
    pub edit_window: Duration,
    /// Company-boundary behaviour of `adminmaster`.
    pub admin_master_scope: AdminMasterScope,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            edit_window: Duration::seconds(DEFAULT_EDIT_WINDOW_SECONDS),
            admin_master_scope: AdminMasterScope::default(),
        }
    }
}

/// Why an allowed decision must be written to the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditReason {
    /// An elevated role changed a time entry after the owner edit window.
    ElevatedEditPastWindow,
}

impl AuditReason {
    /// Returns a stable label for this reason.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ElevatedEditPastWindow => "elevated_edit_past_window",
        }
    }
}

/// Why an attempt was denied. Never shown to end users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenyReason {
    /// Write without a confirmed email on collaborator-scoped data.
    EmailNotVerified,
    /// Principal and resource belong to different companies.
    TenantMismatch,
    /// Personal record of someone else.
    NotOwner,
    /// Role below the one the resource requires.
    InsufficientRole,
    /// The company has not enabled the resource's module.
    ModuleDisabled,
    /// Owner edit attempted after the edit window closed.
    EditWindowExpired,
    /// Fields the decision depends on are absent or inconsistent.
    MalformedResource,
}

impl DenyReason {
    /// Returns a stable label for this reason.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmailNotVerified => "email_not_verified",
            Self::TenantMismatch => "tenant_mismatch",
            Self::NotOwner => "not_owner",
            Self::InsufficientRole => "insufficient_role",
            Self::ModuleDisabled => "module_disabled",
            Self::EditWindowExpired => "edit_window_expired",
            Self::MalformedResource => "malformed_resource",
        }
    }
}

/// Outcome of one policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyDecision {
    /// Attempt is permitted.
    Allow,
    /// Attempt is permitted and must be audited.
    AllowAudited(AuditReason),
    /// Attempt is refused.
    Deny(DenyReason),
}

impl PolicyDecision {
    /// Returns whether the attempt is permitted.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        !matches!(self, Self::Deny(_))
    }

    /// Returns the audit reason of an audited allow.
    #[must_use]
    pub fn audit_reason(&self) -> Option<AuditReason> {
        match self {
            Self::AllowAudited(reason) => Some(*reason),
            _ => None,
        }
    }

    /// Returns the deny reason of a denial.
    #[must_use]
    pub fn deny_reason(&self) -> Option<DenyReason> {
        match self {
            Self::Deny(reason) => Some(*reason),
            _ => None,
        }
    }
}

/// Pure decision function shared by the enforcement gateway and UI gating.
///
/// Evaluation order (first match wins):
/// 1. malformed resource -> deny
/// 2. global override (`superadmin`, `adminmaster` when global) -> allow,
///    writes only with a verified email
/// 3. email verification for collaborator-scoped writes
/// 4. scope rules: personal, profile, company-shared, financial
///
/// Company scoping is checked before roles and ownership so that a foreign
/// company always surfaces as [`DenyReason::TenantMismatch`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyEngine {
    config: PolicyConfig,
}

impl PolicyEngine {
    /// Creates an engine with explicit tunables.
    #[must_use]
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    /// Returns the active tunables.
    #[must_use]
    pub fn config(&self) -> PolicyConfig {
        self.config
    }

    /// Returns whether the principal may perform the action right now.
    #[must_use]
    pub fn can_perform(&self, principal: &Principal, action: Action, resource: &Resource) -> bool {
        self.evaluate(principal, action, resource).is_allowed()
    }

    /// Evaluates the attempt against the current clock.
    #[must_use]
    pub fn evaluate(
        &self,
        principal: &Principal,
        action: Action,
        resource: &Resource,
    ) -> PolicyDecision {
        self.evaluate_at(principal, action, resource, Utc::now())
    }

    /// Evaluates the attempt as of `now`.
    #[must_use]
    pub fn evaluate_at(
        &self,
        principal: &Principal,
        action: Action,
        resource: &Resource,
        now: DateTime<Utc>,
    ) -> PolicyDecision {
        let decision = self.decide(principal, action, resource, now);

        tracing::debug!(
            user_id = %principal.user_id(),
            role = principal.role().as_str(),
            action = action.as_str(),
            resource_kind = resource.kind().as_str(),
            decision = ?decision,
            "policy evaluated"
        );

        decision
    }

    /// Evaluates a company-wide report over every record of `kind`.
    ///
    /// Reports are lists across owners, so they need an elevated role on top
    /// of the company check.
    #[must_use]
    pub fn evaluate_report(
        &self,
        principal: &Principal,
        kind: ResourceKind,
        tenant_id: TenantId,
    ) -> PolicyDecision {
        let decision = self.decide_report(principal, kind, tenant_id);

        tracing::debug!(
            user_id = %principal.user_id(),
            role = principal.role().as_str(),
            resource_kind = kind.as_str(),
            tenant_id = %tenant_id,
            decision = ?decision,
            "report policy evaluated"
        );

        decision
    }

    /// Returns whether principal and resource share a company.
    #[must_use]
    pub fn same_tenant(principal: &Principal, resource: &Resource) -> bool {
        rules::same_company(principal, resource.tenant_id())
    }

    /// Returns whether the principal owns the resource.
    #[must_use]
    pub fn is_owner(principal: &Principal, resource: &Resource) -> bool {
        rules::is_owner(principal, resource.owner_user_id())
    }

    /// Returns whether the principal holds `gestor` or above.
    #[must_use]
    pub fn has_elevated_role(principal: &Principal) -> bool {
        principal.role().is_elevated()
    }

    /// Returns whether the resource is still inside the owner edit window.
    #[must_use]
    pub fn within_edit_window(&self, resource: &Resource, now: DateTime<Utc>) -> bool {
        rules::within_edit_window(resource.created_at(), now, self.config.edit_window)
    }

    /// Returns whether the principal's role skips the company check for `kind`.
    #[must_use]
    pub fn bypasses_tenant_scope(&self, principal: &Principal, kind: ResourceKind) -> bool {
        match principal.role() {
            Role::SuperAdmin => true,
            Role::AdminMaster => match self.config.admin_master_scope {
                AdminMasterScope::Global => true,
                AdminMasterScope::NonFinancial => kind.scope() != ResourceScope::Financial,
                AdminMasterScope::TenantBound => false,
            },
            Role::Colaborador | Role::Gestor | Role::Admin => false,
        }
    }

    fn has_global_override(&self, principal: &Principal) -> bool {
        match principal.role() {
            Role::SuperAdmin => true,
            Role::AdminMaster => self.config.admin_master_scope == AdminMasterScope::Global,
            Role::Colaborador | Role::Gestor | Role::Admin => false,
        }
    }

    // An unverified bypass role still reads across companies but writes only
    // inside its own.
    fn crosses_companies(&self, principal: &Principal, action: Action, kind: ResourceKind) -> bool {
        self.bypasses_tenant_scope(principal, kind)
            && (action.is_read() || principal.email_verified())
    }

    fn tenant_access(&self, principal: &Principal, action: Action, resource: &Resource) -> bool {
        self.crosses_companies(principal, action, resource.kind())
            || Self::same_tenant(principal, resource)
    }

    // Company-wide privileges need a company on the record unless the role
    // crosses company boundaries anyway.
    fn company_scoped(&self, principal: &Principal, action: Action, resource: &Resource) -> bool {
        match resource.tenant_id() {
            Some(_) => self.tenant_access(principal, action, resource),
            None => self.crosses_companies(principal, action, resource.kind()),
        }
    }

    fn decide(
        &self,
        principal: &Principal,
        action: Action,
        resource: &Resource,
        now: DateTime<Utc>,
    ) -> PolicyDecision {
        if resource.validate().is_err() {
            return PolicyDecision::Deny(DenyReason::MalformedResource);
        }

        if self.has_global_override(principal) && (action.is_read() || principal.email_verified())
        {
            return PolicyDecision::Allow;
        }

        if action.is_write()
            && resource.kind().requires_verified_email()
            && !principal.email_verified()
        {
            return PolicyDecision::Deny(DenyReason::EmailNotVerified);
        }

        match resource.kind().scope() {
            ResourceScope::Personal => self.decide_personal(principal, action, resource, now),
            ResourceScope::Profile => self.decide_profile(principal, action, resource),
            ResourceScope::Tenant => self.decide_shared(principal, action, resource),
            ResourceScope::Financial => self.decide_financial(principal, action, resource),
        }
    }

    fn decide_report(
        &self,
        principal: &Principal,
        kind: ResourceKind,
        tenant_id: TenantId,
    ) -> PolicyDecision {
        if self.has_global_override(principal) {
            return PolicyDecision::Allow;
        }

        let report = Resource::shared(kind, tenant_id);
        if !self.tenant_access(principal, Action::List, &report) {
            return PolicyDecision::Deny(DenyReason::TenantMismatch);
        }

        if !Self::has_elevated_role(principal) {
            return PolicyDecision::Deny(DenyReason::InsufficientRole);
        }

        match kind.module() {
            Some(module) if kind.scope() == ResourceScope::Tenant && !principal.has_module(module) => {
                PolicyDecision::Deny(DenyReason::ModuleDisabled)
            }
            _ => PolicyDecision::Allow,
        }
    }

    fn decide_personal(
        &self,
        principal: &Principal,
        action: Action,
        resource: &Resource,
        now: DateTime<Utc>,
    ) -> PolicyDecision {
        let owner = Self::is_owner(principal, resource);

        if resource.tenant_id().is_some() && !self.tenant_access(principal, action, resource) {
            return PolicyDecision::Deny(DenyReason::TenantMismatch);
        }

        match action {
            Action::Get | Action::List => {
                if owner {
                    PolicyDecision::Allow
                } else if self.company_scoped(principal, action, resource)
                    && Self::has_elevated_role(principal)
                {
                    PolicyDecision::Allow
                } else {
                    PolicyDecision::Deny(DenyReason::NotOwner)
                }
            }
            Action::Create => {
                if owner {
                    PolicyDecision::Allow
                } else {
                    PolicyDecision::Deny(DenyReason::NotOwner)
                }
            }
            Action::Update | Action::Delete => {
                self.decide_personal_edit(principal, action, owner, resource, now)
            }
        }
    }

    fn decide_personal_edit(
        &self,
        principal: &Principal,
        action: Action,
        owner: bool,
        resource: &Resource,
        now: DateTime<Utc>,
    ) -> PolicyDecision {
        if !resource.kind().has_edit_window() {
            return if owner {
                PolicyDecision::Allow
            } else {
                PolicyDecision::Deny(DenyReason::NotOwner)
            };
        }

        match resource.created_at() {
            Some(created_at) if created_at <= now => {}
            _ => return PolicyDecision::Deny(DenyReason::MalformedResource),
        }

        if self.within_edit_window(resource, now) {
            return if owner {
                PolicyDecision::Allow
            } else {
                PolicyDecision::Deny(DenyReason::NotOwner)
            };
        }

        if !self.company_scoped(principal, action, resource) {
            return PolicyDecision::Deny(DenyReason::TenantMismatch);
        }

        if Self::has_elevated_role(principal) {
            PolicyDecision::AllowAudited(AuditReason::ElevatedEditPastWindow)
        } else if owner {
            PolicyDecision::Deny(DenyReason::EditWindowExpired)
        } else {
            PolicyDecision::Deny(DenyReason::NotOwner)
        }
    }

    fn decide_profile(
        &self,
        principal: &Principal,
        action: Action,
        resource: &Resource,
    ) -> PolicyDecision {
        let is_self = Self::is_owner(principal, resource);

        if resource.tenant_id().is_some() && !self.tenant_access(principal, action, resource) {
            return PolicyDecision::Deny(DenyReason::TenantMismatch);
        }

        if is_self && matches!(action, Action::Get | Action::Create) {
            return PolicyDecision::Allow;
        }

        if !self.company_scoped(principal, action, resource) {
            return PolicyDecision::Deny(DenyReason::TenantMismatch);
        }

        let required = match action {
            Action::Get | Action::List | Action::Create | Action::Update => Role::Gestor,
            Action::Delete => Role::Admin,
        };

        if principal.role() >= required {
            PolicyDecision::Allow
        } else {
            PolicyDecision::Deny(DenyReason::InsufficientRole)
        }
    }

    fn decide_shared(
        &self,
        principal: &Principal,
        action: Action,
        resource: &Resource,
    ) -> PolicyDecision {
        if !self.tenant_access(principal, action, resource) {
            return PolicyDecision::Deny(DenyReason::TenantMismatch);
        }

        match resource.kind().module() {
            Some(module) if !principal.has_module(module) => {
                PolicyDecision::Deny(DenyReason::ModuleDisabled)
            }
            _ => PolicyDecision::Allow,
        }
    }

    fn decide_financial(
        &self,
        principal: &Principal,
        action: Action,
        resource: &Resource,
    ) -> PolicyDecision {
        if !self.tenant_access(principal, action, resource) {
            return PolicyDecision::Deny(DenyReason::TenantMismatch);
        }

        if Self::has_elevated_role(principal) {
            PolicyDecision::Allow
        } else {
            PolicyDecision::Deny(DenyReason::InsufficientRole)
        }
    }
}
