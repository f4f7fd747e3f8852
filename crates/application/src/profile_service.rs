use std::sync::Arc;

use orbita_core::{AppError, AppResult, TenantId};
use orbita_domain::{
    Action, AuditAction, AuditSeverity, Principal, Resource, ResourceKind, Role, TimeSheetConfig,
    UserId,
};

use crate::audit_ports::append_best_effort;
use crate::{
    AuditEvent, AuditRepository, AuthorizationService, DenyReason, PrincipalCache,
    ProfileRepository, UserProfile,
};


/// Administration of user profiles: membership, role and pay rules.
#[derive(Clone)]
pub struct ProfileService {
    repository: Arc<dyn ProfileRepository>,
    cache: Arc<dyn PrincipalCache>,
    authorization: AuthorizationService,
    audit_repository: Arc<dyn AuditRepository>,
}

impl ProfileService {
    /// Creates a new profile service.
    #[must_use]
    pub fn new(
        repository: Arc<dyn ProfileRepository>,
        cache: Arc<dyn PrincipalCache>,
        authorization: AuthorizationService,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            repository,
            cache,
            authorization,
            audit_repository,
        }
    }

    /// Returns one profile.
    pub async fn get_profile(
        &self,
        principal: &Principal,
        user_id: UserId,
    ) -> AppResult<UserProfile> {
        let profile = self
            .repository
            .find_profile(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("profile for user '{user_id}'")))?;

        self.authorization
            .authorize(
                principal,
                Action::Get,
                &profile_resource(&profile),
                &user_id.to_string(),
            )
            .await?;

        Ok(profile)
    }

    /// Lists the members of a company; defaults to the principal's own.
    pub async fn list_profiles(
        &self,
        principal: &Principal,
        tenant_id: Option<TenantId>,
    ) -> AppResult<Vec<UserProfile>> {
        let tenant_id = tenant_id.or(principal.tenant_id()).ok_or_else(|| {
            AppError::Validation("a company is required to list profiles".to_owned())
        })?;

        self.authorization
            .authorize_report(principal, ResourceKind::UserProfile, tenant_id)
            .await?;

        self.repository.list_profiles(tenant_id).await
    }

    /// Sets the role and company of a user and drops their cached principal.
    ///
    /// Nobody grants a role above their own or edits someone who outranks
    /// them.
    pub async fn assign_role(
        &self,
        principal: &Principal,
        user_id: UserId,
        role: Role,
        tenant_id: Option<TenantId>,
    ) -> AppResult<UserProfile> {
        let mut profile = self
            .repository
            .find_profile(user_id)
            .await?
            .unwrap_or_else(|| UserProfile::new(user_id, Role::Colaborador, None));
        let resource_id = user_id.to_string();
        let current = profile_resource(&profile);

        self.authorization
            .authorize(principal, Action::Update, &current, &resource_id)
            .await?;

        if tenant_id != profile.tenant_id {
            let target = Resource::new(ResourceKind::UserProfile)
                .with_owner(user_id)
                .with_tenant(tenant_id);
            self.authorization
                .authorize(principal, Action::Update, &target, &resource_id)
                .await?;
        }

        if role > principal.role() || profile.role > principal.role() {
            return Err(self
                .authorization
                .deny(
                    principal,
                    Action::Update,
                    &current,
                    &resource_id,
                    DenyReason::InsufficientRole,
                )
                .await);
        }

        let previous_role = profile.role;
        profile.role = role;
        profile.tenant_id = tenant_id;
        if !profile.is_complete() {
            return Err(AppError::Validation(format!(
                "role '{role}' requires a company membership"
            )));
        }

        self.repository.save_profile(profile.clone()).await?;
        self.drop_cached_principal(user_id).await;

        tracing::info!(
            user_id = %user_id,
            previous_role = previous_role.as_str(),
            role = role.as_str(),
            changed_by = %principal.user_id(),
            "profile role changed"
        );

        append_best_effort(
            self.audit_repository.as_ref(),
            AuditEvent {
                tenant_id: profile.tenant_id,
                subject: principal.user_id().to_string(),
                action: AuditAction::ProfileRoleChanged,
                severity: AuditSeverity::High,
                resource_type: ResourceKind::UserProfile.as_str().to_owned(),
                resource_id,
                detail: Some(format!(
                    "role '{}' replaced by '{}'",
                    previous_role.as_str(),
                    role.as_str()
                )),
            },
        )
        .await;

        Ok(profile)
    }

    /// Replaces the pay rules applied to a user's future computations.
    ///
    /// Nobody sets their own pay rules or those of someone who outranks
    /// them.
    pub async fn update_time_sheet_config(
        &self,
        principal: &Principal,
        user_id: UserId,
        config: TimeSheetConfig,
    ) -> AppResult<UserProfile> {
        let mut profile = self
            .repository
            .find_profile(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("profile for user '{user_id}'")))?;
        let resource_id = user_id.to_string();
        let resource = profile_resource(&profile);

        self.authorization
            .authorize(principal, Action::Update, &resource, &resource_id)
            .await?;

        if principal.user_id() == user_id || profile.role > principal.role() {
            return Err(self
                .authorization
                .deny(
                    principal,
                    Action::Update,
                    &resource,
                    &resource_id,
                    DenyReason::InsufficientRole,
                )
                .await);
        }

        let previous = std::mem::replace(&mut profile.time_sheet, config);
        self.repository.save_profile(profile.clone()).await?;

        tracing::info!(
            user_id = %user_id,
            changed_by = %principal.user_id(),
            "profile pay rules changed"
        );

        append_best_effort(
            self.audit_repository.as_ref(),
            AuditEvent {
                tenant_id: profile.tenant_id,
                subject: principal.user_id().to_string(),
                action: AuditAction::TimeSheetConfigChanged,
                severity: AuditSeverity::High,
                resource_type: ResourceKind::UserProfile.as_str().to_owned(),
                resource_id,
                detail: Some(format!(
                    "hourly rate {} -> {}, tolerance {} -> {} min, lunch {}/{} -> {}/{} min",
                    previous.hourly_rate,
                    profile.time_sheet.hourly_rate,
                    previous.tolerance_minutes,
                    profile.time_sheet.tolerance_minutes,
                    previous.lunch_break_minutes,
                    previous.lunch_threshold_minutes,
                    profile.time_sheet.lunch_break_minutes,
                    profile.time_sheet.lunch_threshold_minutes
                )),
            },
        )
        .await;

        Ok(profile)
    }

    async fn drop_cached_principal(&self, user_id: UserId) {
        if let Err(error) = self.cache.invalidate(user_id).await {
            tracing::warn!(user_id = %user_id, error = %error, "principal cache invalidation failed");
        }
    }
}

fn profile_resource(profile: &UserProfile) -> Resource {
    Resource::new(ResourceKind::UserProfile)
        .with_owner(profile.user_id)
        .with_tenant(profile.tenant_id)
}
