use chrono::{DateTime, Duration, Utc};
use orbita_core::TenantId;
use orbita_domain::{Action, Principal, Resource, ResourceKind, Role, SystemModule, UserId};
use proptest::prelude::*;

use super::{
    AdminMasterScope, AuditReason, DenyReason, PolicyConfig, PolicyDecision, PolicyEngine,
};

fn member(role: Role, tenant_id: TenantId) -> Principal {
    Principal::new(UserId::new(), role, Some(tenant_id))
        .with_email(None, true)
        .with_modules(SystemModule::all().iter().copied())
}

fn entry(owner: UserId, tenant_id: TenantId, recorded_at: DateTime<Utc>) -> Resource {
    Resource::personal(ResourceKind::TimeEntry, owner, Some(tenant_id)).with_created_at(recorded_at)
}

fn engine_with_scope(admin_master_scope: AdminMasterScope) -> PolicyEngine {
    PolicyEngine::new(PolicyConfig {
        admin_master_scope,
        ..PolicyConfig::default()
    })
}

#[test]
fn owner_edit_window_is_inclusive_at_five_minutes() {
    let engine = PolicyEngine::default();
    let tenant_id = TenantId::new();
    let principal = member(Role::Colaborador, tenant_id);
    let now = Utc::now();

    for (age, allowed) in [(299, true), (300, true), (301, false)] {
        let resource = entry(principal.user_id(), tenant_id, now - Duration::seconds(age));
        let decision = engine.evaluate_at(&principal, Action::Update, &resource, now);
        assert_eq!(decision.is_allowed(), allowed, "age {age}s");
    }

    let expired = entry(principal.user_id(), tenant_id, now - Duration::seconds(301));
    assert_eq!(
        engine.evaluate_at(&principal, Action::Delete, &expired, now),
        PolicyDecision::Deny(DenyReason::EditWindowExpired)
    );
}

#[test]
fn elevated_edit_past_window_is_audited() {
    let engine = PolicyEngine::default();
    let tenant_id = TenantId::new();
    let gestor = member(Role::Gestor, tenant_id);
    let now = Utc::now();
    let resource = entry(UserId::new(), tenant_id, now - Duration::hours(3));

    assert_eq!(
        engine.evaluate_at(&gestor, Action::Update, &resource, now),
        PolicyDecision::AllowAudited(AuditReason::ElevatedEditPastWindow)
    );
}

#[test]
fn elevated_cannot_edit_someone_elses_fresh_entry() {
    let engine = PolicyEngine::default();
    let tenant_id = TenantId::new();
    let admin = member(Role::Admin, tenant_id);
    let now = Utc::now();
    let resource = entry(UserId::new(), tenant_id, now - Duration::seconds(10));

    assert_eq!(
        engine.evaluate_at(&admin, Action::Update, &resource, now),
        PolicyDecision::Deny(DenyReason::NotOwner)
    );
}

#[test]
fn elevated_reads_personal_records_within_company_only() {
    let engine = PolicyEngine::default();
    let tenant_id = TenantId::new();
    let gestor = member(Role::Gestor, tenant_id);
    let colleague = member(Role::Colaborador, tenant_id);
    let now = Utc::now();

    let same_company = entry(UserId::new(), tenant_id, now);
    let other_company = entry(UserId::new(), TenantId::new(), now);

    assert!(engine.can_perform(&gestor, Action::List, &same_company));
    assert!(!engine.can_perform(&colleague, Action::Get, &same_company));
    assert_eq!(
        engine.evaluate_at(&gestor, Action::Get, &other_company, now),
        PolicyDecision::Deny(DenyReason::TenantMismatch)
    );
}

#[test]
fn windowed_edit_without_timestamp_is_denied() {
    let engine = PolicyEngine::default();
    let tenant_id = TenantId::new();
    let principal = member(Role::Colaborador, tenant_id);
    let now = Utc::now();

    let undated = Resource::personal(
        ResourceKind::TimeEntry,
        principal.user_id(),
        Some(tenant_id),
    );
    let future = entry(principal.user_id(), tenant_id, now + Duration::minutes(1));

    for resource in [undated, future] {
        assert_eq!(
            engine.evaluate_at(&principal, Action::Update, &resource, now),
            PolicyDecision::Deny(DenyReason::MalformedResource)
        );
    }
}

#[test]
fn shared_kind_without_company_is_malformed() {
    let engine = PolicyEngine::default();
    let superadmin = member(Role::SuperAdmin, TenantId::new());
    let resource = Resource::new(ResourceKind::CrmRecord);

    assert_eq!(
        engine.evaluate(&superadmin, Action::Get, &resource),
        PolicyDecision::Deny(DenyReason::MalformedResource)
    );
}

#[test]
fn unverified_collaborator_cannot_punch() {
    let engine = PolicyEngine::default();
    let tenant_id = TenantId::new();
    let principal = member(Role::Colaborador, tenant_id).with_email(None, false);
    let resource = entry(principal.user_id(), tenant_id, Utc::now());

    assert_eq!(
        engine.evaluate(&principal, Action::Create, &resource),
        PolicyDecision::Deny(DenyReason::EmailNotVerified)
    );
    assert!(engine.can_perform(&principal, Action::Get, &resource));
}

#[test]
fn superadmin_crosses_companies_but_writes_need_verified_email() {
    let engine = PolicyEngine::default();
    let superadmin = Principal::new(UserId::new(), Role::SuperAdmin, None).with_email(None, true);
    let unverified = Principal::new(UserId::new(), Role::SuperAdmin, None);
    let ticket = Resource::shared(ResourceKind::Ticket, TenantId::new());
    let finance = Resource::shared(ResourceKind::FinancialRecord, TenantId::new());

    assert!(engine.can_perform(&superadmin, Action::Delete, &finance));
    assert!(engine.can_perform(&superadmin, Action::Update, &ticket));
    assert!(engine.can_perform(&unverified, Action::Get, &ticket));
    assert_eq!(
        engine.evaluate(&unverified, Action::Update, &ticket),
        PolicyDecision::Deny(DenyReason::EmailNotVerified)
    );

    let foreign_profile = Resource::new(ResourceKind::UserProfile)
        .with_owner(UserId::new())
        .with_tenant(Some(TenantId::new()));
    for action in [Action::Create, Action::Update, Action::Delete] {
        assert_eq!(
            engine.evaluate(&unverified, action, &finance),
            PolicyDecision::Deny(DenyReason::TenantMismatch),
            "finance {action:?}"
        );
        assert_eq!(
            engine.evaluate(&unverified, action, &foreign_profile),
            PolicyDecision::Deny(DenyReason::TenantMismatch),
            "profile {action:?}"
        );
    }
    assert!(engine.can_perform(&unverified, Action::Get, &finance));
}

#[test]
fn unverified_adminmaster_writes_stay_in_own_company() {
    let tenant_id = TenantId::new();
    let unverified = Principal::new(UserId::new(), Role::AdminMaster, Some(tenant_id))
        .with_modules(SystemModule::all().iter().copied());
    let foreign_finance = Resource::shared(ResourceKind::FinancialRecord, TenantId::new());
    let foreign_profile = Resource::new(ResourceKind::UserProfile)
        .with_owner(UserId::new())
        .with_tenant(Some(TenantId::new()));
    let own_profile = Resource::new(ResourceKind::UserProfile)
        .with_owner(UserId::new())
        .with_tenant(Some(tenant_id));

    for scope in [AdminMasterScope::Global, AdminMasterScope::NonFinancial] {
        let engine = engine_with_scope(scope);
        assert_eq!(
            engine.evaluate(&unverified, Action::Update, &foreign_profile),
            PolicyDecision::Deny(DenyReason::TenantMismatch),
            "{scope:?}"
        );
        assert!(!engine.can_perform(&unverified, Action::Delete, &foreign_finance));
        assert!(engine.can_perform(&unverified, Action::Get, &foreign_profile));
        assert!(engine.can_perform(&unverified, Action::Update, &own_profile));
    }
}

#[test]
fn adminmaster_scope_controls_company_bypass() {
    let foreign_crm = Resource::shared(ResourceKind::CrmRecord, TenantId::new());
    let foreign_finance = Resource::shared(ResourceKind::FinancialRecord, TenantId::new());
    let adminmaster = member(Role::AdminMaster, TenantId::new());

    let non_financial = engine_with_scope(AdminMasterScope::NonFinancial);
    assert!(non_financial.can_perform(&adminmaster, Action::Update, &foreign_crm));
    assert_eq!(
        non_financial.evaluate(&adminmaster, Action::Get, &foreign_finance),
        PolicyDecision::Deny(DenyReason::TenantMismatch)
    );

    let tenant_bound = engine_with_scope(AdminMasterScope::TenantBound);
    assert!(!tenant_bound.can_perform(&adminmaster, Action::Get, &foreign_crm));

    let global = engine_with_scope(AdminMasterScope::Global);
    assert!(global.can_perform(&adminmaster, Action::Delete, &foreign_finance));
}

#[test]
fn disabled_module_blocks_shared_records() {
    let engine = PolicyEngine::default();
    let tenant_id = TenantId::new();
    let principal = Principal::new(UserId::new(), Role::Admin, Some(tenant_id))
        .with_email(None, true)
        .with_modules([SystemModule::Ponto]);
    let vehicle = Resource::shared(ResourceKind::FleetTelemetry, tenant_id);

    assert_eq!(
        engine.evaluate(&principal, Action::List, &vehicle),
        PolicyDecision::Deny(DenyReason::ModuleDisabled)
    );
}

#[test]
fn foreign_company_is_reported_before_role() {
    let engine = PolicyEngine::default();
    let tenant_id = TenantId::new();
    let colaborador = member(Role::Colaborador, tenant_id);
    let finance = Resource::shared(ResourceKind::FinancialRecord, TenantId::new());
    let own_finance = Resource::shared(ResourceKind::FinancialRecord, tenant_id);

    assert_eq!(
        engine.evaluate(&colaborador, Action::Get, &finance),
        PolicyDecision::Deny(DenyReason::TenantMismatch)
    );
    assert_eq!(
        engine.evaluate(&colaborador, Action::Get, &own_finance),
        PolicyDecision::Deny(DenyReason::InsufficientRole)
    );
}

#[test]
fn profiles_follow_self_and_role_rules() {
    let engine = PolicyEngine::default();
    let tenant_id = TenantId::new();
    let colaborador = member(Role::Colaborador, tenant_id);
    let gestor = member(Role::Gestor, tenant_id);
    let admin = member(Role::Admin, tenant_id);

    let own_profile = Resource::personal(
        ResourceKind::UserProfile,
        colaborador.user_id(),
        Some(tenant_id),
    );
    let colleague_profile =
        Resource::personal(ResourceKind::UserProfile, UserId::new(), Some(tenant_id));

    assert!(engine.can_perform(&colaborador, Action::Get, &own_profile));
    assert!(!engine.can_perform(&colaborador, Action::Update, &own_profile));
    assert!(!engine.can_perform(&colaborador, Action::Get, &colleague_profile));
    assert!(engine.can_perform(&gestor, Action::Update, &colleague_profile));
    assert_eq!(
        engine.evaluate(&gestor, Action::Delete, &colleague_profile),
        PolicyDecision::Deny(DenyReason::InsufficientRole)
    );
    assert!(engine.can_perform(&admin, Action::Delete, &colleague_profile));
}

#[test]
fn onboarding_principal_is_denied_company_data() {
    let engine = PolicyEngine::default();
    let principal = Principal::onboarding_default(UserId::new(), None, true);
    let document = Resource::shared(ResourceKind::Document, TenantId::new());
    let own_notification =
        Resource::personal(ResourceKind::Notification, principal.user_id(), None);

    assert!(!engine.can_perform(&principal, Action::Get, &document));
    assert!(engine.can_perform(&principal, Action::Update, &own_notification));
}

#[test]
fn notifications_are_editable_by_owner_at_any_time() {
    let engine = PolicyEngine::default();
    let tenant_id = TenantId::new();
    let owner = member(Role::Colaborador, tenant_id);
    let gestor = member(Role::Gestor, tenant_id);
    let notification = Resource::personal(
        ResourceKind::Notification,
        owner.user_id(),
        Some(tenant_id),
    )
    .with_created_at(Utc::now() - Duration::days(30));

    assert!(engine.can_perform(&owner, Action::Delete, &notification));
    assert!(!engine.can_perform(&gestor, Action::Delete, &notification));
}

#[test]
fn custom_edit_window_is_honoured() {
    let engine = PolicyEngine::new(PolicyConfig {
        edit_window: Duration::minutes(15),
        ..PolicyConfig::default()
    });
    let tenant_id = TenantId::new();
    let principal = member(Role::Colaborador, tenant_id);
    let now = Utc::now();
    let resource = entry(principal.user_id(), tenant_id, now - Duration::minutes(10));

    assert!(engine.evaluate_at(&principal, Action::Update, &resource, now).is_allowed());
}

#[test]
fn reports_need_elevated_role_in_the_same_company() {
    let engine = PolicyEngine::default();
    let tenant_id = TenantId::new();

    assert!(
        engine
            .evaluate_report(&member(Role::Gestor, tenant_id), ResourceKind::TimeEntry, tenant_id)
            .is_allowed()
    );
    assert_eq!(
        engine.evaluate_report(
            &member(Role::Colaborador, tenant_id),
            ResourceKind::TimeEntry,
            tenant_id
        ),
        PolicyDecision::Deny(DenyReason::InsufficientRole)
    );
    assert_eq!(
        engine.evaluate_report(
            &member(Role::Admin, TenantId::new()),
            ResourceKind::TimeEntry,
            tenant_id
        ),
        PolicyDecision::Deny(DenyReason::TenantMismatch)
    );
}

#[test]
fn adminmaster_scope_parses_configuration_values() {
    for scope in [
        AdminMasterScope::Global,
        AdminMasterScope::NonFinancial,
        AdminMasterScope::TenantBound,
    ] {
        assert_eq!(scope.as_str().parse::<AdminMasterScope>().ok(), Some(scope));
    }
    assert!("everything".parse::<AdminMasterScope>().is_err());
}

fn role_strategy() -> impl Strategy<Value = Role> {
    prop::sample::select(Role::all())
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop::sample::select(Action::all())
}

fn kind_strategy() -> impl Strategy<Value = ResourceKind> {
    prop::sample::select(ResourceKind::all())
}

fn scope_strategy() -> impl Strategy<Value = AdminMasterScope> {
    prop_oneof![
        Just(AdminMasterScope::Global),
        Just(AdminMasterScope::NonFinancial),
        Just(AdminMasterScope::TenantBound),
    ]
}

fn resource_for(
    kind: ResourceKind,
    owner: Option<UserId>,
    tenant_id: Option<TenantId>,
    recorded_at: DateTime<Utc>,
) -> Resource {
    let resource = Resource::new(kind)
        .with_tenant(tenant_id)
        .with_created_at(recorded_at);
    match owner {
        Some(owner) => resource.with_owner(owner),
        None => resource,
    }
}

proptest! {
    #[test]
    fn collaborators_never_reach_other_companies(
        kind in kind_strategy(),
        action in action_strategy(),
        owns_resource in any::<bool>(),
        age_secs in 0_i64..3_600,
    ) {
        let engine = PolicyEngine::default();
        let principal = member(Role::Colaborador, TenantId::new());
        let owner = if owns_resource { principal.user_id() } else { UserId::new() };
        let now = Utc::now();
        let resource = resource_for(
            kind,
            Some(owner),
            Some(TenantId::new()),
            now - Duration::seconds(age_secs),
        );

        prop_assert!(!engine.evaluate_at(&principal, action, &resource, now).is_allowed());
    }

    #[test]
    fn higher_roles_keep_every_permission(
        lower in role_strategy(),
        higher in role_strategy(),
        kind in kind_strategy(),
        action in action_strategy(),
        scope in scope_strategy(),
        owns_resource in any::<bool>(),
        has_tenant in any::<bool>(),
        verified in any::<bool>(),
        age_secs in 0_i64..1_000,
    ) {
        prop_assume!(lower < higher);

        let engine = engine_with_scope(scope);
        let tenant_id = TenantId::new();
        let user_id = UserId::new();
        let as_role = |role: Role| {
            Principal::new(user_id, role, Some(tenant_id))
                .with_email(None, verified)
                .with_modules(SystemModule::all().iter().copied())
        };
        let owner = if owns_resource { user_id } else { UserId::new() };
        let now = Utc::now();
        let resource = resource_for(
            kind,
            Some(owner),
            has_tenant.then_some(tenant_id),
            now - Duration::seconds(age_secs),
        );

        let lower_allowed = engine.evaluate_at(&as_role(lower), action, &resource, now).is_allowed();
        let higher_allowed = engine.evaluate_at(&as_role(higher), action, &resource, now).is_allowed();
        prop_assert!(!lower_allowed || higher_allowed);
    }

    #[test]
    fn financial_writes_need_gestor_or_above(
        role in role_strategy(),
        action in prop_oneof![Just(Action::Create), Just(Action::Update), Just(Action::Delete)],
    ) {
        let engine = PolicyEngine::default();
        let tenant_id = TenantId::new();
        let principal = member(role, tenant_id);
        let resource = Resource::shared(ResourceKind::FinancialRecord, tenant_id);

        prop_assert_eq!(
            engine.can_perform(&principal, action, &resource),
            role != Role::Colaborador
        );
    }

    #[test]
    fn collaborator_writes_fresh_entries_only_when_owner(
        owns_resource in any::<bool>(),
        age_secs in 0_i64..=300,
        action in prop_oneof![Just(Action::Update), Just(Action::Delete)],
    ) {
        let engine = PolicyEngine::default();
        let tenant_id = TenantId::new();
        let principal = member(Role::Colaborador, tenant_id);
        let owner = if owns_resource { principal.user_id() } else { UserId::new() };
        let now = Utc::now();
        let resource = entry(owner, tenant_id, now - Duration::seconds(age_secs));

        prop_assert_eq!(
            engine.evaluate_at(&principal, action, &resource, now).is_allowed(),
            owns_resource
        );
    }

    #[test]
    fn evaluation_is_deterministic(
        role in role_strategy(),
        kind in kind_strategy(),
        action in action_strategy(),
        same_company in any::<bool>(),
        age_secs in -60_i64..3_600,
    ) {
        let engine = PolicyEngine::default();
        let tenant_id = TenantId::new();
        let principal = member(role, tenant_id);
        let now = Utc::now();
        let resource = resource_for(
            kind,
            Some(principal.user_id()),
            Some(if same_company { tenant_id } else { TenantId::new() }),
            now - Duration::seconds(age_secs),
        );

        prop_assert_eq!(
            engine.evaluate_at(&principal, action, &resource, now),
            engine.evaluate_at(&principal, action, &resource, now)
        );
    }
}
