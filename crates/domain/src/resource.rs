//! Resource shapes evaluated by the access policy.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use orbita_core::{AppError, AppResult, TenantId};
use serde::{Deserialize, Serialize};

use crate::{AuditSeverity, SystemModule, UserId};

/// How a resource kind is partitioned for access decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceScope {
    /// Owned by one user; written only by the owner.
    Personal,
    /// A user's own profile record within the company directory.
    Profile,
    /// Shared by every member of a company.
    Tenant,
    /// Company finance records, restricted to elevated roles.
    Financial,
}

/// Kind of stored record, one per collection family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Clock-in/clock-out session (`ponto_*`).
    TimeEntry,
    /// Personal notification (`Notifications`).
    Notification,
    /// User profile (`users`).
    UserProfile,
    /// CRM lead or contact (`crm_*`).
    CrmRecord,
    /// Support ticket (`chamados*`).
    Ticket,
    /// Vehicle telemetry (`frota_*`).
    FleetTelemetry,
    /// Stored document (`documentos_*`).
    Document,
    /// Financial transaction (`financeiro_*`).
    FinancialRecord,
}

impl ResourceKind {
    /// Returns a stable storage value for this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TimeEntry => "time_entry",
            Self::Notification => "notification",
            Self::UserProfile => "user_profile",
            Self::CrmRecord => "crm_record",
            Self::Ticket => "ticket",
            Self::FleetTelemetry => "fleet_telemetry",
            Self::Document => "document",
            Self::FinancialRecord => "financial_record",
        }
    }

    /// Returns all known kinds.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[ResourceKind] = &[
            ResourceKind::TimeEntry,
            ResourceKind::Notification,
            ResourceKind::UserProfile,
            ResourceKind::CrmRecord,
            ResourceKind::Ticket,
            ResourceKind::FleetTelemetry,
            ResourceKind::Document,
            ResourceKind::FinancialRecord,
        ];

        ALL
    }

    /// Maps a document-store collection name to its family.
    pub fn from_collection(collection: &str) -> AppResult<Self> {
        let name = collection.trim();
        let kind = match name {
            "users" => Self::UserProfile,
            "Notifications" => Self::Notification,
            _ if name.starts_with("ponto_") => Self::TimeEntry,
            _ if name.starts_with("financeiro_") => Self::FinancialRecord,
            _ if name.starts_with("crm_") => Self::CrmRecord,
            _ if name.starts_with("chamados") => Self::Ticket,
            _ if name.starts_with("frota_") => Self::FleetTelemetry,
            _ if name.starts_with("documentos_") => Self::Document,
            _ => {
                return Err(AppError::Validation(format!(
                    "collection '{collection}' does not belong to a known family"
                )));
            }
        };

        Ok(kind)
    }

    /// Returns the partitioning scope.
    #[must_use]
    pub fn scope(&self) -> ResourceScope {
        match self {
            Self::TimeEntry | Self::Notification => ResourceScope::Personal,
            Self::UserProfile => ResourceScope::Profile,
            Self::CrmRecord | Self::Ticket | Self::FleetTelemetry | Self::Document => {
                ResourceScope::Tenant
            }
            Self::FinancialRecord => ResourceScope::Financial,
        }
    }

    /// Returns the module the kind belongs to.
    ///
    /// Only company-shared kinds are gated on it; personal and financial
    /// records follow ownership and role rules instead.
    #[must_use]
    pub fn module(&self) -> Option<SystemModule> {
        match self {
            Self::TimeEntry => Some(SystemModule::Ponto),
            Self::CrmRecord => Some(SystemModule::Crm),
            Self::Ticket => Some(SystemModule::Chamados),
            Self::FleetTelemetry => Some(SystemModule::Frota),
            Self::Document => Some(SystemModule::Documentos),
            Self::FinancialRecord => Some(SystemModule::Financeiro),
            Self::Notification | Self::UserProfile => None,
        }
    }

    /// Returns whether writes require a verified email (collaborator-scoped data).
    #[must_use]
    pub fn requires_verified_email(&self) -> bool {
        matches!(self, Self::TimeEntry | Self::Ticket)
    }

    /// Returns whether owner edits are limited to a window after recording.
    #[must_use]
    pub fn has_edit_window(&self) -> bool {
        matches!(self, Self::TimeEntry)
    }

    /// Returns the audit severity of a denied attempt on this kind.
    #[must_use]
    pub fn denial_severity(&self, action: Action) -> AuditSeverity {
        match self.scope() {
            ResourceScope::Financial | ResourceScope::Profile => AuditSeverity::High,
            ResourceScope::Tenant => AuditSeverity::Medium,
            ResourceScope::Personal if action.is_read() => AuditSeverity::Low,
            ResourceScope::Personal => AuditSeverity::Medium,
        }
    }
}

impl FromStr for ResourceKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown resource kind '{value}'")))
    }
}

/// Operation attempted on a resource, mirroring the document-store verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Read one record.
    Get,
    /// Query many records; reporting uses this.
    List,
    /// Create a record.
    Create,
    /// Modify an existing record.
    Update,
    /// Remove a record.
    Delete,
}

impl Action {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::List => "list",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// Returns all known actions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Action] = &[
            Action::Get,
            Action::List,
            Action::Create,
            Action::Update,
            Action::Delete,
        ];

        ALL
    }

    /// Returns whether the action only reads.
    #[must_use]
    pub fn is_read(&self) -> bool {
        matches!(self, Self::Get | Self::List)
    }

    /// Returns whether the action mutates state.
    #[must_use]
    pub fn is_write(&self) -> bool {
        !self.is_read()
    }

    /// Returns whether the action changes an already stored record.
    #[must_use]
    pub fn modifies_existing(&self) -> bool {
        matches!(self, Self::Update | Self::Delete)
    }
}

impl FromStr for Action {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|action| action.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown action '{value}'")))
    }
}

/// Generic stored record as seen by the policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    kind: ResourceKind,
    owner_user_id: Option<UserId>,
    tenant_id: Option<TenantId>,
    created_at: Option<DateTime<Utc>>,
}

impl Resource {
    /// Creates a resource with no ownership, company or timestamp.
    #[must_use]
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            owner_user_id: None,
            tenant_id: None,
            created_at: None,
        }
    }

    /// Creates a personal resource owned by `owner` inside `tenant_id`.
    #[must_use]
    pub fn personal(kind: ResourceKind, owner: UserId, tenant_id: Option<TenantId>) -> Self {
        Self::new(kind).with_owner(owner).with_tenant(tenant_id)
    }

    /// Creates a company-shared resource.
    #[must_use]
    pub fn shared(kind: ResourceKind, tenant_id: TenantId) -> Self {
        Self::new(kind).with_tenant(Some(tenant_id))
    }

    /// Sets the owner.
    #[must_use]
    pub fn with_owner(mut self, owner: UserId) -> Self {
        self.owner_user_id = Some(owner);
        self
    }

    /// Sets the company.
    #[must_use]
    pub fn with_tenant(mut self, tenant_id: Option<TenantId>) -> Self {
        self.tenant_id = tenant_id;
        self
    }

    /// Sets the moment the record was recorded.
    #[must_use]
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Returns the kind.
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Returns the owner, if any.
    #[must_use]
    pub fn owner_user_id(&self) -> Option<UserId> {
        self.owner_user_id
    }

    /// Returns the company, if any.
    #[must_use]
    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    /// Returns the recording timestamp, if any.
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    /// Checks that the fields the kind depends on are present.
    pub fn validate(&self) -> AppResult<()> {
        match self.kind.scope() {
            ResourceScope::Personal | ResourceScope::Profile if self.owner_user_id.is_none() => {
                Err(AppError::Validation(format!(
                    "{} requires an owner",
                    self.kind.as_str()
                )))
            }
            ResourceScope::Tenant | ResourceScope::Financial if self.tenant_id.is_none() => {
                Err(AppError::Validation(format!(
                    "{} requires a company",
                    self.kind.as_str()
                )))
            }
            _ => Ok(()),
        }
    }
}
