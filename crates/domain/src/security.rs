use std::str::FromStr;

use orbita_core::AppError;
use serde::{Deserialize, Serialize};

/// Stable audit actions emitted by application use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when the policy denies an attempt.
    AccessDenied,
    /// Emitted when an attempt crosses company boundaries.
    TenantAccessDenied,
    /// Emitted when a time entry is closed.
    TimeEntryClosed,
    /// Emitted when an elevated role corrects a time entry.
    TimeEntryCorrected,
    /// Emitted when a time entry is approved.
    TimeEntryApproved,
    /// Emitted when a time entry is rejected.
    TimeEntryRejected,
    /// Emitted when a user's role or company membership changes.
    ProfileRoleChanged,
    /// Emitted when a user's pay rules change.
    TimeSheetConfigChanged,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccessDenied => "security.access.denied",
            Self::TenantAccessDenied => "security.tenant.denied",
            Self::TimeEntryClosed => "ponto.entry.closed",
            Self::TimeEntryCorrected => "ponto.entry.corrected",
            Self::TimeEntryApproved => "ponto.entry.approved",
            Self::TimeEntryRejected => "ponto.entry.rejected",
            Self::ProfileRoleChanged => "profile.role.changed",
            Self::TimeSheetConfigChanged => "profile.time_sheet.changed",
        }
    }
}

impl FromStr for AuditAction {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "security.access.denied" => Ok(Self::AccessDenied),
            "security.tenant.denied" => Ok(Self::TenantAccessDenied),
            "ponto.entry.closed" => Ok(Self::TimeEntryClosed),
            "ponto.entry.corrected" => Ok(Self::TimeEntryCorrected),
            "ponto.entry.approved" => Ok(Self::TimeEntryApproved),
            "ponto.entry.rejected" => Ok(Self::TimeEntryRejected),
            "profile.role.changed" => Ok(Self::ProfileRoleChanged),
            "profile.time_sheet.changed" => Ok(Self::TimeSheetConfigChanged),
            _ => Err(AppError::Validation(format!(
                "unknown audit action value '{value}'"
            ))),
        }
    }
}

/// Sensitivity attached to security audit events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSeverity {
    /// Personal-data reads.
    Low,
    /// Company data and personal writes.
    Medium,
    /// Financial and administrative data.
    High,
}

impl AuditSeverity {
    /// Returns a stable storage value for this severity.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{AuditAction, AuditSeverity};

    #[test]
    fn audit_action_roundtrip_storage_value() {
        let action = AuditAction::TimeEntryCorrected;
        let restored = AuditAction::from_str(action.as_str());
        assert_eq!(restored.ok(), Some(action));
    }

    #[test]
    fn unknown_audit_action_is_rejected() {
        assert!(AuditAction::from_str("ponto.entry.unknown").is_err());
    }

    #[test]
    fn severities_are_ordered() {
        assert!(AuditSeverity::Low < AuditSeverity::Medium);
        assert!(AuditSeverity::Medium < AuditSeverity::High);
    }
}
