use std::str::FromStr;

use orbita_application::UserProfile;
use orbita_core::AppError;
use orbita_domain::TimeSheetConfig;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Pay rules of a collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/time-sheet-config.ts"
)]
pub struct TimeSheetConfigDto {
    pub tolerance_minutes: i64,
    pub lunch_break_minutes: i64,
    pub lunch_threshold_minutes: i64,
    /// Decimal amount per hour, e.g. `"25.50"`.
    pub hourly_rate: String,
}

impl TimeSheetConfigDto {
    pub fn to_domain(&self) -> Result<TimeSheetConfig, AppError> {
        let hourly_rate = match self.hourly_rate.trim() {
            "" => Decimal::ZERO,
            value => Decimal::from_str(value).map_err(|error| {
                AppError::Validation(format!("invalid hourly_rate '{value}': {error}"))
            })?,
        };

        Ok(TimeSheetConfig {
            tolerance_minutes: self.tolerance_minutes,
            lunch_break_minutes: self.lunch_break_minutes,
            lunch_threshold_minutes: self.lunch_threshold_minutes,
            hourly_rate,
        })
    }
}

impl From<&TimeSheetConfig> for TimeSheetConfigDto {
    fn from(value: &TimeSheetConfig) -> Self {
        Self {
            tolerance_minutes: value.tolerance_minutes,
            lunch_break_minutes: value.lunch_break_minutes,
            lunch_threshold_minutes: value.lunch_threshold_minutes,
            hourly_rate: value.hourly_rate.to_string(),
        }
    }
}

/// API representation of a user profile.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/profile-response.ts"
)]
pub struct ProfileResponse {
    pub user_id: String,
    pub display_name: Option<String>,
    pub role: String,
    pub tenant_id: Option<String>,
    pub active_modules: Vec<String>,
    pub time_sheet: TimeSheetConfigDto,
}

impl From<UserProfile> for ProfileResponse {
    fn from(value: UserProfile) -> Self {
        Self {
            user_id: value.user_id.to_string(),
            display_name: value.display_name,
            role: value.role.as_str().to_owned(),
            tenant_id: value.tenant_id.map(|tenant_id| tenant_id.to_string()),
            active_modules: value.active_modules.storage_values(),
            time_sheet: TimeSheetConfigDto::from(&value.time_sheet),
        }
    }
}

/// Incoming payload for role assignment.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/assign-role-request.ts"
)]
pub struct AssignRoleRequest {
    pub role: String,
    pub tenant_id: Option<String>,
}
