use orbita_domain::Principal;
use serde::Serialize;
use ts_rs::TS;

/// API representation of the resolved principal.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/principal-response.ts"
)]
pub struct PrincipalResponse {
    pub user_id: String,
    pub email: Option<String>,
    pub email_verified: bool,
    pub role: String,
    pub tenant_id: Option<String>,
    pub active_modules: Vec<String>,
    pub elevated: bool,
}

impl From<&Principal> for PrincipalResponse {
    fn from(value: &Principal) -> Self {
        Self {
            user_id: value.user_id().to_string(),
            email: value.email().map(|email| email.as_str().to_owned()),
            email_verified: value.email_verified(),
            role: value.role().as_str().to_owned(),
            tenant_id: value.tenant_id().map(|tenant_id| tenant_id.to_string()),
            active_modules: value.active_modules().storage_values(),
            elevated: value.role().is_elevated(),
        }
    }
}
