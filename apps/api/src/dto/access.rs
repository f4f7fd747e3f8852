use std::str::FromStr;

use orbita_core::{AppError, TenantId};
use orbita_domain::{Action, Resource, ResourceKind, UserId};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::common::parse_timestamp;

/// Incoming payload asking whether an action would be allowed.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/access-check-request.ts"
)]
pub struct AccessCheckRequest {
    /// Stored collection name, e.g. `ponto_registros`.
    pub collection: String,
    pub action: String,
    pub owner_user_id: Option<String>,
    pub tenant_id: Option<String>,
    pub created_at: Option<String>,
}

impl AccessCheckRequest {
    /// Builds the policy view of the described record.
    pub fn to_resource(&self) -> Result<(Action, Resource), AppError> {
        let kind = ResourceKind::from_collection(self.collection.as_str())?;
        let action = Action::from_str(self.action.as_str())?;

        let mut resource = Resource::new(kind).with_tenant(TenantId::parse_optional(
            self.tenant_id.as_deref(),
        )?);
        if let Some(owner_user_id) = self.owner_user_id.as_deref() {
            resource = resource.with_owner(UserId::from_str(owner_user_id)?);
        }
        if let Some(created_at) = self.created_at.as_deref() {
            resource = resource.with_created_at(parse_timestamp("created_at", created_at)?);
        }

        Ok((action, resource))
    }
}

/// Advisory answer of the access gate.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/access-check-response.ts"
)]
pub struct AccessCheckResponse {
    /// One of `pending`, `redirect_to_login`, `access_denied`, `granted`.
    pub outcome: String,
    pub allowed: bool,
}
