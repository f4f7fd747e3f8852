use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use orbita_core::TenantId;
use orbita_domain::{Principal, Role, UserId};
use serde::Deserialize;

use crate::dto::{AssignRoleRequest, ProfileResponse, TimeSheetConfigDto};
use crate::error::ApiResult;
use crate::state::AppState;


#[derive(Debug, Default, Deserialize)]
pub struct ProfileListQuery {
    pub tenant_id: Option<String>,
}

pub async fn list_profiles_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<ProfileListQuery>,
) -> ApiResult<Json<Vec<ProfileResponse>>> {
    let tenant_id = TenantId::parse_optional(query.tenant_id.as_deref())?;
    let profiles = state
        .profile_service
        .list_profiles(&principal, tenant_id)
        .await?
        .into_iter()
        .map(ProfileResponse::from)
        .collect();

    Ok(Json(profiles))
}

pub async fn get_profile_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<ProfileResponse>> {
    let profile = state
        .profile_service
        .get_profile(&principal, UserId::from_str(user_id.as_str())?)
        .await?;

    Ok(Json(ProfileResponse::from(profile)))
}

pub async fn assign_role_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<String>,
    Json(payload): Json<AssignRoleRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    let profile = state
        .profile_service
        .assign_role(
            &principal,
            UserId::from_str(user_id.as_str())?,
            Role::from_str(payload.role.trim())?,
            TenantId::parse_optional(payload.tenant_id.as_deref())?,
        )
        .await?;

    Ok(Json(ProfileResponse::from(profile)))
}

pub async fn update_time_sheet_config_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<String>,
    Json(payload): Json<TimeSheetConfigDto>,
) -> ApiResult<Json<ProfileResponse>> {
    let profile = state
        .profile_service
        .update_time_sheet_config(
            &principal,
            UserId::from_str(user_id.as_str())?,
            payload.to_domain()?,
        )
        .await?;

    Ok(Json(ProfileResponse::from(profile)))
}
