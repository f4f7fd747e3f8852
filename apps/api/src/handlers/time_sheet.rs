use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use orbita_application::SessionFilter;
use orbita_core::TenantId;
use orbita_domain::{Principal, TimeSheetSessionId, UserId, compute_session};
use serde::Deserialize;

use crate::dto::{
    CloseSessionRequest, CorrectSessionRequest, ReviewSessionRequest, SessionResponse,
    StartSessionRequest, TimeSheetPreviewRequest, TimeSheetPreviewResponse, parse_timestamp,
};
use crate::error::ApiResult;
use crate::state::AppState;


#[derive(Debug, Default, Deserialize)]
pub struct SessionListQuery {
    pub tenant_id: Option<String>,
    pub owner_user_id: Option<String>,
    pub started_from: Option<String>,
    pub started_before: Option<String>,
    pub limit: Option<usize>,
}

impl SessionListQuery {
    fn to_filter(&self) -> ApiResult<SessionFilter> {
        Ok(SessionFilter {
            tenant_id: TenantId::parse_optional(self.tenant_id.as_deref())?,
            owner_user_id: self
                .owner_user_id
                .as_deref()
                .map(UserId::from_str)
                .transpose()?,
            started_from: self
                .started_from
                .as_deref()
                .map(|value| parse_timestamp("started_from", value))
                .transpose()?,
            started_before: self
                .started_before
                .as_deref()
                .map(|value| parse_timestamp("started_before", value))
                .transpose()?,
            limit: self.limit,
        })
    }
}

pub async fn list_sessions_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<SessionListQuery>,
) -> ApiResult<Json<Vec<SessionResponse>>> {
    let sessions = state
        .time_sheet_service
        .list_sessions(&principal, query.to_filter()?)
        .await?
        .into_iter()
        .map(SessionResponse::from)
        .collect();

    Ok(Json(sessions))
}

pub async fn start_session_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<StartSessionRequest>,
) -> ApiResult<(StatusCode, Json<SessionResponse>)> {
    let session = state
        .time_sheet_service
        .start_session(&principal, payload.location()?)
        .await?;

    Ok((StatusCode::CREATED, Json(SessionResponse::from(session))))
}

pub async fn close_session_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(session_id): Path<String>,
    Json(payload): Json<CloseSessionRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let session = state
        .time_sheet_service
        .close_session(
            &principal,
            TimeSheetSessionId::from_str(session_id.as_str())?,
            payload.location()?,
        )
        .await?;

    Ok(Json(SessionResponse::from(session)))
}

pub async fn review_session_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(session_id): Path<String>,
    Json(payload): Json<ReviewSessionRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let session = state
        .time_sheet_service
        .review_session(
            &principal,
            TimeSheetSessionId::from_str(session_id.as_str())?,
            payload.status()?,
        )
        .await?;

    Ok(Json(SessionResponse::from(session)))
}

pub async fn correct_session_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(session_id): Path<String>,
    Json(payload): Json<CorrectSessionRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let session = state
        .time_sheet_service
        .correct_session(
            &principal,
            TimeSheetSessionId::from_str(session_id.as_str())?,
            parse_timestamp("start", payload.start.as_str())?,
            parse_timestamp("end", payload.end.as_str())?,
        )
        .await?;

    Ok(Json(SessionResponse::from(session)))
}

pub async fn preview_handler(
    Json(payload): Json<TimeSheetPreviewRequest>,
) -> ApiResult<Json<TimeSheetPreviewResponse>> {
    let config = payload.config.to_domain()?;
    let computation = compute_session(payload.raw_duration_sec, &config);

    Ok(Json(TimeSheetPreviewResponse::from(computation)))
}
