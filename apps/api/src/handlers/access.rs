use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use orbita_application::PrincipalState;
use orbita_core::AppError;

use crate::dto::{AccessCheckRequest, AccessCheckResponse};
use crate::error::ApiResult;
use crate::middleware::bearer_token;
use crate::state::AppState;


/// Answers what the UI should render for an attempt. Advisory only: every
/// write is authorized again by the services.
pub async fn check_access_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<AccessCheckRequest>,
) -> ApiResult<Json<AccessCheckResponse>> {
    let (action, resource) = payload.to_resource()?;

    let principal_state = match bearer_token(&headers) {
        None => PrincipalState::Anonymous,
        Some(token) => match state.principal_resolver.resolve(Some(token)).await {
            Ok(principal) => PrincipalState::Authenticated(principal),
            Err(AppError::Unauthorized(_)) => PrincipalState::Anonymous,
            Err(error) => return Err(error.into()),
        },
    };

    let outcome = state
        .access_gate
        .check(&principal_state, action, &resource);

    Ok(Json(AccessCheckResponse {
        outcome: outcome.as_str().to_owned(),
        allowed: outcome.is_granted(),
    }))
}
