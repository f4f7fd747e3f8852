use axum::Json;
use axum::extract::{Extension, State};
use axum::http::{HeaderMap, StatusCode};
use orbita_domain::Principal;

use crate::dto::PrincipalResponse;
use crate::error::ApiResult;
use crate::middleware::bearer_token;
use crate::state::AppState;

pub async fn me_handler(Extension(principal): Extension<Principal>) -> Json<PrincipalResponse> {
    Json(PrincipalResponse::from(&principal))
}

pub async fn logout_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    state
        .principal_resolver
        .logout(bearer_token(&headers))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
