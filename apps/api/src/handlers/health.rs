use axum::Json;

use crate::dto::HealthResponse;

/// Liveness check; never touches the database.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
