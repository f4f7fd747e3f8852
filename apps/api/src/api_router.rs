use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use orbita_core::AppError;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

mod cors;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let protected_routes = Router::new()
        .route("/auth/me", get(handlers::auth::me_handler))
        .route(
            "/api/time-sheet/sessions",
            get(handlers::time_sheet::list_sessions_handler)
                .post(handlers::time_sheet::start_session_handler),
        )
        .route(
            "/api/time-sheet/sessions/{session_id}",
            put(handlers::time_sheet::correct_session_handler),
        )
        .route(
            "/api/time-sheet/sessions/{session_id}/close",
            post(handlers::time_sheet::close_session_handler),
        )
        .route(
            "/api/time-sheet/sessions/{session_id}/review",
            post(handlers::time_sheet::review_session_handler),
        )
        .route(
            "/api/time-sheet/preview",
            post(handlers::time_sheet::preview_handler),
        )
        .route(
            "/api/profiles",
            get(handlers::profiles::list_profiles_handler),
        )
        .route(
            "/api/profiles/{user_id}",
            get(handlers::profiles::get_profile_handler),
        )
        .route(
            "/api/profiles/{user_id}/role",
            put(handlers::profiles::assign_role_handler),
        )
        .route(
            "/api/profiles/{user_id}/time-sheet",
            put(handlers::profiles::update_time_sheet_config_handler),
        )
        .route_layer(from_fn_with_state(app_state.clone(), middleware::require_auth));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/logout", post(handlers::auth::logout_handler))
        .route(
            "/api/access/check",
            post(handlers::access::check_access_handler),
        )
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?)
        .with_state(app_state))
}
