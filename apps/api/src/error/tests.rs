use axum::http::StatusCode;
use axum::response::IntoResponse;
use orbita_core::AppError;

use super::ApiError;

#[test]
fn error_categories_map_to_status_codes() {
    let cases = [
        (AppError::Validation("bad".to_owned()), StatusCode::BAD_REQUEST),
        (AppError::NotFound("gone".to_owned()), StatusCode::NOT_FOUND),
        (AppError::Conflict("open".to_owned()), StatusCode::CONFLICT),
        (AppError::Unauthorized("token".to_owned()), StatusCode::UNAUTHORIZED),
        (AppError::Forbidden("role".to_owned()), StatusCode::FORBIDDEN),
        (AppError::TenantMismatch("tenant".to_owned()), StatusCode::FORBIDDEN),
        (AppError::Unavailable("db".to_owned()), StatusCode::SERVICE_UNAVAILABLE),
        (AppError::Internal("bug".to_owned()), StatusCode::INTERNAL_SERVER_ERROR),
    ];

    for (error, expected) in cases {
        assert_eq!(ApiError(error).into_response().status(), expected);
    }
}

#[test]
fn denials_share_one_generic_message() {
    let forbidden = ApiError(AppError::Forbidden("insufficient_role on ticket".to_owned()));
    let mismatch = ApiError(AppError::TenantMismatch("company 42".to_owned()));

    assert_eq!(forbidden.message(), "access denied");
    assert_eq!(mismatch.message(), "access denied");
}

#[test]
fn internal_details_stay_out_of_the_payload() {
    let error = ApiError(AppError::Internal("password=hunter2".to_owned()));
    assert_eq!(error.message(), "internal error");
}
