mod access;
mod auth;
mod common;
mod profiles;
mod time_sheet;

pub use access::{AccessCheckRequest, AccessCheckResponse};
pub use auth::PrincipalResponse;
pub use common::{HealthResponse, parse_timestamp};
pub use profiles::{AssignRoleRequest, ProfileResponse, TimeSheetConfigDto};
pub use time_sheet::{
    CloseSessionRequest, CorrectSessionRequest, GeoPointDto, ReviewSessionRequest,
    SessionResponse, StartSessionRequest, TimeSheetPreviewRequest, TimeSheetPreviewResponse,
};
