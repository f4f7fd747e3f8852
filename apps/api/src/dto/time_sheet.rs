use std::str::FromStr;

use orbita_core::AppError;
use orbita_domain::{GeoPoint, SessionComputation, SessionStatus, TimeSheetSession};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::profiles::TimeSheetConfigDto;

/// Latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/geo-point.ts"
)]
pub struct GeoPointDto {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPointDto {
    pub fn to_domain(self) -> Result<GeoPoint, AppError> {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

impl From<GeoPoint> for GeoPointDto {
    fn from(value: GeoPoint) -> Self {
        Self {
            latitude: value.latitude(),
            longitude: value.longitude(),
        }
    }
}

fn optional_point(location: Option<GeoPointDto>) -> Result<Option<GeoPoint>, AppError> {
    location.map(GeoPointDto::to_domain).transpose()
}

/// Incoming payload for clock-in.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/start-session-request.ts"
)]
pub struct StartSessionRequest {
    pub location: Option<GeoPointDto>,
}

impl StartSessionRequest {
    pub fn location(&self) -> Result<Option<GeoPoint>, AppError> {
        optional_point(self.location)
    }
}

/// Incoming payload for clock-out.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/close-session-request.ts"
)]
pub struct CloseSessionRequest {
    pub location: Option<GeoPointDto>,
}

impl CloseSessionRequest {
    pub fn location(&self) -> Result<Option<GeoPoint>, AppError> {
        optional_point(self.location)
    }
}

/// Incoming payload for approving or rejecting a session.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/review-session-request.ts"
)]
pub struct ReviewSessionRequest {
    /// `approved` or `rejected`.
    pub status: String,
}

impl ReviewSessionRequest {
    pub fn status(&self) -> Result<SessionStatus, AppError> {
        SessionStatus::from_str(self.status.trim())
    }
}

/// Incoming payload replacing a session interval.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/correct-session-request.ts"
)]
pub struct CorrectSessionRequest {
    pub start: String,
    pub end: String,
}

/// API representation of a time-sheet session.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/session-response.ts"
)]
pub struct SessionResponse {
    pub id: String,
    pub tenant_id: String,
    pub owner_user_id: String,
    pub start: String,
    pub end: Option<String>,
    pub duration_sec: Option<i64>,
    /// Decimal amount with two places.
    pub earnings: Option<String>,
    pub status: String,
    pub location_start: Option<GeoPointDto>,
    pub location_end: Option<GeoPointDto>,
}

impl From<TimeSheetSession> for SessionResponse {
    fn from(value: TimeSheetSession) -> Self {
        Self {
            id: value.id.to_string(),
            tenant_id: value.tenant_id.to_string(),
            owner_user_id: value.owner_user_id.to_string(),
            start: value.start.to_rfc3339(),
            end: value.end.map(|end| end.to_rfc3339()),
            duration_sec: value.duration_sec,
            earnings: value.earnings.map(|earnings| earnings.to_string()),
            status: value.status.as_str().to_owned(),
            location_start: value.location_start.map(GeoPointDto::from),
            location_end: value.location_end.map(GeoPointDto::from),
        }
    }
}

/// Incoming payload for a calculator preview.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/time-sheet-preview-request.ts"
)]
pub struct TimeSheetPreviewRequest {
    pub raw_duration_sec: i64,
    pub config: TimeSheetConfigDto,
}

/// Calculator output.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/time-sheet-preview-response.ts"
)]
pub struct TimeSheetPreviewResponse {
    pub adjusted_duration_sec: i64,
    pub earnings: String,
}

impl From<SessionComputation> for TimeSheetPreviewResponse {
    fn from(value: SessionComputation) -> Self {
        Self {
            adjusted_duration_sec: value.adjusted_duration_sec,
            earnings: value.earnings.to_string(),
        }
    }
}
