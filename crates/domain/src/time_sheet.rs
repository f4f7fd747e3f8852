//! Time-sheet sessions and pay computation.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use orbita_core::{AppError, AppResult, TenantId};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Resource, ResourceKind, UserId};


const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 3_600;

/// Per-user rules applied when a session closes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSheetConfig {
    /// Rounding step in minutes; zero disables rounding.
    pub tolerance_minutes: i64,
    /// Minutes deducted for lunch once the threshold is reached.
    pub lunch_break_minutes: i64,
    /// Minimum worked minutes that trigger the lunch deduction.
    pub lunch_threshold_minutes: i64,
    /// Pay per hour; zero for monthly-salary employees.
    pub hourly_rate: Decimal,
}

/// Derived fields persisted on a closed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionComputation {
    /// Billable seconds after rounding and lunch deduction.
    pub adjusted_duration_sec: i64,
    /// Earnings rounded half-up to two decimal places.
    pub earnings: Decimal,
}

/// Turns a raw worked interval into billable seconds and earnings.
///
/// Pure and deterministic. Negative configuration values count as zero.
#[must_use]
pub fn compute_session(raw_duration_sec: i64, config: &TimeSheetConfig) -> SessionComputation {
    if raw_duration_sec <= 0 {
        return SessionComputation {
            adjusted_duration_sec: 0,
            earnings: Decimal::ZERO,
        };
    }

    let tolerance_minutes = config.tolerance_minutes.max(0);
    let lunch_break_minutes = config.lunch_break_minutes.max(0);
    let lunch_threshold_minutes = config.lunch_threshold_minutes.max(0);
    let hourly_rate = config.hourly_rate.max(Decimal::ZERO);

    let mut adjusted = raw_duration_sec;

    if tolerance_minutes > 0 {
        let step = tolerance_minutes.saturating_mul(SECONDS_PER_MINUTE);
        adjusted = round_half_up_to_step(adjusted, step);
    }

    if lunch_threshold_minutes > 0
        && lunch_break_minutes > 0
        && adjusted >= lunch_threshold_minutes.saturating_mul(SECONDS_PER_MINUTE)
    {
        adjusted = adjusted
            .saturating_sub(lunch_break_minutes.saturating_mul(SECONDS_PER_MINUTE))
            .max(0);
    }

    SessionComputation {
        adjusted_duration_sec: adjusted,
        earnings: earnings_for(adjusted, hourly_rate),
    }
}

fn round_half_up_to_step(value: i64, step: i64) -> i64 {
    let quotient = value / step;
    let remainder = value % step;
    let rounded_quotient = if remainder.saturating_mul(2) >= step {
        quotient.saturating_add(1)
    } else {
        quotient
    };

    rounded_quotient.saturating_mul(step)
}

fn earnings_for(adjusted_duration_sec: i64, hourly_rate: Decimal) -> Decimal {
    Decimal::from(adjusted_duration_sec)
        .checked_mul(hourly_rate)
        .and_then(|total| total.checked_div(Decimal::from(SECONDS_PER_HOUR)))
        .unwrap_or(Decimal::MAX)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Unique identifier for a time-sheet session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSheetSessionId(Uuid);

impl TimeSheetSessionId {
    /// Creates a new random session identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a session identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for TimeSheetSessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TimeSheetSessionId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for TimeSheetSessionId {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value.trim()).map(Self).map_err(|error| {
            AppError::Validation(format!("invalid time-sheet session id '{value}': {error}"))
        })
    }
}

/// Review status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Awaiting review; still mutable by its owner.
    Pending,
    /// Accepted for payroll.
    Approved,
    /// Refused by a reviewer.
    Rejected,
}

impl SessionStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl FromStr for SessionStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(AppError::Validation(format!(
                "unknown session status '{value}'"
            ))),
        }
    }
}

/// Geographic position captured at clock-in or clock-out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Creates a validated position in decimal degrees.
    pub fn new(latitude: f64, longitude: f64) -> AppResult<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(AppError::Validation(format!(
                "latitude {latitude} is outside [-90, 90]"
            )));
        }

        if !(-180.0..=180.0).contains(&longitude) {
            return Err(AppError::Validation(format!(
                "longitude {longitude} is outside [-180, 180]"
            )));
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Returns the latitude.
    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Returns the longitude.
    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// One work shift of a collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSheetSession {
    /// Stable session id.
    pub id: TimeSheetSessionId,
    /// Company the shift was worked for.
    pub tenant_id: TenantId,
    /// Collaborator who worked the shift.
    pub owner_user_id: UserId,
    /// Clock-in.
    pub start: DateTime<Utc>,
    /// Clock-out; `None` while the shift is open.
    pub end: Option<DateTime<Utc>>,
    /// Billable seconds, set on close.
    pub duration_sec: Option<i64>,
    /// Earnings, set on close.
    pub earnings: Option<Decimal>,
    /// Review status.
    pub status: SessionStatus,
    /// Position at clock-in.
    pub location_start: Option<GeoPoint>,
    /// Position at clock-out.
    pub location_end: Option<GeoPoint>,
    /// Record creation time.
    pub created_at: DateTime<Utc>,
}

impl TimeSheetSession {
    /// Opens a pending session starting at `start`.
    #[must_use]
    pub fn open(
        tenant_id: TenantId,
        owner_user_id: UserId,
        start: DateTime<Utc>,
        location_start: Option<GeoPoint>,
    ) -> Self {
        Self {
            id: TimeSheetSessionId::new(),
            tenant_id,
            owner_user_id,
            start,
            end: None,
            duration_sec: None,
            earnings: None,
            status: SessionStatus::Pending,
            location_start,
            location_end: None,
            created_at: start,
        }
    }

    /// Returns whether the shift has not been closed yet.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// Returns the moment the session was last recorded: clock-out once
    /// closed, clock-in while open. Owner edit windows start here.
    #[must_use]
    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.end.unwrap_or(self.start)
    }

    /// Returns the policy view of this session.
    #[must_use]
    pub fn as_resource(&self) -> Resource {
        Resource::personal(
            ResourceKind::TimeEntry,
            self.owner_user_id,
            Some(self.tenant_id),
        )
        .with_created_at(self.recorded_at())
    }

    /// Records the clock-out and the derived fields.
    pub fn close(
        &mut self,
        end: DateTime<Utc>,
        location_end: Option<GeoPoint>,
        config: &TimeSheetConfig,
    ) -> AppResult<SessionComputation> {
        if !self.is_open() {
            return Err(AppError::Conflict(format!(
                "time-sheet session '{}' is already closed",
                self.id
            )));
        }

        let computation = self.apply_interval(self.start, end, config)?;
        self.location_end = location_end;
        Ok(computation)
    }

    /// Replaces the recorded interval and recomputes the derived fields.
    ///
    /// The corrected end may not lie after `now`.
    pub fn correct(
        &mut self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        now: DateTime<Utc>,
        config: &TimeSheetConfig,
    ) -> AppResult<SessionComputation> {
        if end > now {
            return Err(AppError::Validation(format!(
                "corrected end '{}' lies in the future",
                end.to_rfc3339()
            )));
        }

        self.apply_interval(start, end, config)
    }

    /// Moves a closed pending session to its final review status.
    pub fn review(&mut self, status: SessionStatus) -> AppResult<()> {
        if status == SessionStatus::Pending {
            return Err(AppError::Validation(
                "review must approve or reject the session".to_owned(),
            ));
        }

        if self.is_open() {
            return Err(AppError::Conflict(format!(
                "time-sheet session '{}' is still open",
                self.id
            )));
        }

        if self.status != SessionStatus::Pending {
            return Err(AppError::Conflict(format!(
                "time-sheet session '{}' was already reviewed",
                self.id
            )));
        }

        self.status = status;
        Ok(())
    }

    fn apply_interval(
        &mut self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        config: &TimeSheetConfig,
    ) -> AppResult<SessionComputation> {
        if end < start {
            return Err(AppError::Validation(
                "session end must not precede its start".to_owned(),
            ));
        }

        let computation = compute_session((end - start).num_seconds(), config);
        self.start = start;
        self.end = Some(end);
        self.duration_sec = Some(computation.adjusted_duration_sec);
        self.earnings = Some(computation.earnings);
        Ok(computation)
    }
}
