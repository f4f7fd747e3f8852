//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod module;
mod principal;
mod resource;
mod role;
pub mod rules;
mod security;
mod time_sheet;
mod user;

pub use module::{ActiveModules, SystemModule};
pub use principal::Principal;
pub use resource::{Action, Resource, ResourceKind, ResourceScope};
pub use role::Role;
pub use security::{AuditAction, AuditSeverity};
pub use time_sheet::{
    GeoPoint, SessionComputation, SessionStatus, TimeSheetConfig, TimeSheetSession,
    TimeSheetSessionId, compute_session,
};
pub use user::{EmailAddress, UserId};
