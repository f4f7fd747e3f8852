//! Application services and ports.

#![forbid(unsafe_code)]

mod access_gate;
mod audit_ports;
mod authorization_service;
mod policy_engine;
mod principal_ports;
mod principal_resolver;
mod profile_service;
mod time_sheet_ports;
mod time_sheet_service;

pub use access_gate::{AccessGate, GateOutcome, PrincipalState};
pub use audit_ports::{AuditEvent, AuditRepository};
pub use authorization_service::{ACCESS_DENIED_MESSAGE, AuthorizationService};
pub use policy_engine::{
    AdminMasterScope, AuditReason, DenyReason, PolicyConfig, PolicyDecision, PolicyEngine,
};
pub use principal_ports::{IdentityProvider, PrincipalCache, ProfileRepository, UserProfile};
pub use principal_resolver::{PrincipalResolver, RetryPolicy};
pub use profile_service::ProfileService;
pub use time_sheet_ports::{SessionQuery, TimeSheetRepository};
pub use time_sheet_service::{
    DEFAULT_SESSION_LIST_LIMIT, MAX_SESSION_LIST_LIMIT, SessionFilter, TimeSheetService,
};
