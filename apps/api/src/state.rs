use orbita_application::{AccessGate, PrincipalResolver, ProfileService, TimeSheetService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub principal_resolver: PrincipalResolver,
    pub access_gate: AccessGate,
    pub time_sheet_service: TimeSheetService,
    pub profile_service: ProfileService,
}
