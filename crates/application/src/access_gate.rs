use chrono::{DateTime, Utc};
use orbita_domain::{Action, Principal, Resource};

use crate::PolicyEngine;

/// What the client knows about the current principal.
///
/// `Loading` is distinct from `Anonymous` so a slow profile read never
/// turns into a premature login redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrincipalState {
    /// Resolution is still in flight.
    Loading,
    /// No valid credential.
    Anonymous,
    /// Resolution finished with a principal.
    Authenticated(Principal),
}

impl PrincipalState {
    /// Returns the resolved principal, if any.
    #[must_use]
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Self::Authenticated(principal) => Some(principal),
            Self::Loading | Self::Anonymous => None,
        }
    }
}

/// What the UI should render for a gated view or control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateOutcome {
    /// Keep rendering a loading indicator.
    Pending,
    /// Send the user to the login page.
    RedirectToLogin,
    /// Show the generic "access denied" panel.
    AccessDenied,
    /// Render the gated content.
    Granted,
}

impl GateOutcome {
    /// Returns a stable label for this outcome.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::RedirectToLogin => "redirect_to_login",
            Self::AccessDenied => "access_denied",
            Self::Granted => "granted",
        }
    }

    /// Returns whether the gated content may be rendered.
    #[must_use]
    pub fn is_granted(&self) -> bool {
        *self == Self::Granted
    }
}

/// Client-side mirror of the enforcement gateway.
///
/// Evaluates the same [`PolicyEngine`] as the server so both sides agree;
/// its answer is advisory and never replaces server enforcement.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessGate {
    engine: PolicyEngine,
}

impl AccessGate {
    /// Creates a gate over the shared policy.
    #[must_use]
    pub fn new(engine: PolicyEngine) -> Self {
        Self { engine }
    }

    /// Decides what to render for the attempt right now.
    #[must_use]
    pub fn check(&self, state: &PrincipalState, action: Action, resource: &Resource) -> GateOutcome {
        self.check_at(state, action, resource, Utc::now())
    }

    /// Decides what to render for the attempt as of `now`.
    #[must_use]
    pub fn check_at(
        &self,
        state: &PrincipalState,
        action: Action,
        resource: &Resource,
        now: DateTime<Utc>,
    ) -> GateOutcome {
        match state {
            PrincipalState::Loading => GateOutcome::Pending,
            PrincipalState::Anonymous => GateOutcome::RedirectToLogin,
            PrincipalState::Authenticated(principal) => {
                if self
                    .engine
                    .evaluate_at(principal, action, resource, now)
                    .is_allowed()
                {
                    GateOutcome::Granted
                } else {
                    GateOutcome::AccessDenied
                }
            }
        }
    }

    /// Decides whether an authenticated-only page may render.
    #[must_use]
    pub fn check_session(&self, state: &PrincipalState) -> GateOutcome {
        match state {
            PrincipalState::Loading => GateOutcome::Pending,
            PrincipalState::Anonymous => GateOutcome::RedirectToLogin,
            PrincipalState::Authenticated(_) => GateOutcome::Granted,
        }
    }
}
