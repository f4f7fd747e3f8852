use serde::{Deserialize, Serialize};

/// Verified credential handed over by the external identity provider.
///
/// Carries only what the provider vouches for; role and company membership
/// live in the mutable profile record and are resolved separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    subject: String,
    email: Option<String>,
    email_verified: bool,
}

impl UserIdentity {
    /// Creates a user identity from authentication data.
    #[must_use]
    pub fn new(subject: impl Into<String>, email: Option<String>, email_verified: bool) -> Self {
        Self {
            subject: subject.into(),
            email,
            email_verified,
        }
    }

    /// Returns the stable subject claim from the identity provider.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the email, if the provider returned one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns whether the provider confirmed ownership of the email.
    #[must_use]
    pub fn email_verified(&self) -> bool {
        self.email_verified
    }
}
