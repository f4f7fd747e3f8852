use std::fmt::{Display, Formatter};
use std::str::FromStr;

use orbita_core::AppError;
use serde::{Deserialize, Serialize};

/// Privilege level of a principal.
///
/// Variants are declared in ascending order of privilege so the derived
/// `Ord` is the role hierarchy: a higher role holds every capability of the
/// lower ones within the same tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Collaborator tracking their own time and tickets.
    Colaborador,
    /// Team manager; the first elevated role.
    Gestor,
    /// Company administrator.
    Admin,
    /// Administrator spanning several companies.
    AdminMaster,
    /// Platform operator with global access.
    SuperAdmin,
}

impl Role {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Colaborador => "colaborador",
            Self::Gestor => "gestor",
            Self::Admin => "admin",
            Self::AdminMaster => "adminmaster",
            Self::SuperAdmin => "superadmin",
        }
    }

    /// Returns all roles from least to most privileged.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Role] = &[
            Role::Colaborador,
            Role::Gestor,
            Role::Admin,
            Role::AdminMaster,
            Role::SuperAdmin,
        ];

        ALL
    }

    /// Returns whether this role may read and correct other members' data.
    #[must_use]
    pub fn is_elevated(&self) -> bool {
        *self >= Self::Gestor
    }

    /// Returns whether this role must belong to a company.
    #[must_use]
    pub fn requires_tenant(&self) -> bool {
        *self != Self::SuperAdmin
    }
}

impl Display for Role {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "colaborador" => Ok(Self::Colaborador),
            "gestor" => Ok(Self::Gestor),
            "admin" => Ok(Self::Admin),
            "adminmaster" => Ok(Self::AdminMaster),
            "superadmin" => Ok(Self::SuperAdmin),
            _ => Err(AppError::Validation(format!("unknown role value '{value}'"))),
        }
    }
}
