use std::collections::BTreeSet;
use std::str::FromStr;

use orbita_core::AppError;
use serde::{Deserialize, Serialize};

/// Feature area a company has purchased or enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemModule {
    /// Time tracking.
    Ponto,
    /// Customer relationship management.
    Crm,
    /// Finance.
    Financeiro,
    /// Fleet and vehicle telemetry.
    Frota,
    /// Document storage.
    Documentos,
    /// Ticketing.
    Chamados,
}

impl SystemModule {
    /// Returns a stable storage value for this module.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ponto => "ponto",
            Self::Crm => "crm",
            Self::Financeiro => "financeiro",
            Self::Frota => "frota",
            Self::Documentos => "documentos",
            Self::Chamados => "chamados",
        }
    }

    /// Returns all known modules.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[SystemModule] = &[
            SystemModule::Ponto,
            SystemModule::Crm,
            SystemModule::Financeiro,
            SystemModule::Frota,
            SystemModule::Documentos,
            SystemModule::Chamados,
        ];

        ALL
    }
}

impl FromStr for SystemModule {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ponto" => Ok(Self::Ponto),
            "crm" => Ok(Self::Crm),
            "financeiro" => Ok(Self::Financeiro),
            "frota" => Ok(Self::Frota),
            "documentos" => Ok(Self::Documentos),
            "chamados" => Ok(Self::Chamados),
            _ => Err(AppError::Validation(format!(
                "unknown system module '{value}'"
            ))),
        }
    }
}

/// Set of modules enabled for a company (`sistemasAtivos`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActiveModules(BTreeSet<SystemModule>);

impl ActiveModules {
    /// Creates an empty module set.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Creates a set holding every known module.
    #[must_use]
    pub fn all() -> Self {
        SystemModule::all().iter().copied().collect()
    }

    /// Builds a set from stored values, skipping names this build does not know.
    ///
    /// Returns the set together with the skipped values so callers can log them.
    pub fn from_storage_values<I, S>(values: I) -> (Self, Vec<String>)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut modules = BTreeSet::new();
        let mut unknown = Vec::new();

        for value in values {
            match SystemModule::from_str(value.as_ref()) {
                Ok(module) => {
                    modules.insert(module);
                }
                Err(_) => unknown.push(value.as_ref().to_owned()),
            }
        }

        (Self(modules), unknown)
    }

    /// Returns whether the module is enabled.
    #[must_use]
    pub fn contains(&self, module: SystemModule) -> bool {
        self.0.contains(&module)
    }

    /// Returns whether no module is enabled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates enabled modules in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = SystemModule> + '_ {
        self.0.iter().copied()
    }

    /// Returns stable storage values for the enabled modules.
    #[must_use]
    pub fn storage_values(&self) -> Vec<String> {
        self.iter().map(|module| module.as_str().to_owned()).collect()
    }
}

impl FromIterator<SystemModule> for ActiveModules {
    fn from_iter<T: IntoIterator<Item = SystemModule>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
