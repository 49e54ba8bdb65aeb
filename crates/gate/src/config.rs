//! Gate configuration loaded from TOML.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Abilities to define when a gate is built.
///
/// ```toml
/// [abilities]
/// view-dashboard = "DashboardPolicy@view"
/// export-reports = "ReportPolicy@export"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GateConfig {
    /// Ability name to `Type@method` reference.
    #[serde(default)]
    pub abilities: BTreeMap<String, String>,
}

impl GateConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml: &str) -> Result<Self> {
        toml::from_str(toml).map_err(|e| Error::Parse(e.to_string()))
    }
}
