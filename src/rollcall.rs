//! Suite-wide status summary.
//!
//! One entry per catalog module, in catalog order, whether or not the module
//! is installed.

use crate::catalog::{ModuleId, RegistryCatalog};
use crate::presence::{ModulePresenceOracle, ResourceLocator};
use crate::resolver::resolve_version;
use serde::Serialize;
use std::fmt;

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "state", content = "version", rename_all = "lowercase")]
pub enum ModuleStatus {
    Missing,
    Installed(String),
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RollcallEntry {
    pub display_name: String,
    pub identifier: ModuleId,
    pub status: ModuleStatus,
}

impl fmt::Display for ModuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleStatus::Missing => f.write_str("missing"),
            ModuleStatus::Installed(version) => f.write_str(version),
        }
    }
}

impl fmt::Display for RollcallEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.display_name, self.status)
    }
}

/// Fold the catalog into one status entry per module.
pub fn summarize(
    catalog: &RegistryCatalog,
    oracle: &dyn ModulePresenceOracle,
    locator: &dyn ResourceLocator,
) -> Vec<RollcallEntry> {
    catalog
        .entries()
        .iter()
        .map(|descriptor| RollcallEntry {
            display_name: descriptor.display_name.clone(),
            identifier: descriptor.identifier.clone(),
            status: match resolve_version(descriptor, oracle, locator) {
                Some(version) => ModuleStatus::Installed(version),
                None => ModuleStatus::Missing,
            },
        })
        .collect()
}
