//! Module descriptors and the on-disk catalog override format.
//!
//! `ModuleDescriptor` is the static record behind every `hellas <alias> ...`
//! command. `CatalogFile` mirrors `schema/hellas_catalog.schema.json` so an
//! operator can replace the built-in suite without recompiling; use
//! `RegistryCatalog` for validation and lookup.

use crate::catalog::identity::{CommandAlias, ModuleId};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
/// How to address and display one module of the suite.
pub struct ModuleDescriptor {
    pub display_name: String,
    pub identifier: ModuleId,
    pub command_alias: CommandAlias,
    /// Only the aggregate root exposes the `rollcall` summary.
    pub aggregate_root: bool,
}

impl ModuleDescriptor {
    /// Descriptor addressed by its own identifier.
    pub fn new(display_name: impl Into<String>, identifier: impl Into<String>) -> Self {
        let identifier = ModuleId::new(identifier);
        Self {
            display_name: display_name.into(),
            command_alias: CommandAlias::from(&identifier),
            identifier,
            aggregate_root: false,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.command_alias = CommandAlias::new(alias);
        self
    }

    pub fn aggregate(mut self) -> Self {
        self.aggregate_root = true;
        self
    }
}

#[derive(Clone, Debug, Deserialize)]
/// Catalog override file as stored on disk.
pub struct CatalogFile {
    pub schema_version: String,
    pub modules: Vec<CatalogEntry>,
}

#[derive(Clone, Debug, Deserialize)]
/// One module row of a catalog override file.
pub struct CatalogEntry {
    pub display_name: String,
    pub identifier: ModuleId,
    #[serde(default)]
    pub command_alias: Option<CommandAlias>,
    #[serde(default)]
    pub aggregate_root: bool,
}

impl From<CatalogEntry> for ModuleDescriptor {
    fn from(entry: CatalogEntry) -> Self {
        let command_alias = entry
            .command_alias
            .unwrap_or_else(|| CommandAlias::from(&entry.identifier));
        Self {
            display_name: entry.display_name,
            identifier: entry.identifier,
            command_alias,
            aggregate_root: entry.aggregate_root,
        }
    }
}

/// Read and parse a catalog override from disk without additional validation.
pub fn load_catalog_from_path(path: &Path) -> Result<CatalogFile> {
    let data =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let catalog: CatalogFile =
        serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))?;
    Ok(catalog)
}

/// Descriptors of the Hellas suite, in rollcall order.
pub fn hellas_suite_descriptors() -> Vec<ModuleDescriptor> {
    vec![
        ModuleDescriptor::new("HellasAudio", "hellasaudio"),
        ModuleDescriptor::new("HellasBattlebuddy", "hellasbattlebuddy"),
        ModuleDescriptor::new("HellasControl", "hellascontrol"),
        ModuleDescriptor::new("HellasDeck", "hellasdeck"),
        ModuleDescriptor::new("HellasElo", "hellaselo"),
        ModuleDescriptor::new("HellasForms", "hellasforms"),
        ModuleDescriptor::new("HellasGardens", "hellasgardens"),
        ModuleDescriptor::new("HellasHelper", "hellashelper")
            .with_alias("helper")
            .aggregate(),
        ModuleDescriptor::new("HellasLibrary", "hellaslibrary"),
        ModuleDescriptor::new("HellasMineralogy", "hellasmineralogy"),
        ModuleDescriptor::new("HellasPatcher", "hellaspatcher"),
        ModuleDescriptor::new("HellasTextures", "hellastextures"),
        ModuleDescriptor::new("HellasWilds", "hellaswilds"),
    ]
}
