//! Validated, ordered registry of module descriptors.
//!
//! The registry is built once and never mutated. It is strict about duplicate
//! identifiers, duplicate aliases, and competing aggregate roots so the
//! command table and the rollcall cannot silently shadow a module. Lookups are
//! linear; the suite is a dozen entries.

use crate::catalog::identity::is_valid_token;
use crate::catalog::model::{ModuleDescriptor, hellas_suite_descriptors, load_catalog_from_path};
use crate::catalog::{CommandAlias, ModuleId};
use crate::schema_loader::{CATALOG_SCHEMA, load_embedded_schema, validate_instance};
use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Clone, Debug)]
/// Ordered module descriptors plus the invariants the command surface relies on.
pub struct RegistryCatalog {
    entries: Vec<ModuleDescriptor>,
}

impl RegistryCatalog {
    /// Validate descriptors and freeze them in the given order.
    pub fn new(entries: Vec<ModuleDescriptor>) -> Result<Self> {
        validate_entries(&entries)?;
        Ok(Self { entries })
    }

    /// The built-in Hellas suite.
    pub fn hellas_suite() -> Self {
        Self {
            entries: hellas_suite_descriptors(),
        }
    }

    /// Load a catalog override file.
    ///
    /// The file is checked against the embedded schema first so operators
    /// get every structural problem at once, then against the registry
    /// invariants.
    pub fn load(path: &Path) -> Result<Self> {
        validate_against_schema(path)?;
        let file =
            load_catalog_from_path(path).with_context(|| format!("loading {}", path.display()))?;
        let entries = file.modules.into_iter().map(ModuleDescriptor::from).collect();
        Self::new(entries).with_context(|| format!("validating {}", path.display()))
    }

    /// Resolve a descriptor by identifier.
    pub fn get(&self, identifier: &ModuleId) -> Option<&ModuleDescriptor> {
        self.entries.iter().find(|entry| &entry.identifier == identifier)
    }

    /// Resolve a descriptor by command alias.
    pub fn by_alias(&self, alias: &str) -> Option<&ModuleDescriptor> {
        self.entries
            .iter()
            .find(|entry| entry.command_alias.as_str() == alias)
    }

    /// Every descriptor in declared order.
    pub fn entries(&self) -> &[ModuleDescriptor] {
        &self.entries
    }

    /// The descriptor eligible for the rollcall summary, if any.
    pub fn aggregate_root(&self) -> Option<&ModuleDescriptor> {
        self.entries.iter().find(|entry| entry.aggregate_root)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn validate_entries(entries: &[ModuleDescriptor]) -> Result<()> {
    if entries.is_empty() {
        bail!("catalog contains no modules");
    }

    let mut identifiers: BTreeSet<&ModuleId> = BTreeSet::new();
    let mut aliases: BTreeSet<&CommandAlias> = BTreeSet::new();
    let mut aggregate_root: Option<&ModuleId> = None;

    for entry in entries {
        if entry.display_name.trim().is_empty() {
            bail!("module {} has an empty display name", entry.identifier);
        }
        if !is_valid_token(entry.identifier.as_str()) {
            bail!(
                "module identifier must match ^[A-Za-z0-9_.-]+$, got '{}'",
                entry.identifier
            );
        }
        if !is_valid_token(entry.command_alias.as_str()) {
            bail!(
                "command alias for {} must match ^[A-Za-z0-9_.-]+$, got '{}'",
                entry.identifier,
                entry.command_alias
            );
        }
        if !identifiers.insert(&entry.identifier) {
            bail!("duplicate module identifier {}", entry.identifier);
        }
        if !aliases.insert(&entry.command_alias) {
            bail!(
                "duplicate command alias {} (module {})",
                entry.command_alias,
                entry.identifier
            );
        }
        if entry.aggregate_root {
            if let Some(existing) = aggregate_root {
                bail!(
                    "modules {} and {} are both marked as aggregate root",
                    existing,
                    entry.identifier
                );
            }
            aggregate_root = Some(&entry.identifier);
        }
    }
    Ok(())
}

fn validate_against_schema(catalog_path: &Path) -> Result<()> {
    let catalog_file = File::open(catalog_path)
        .with_context(|| format!("opening catalog {}", catalog_path.display()))?;
    let catalog_value: Value = serde_json::from_reader(BufReader::new(catalog_file))
        .with_context(|| format!("parsing catalog {}", catalog_path.display()))?;

    let schema = load_embedded_schema("hellas_catalog.schema.json", CATALOG_SCHEMA)?;

    // Report a version mismatch plainly instead of as a const violation.
    let catalog_version = catalog_value
        .get("schema_version")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if catalog_version != schema.schema_version {
        bail!(
            "catalog {} declares schema_version '{}', expected '{}'",
            catalog_path.display(),
            catalog_version,
            schema.schema_version
        );
    }

    validate_instance(
        &schema,
        &catalog_value,
        &format!("catalog {}", catalog_path.display()),
    )
}
