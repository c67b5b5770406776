//! Collaborator seams for the resolver.
//!
//! The resolver never looks at the filesystem itself. It asks a
//! `ModulePresenceOracle` whether a module is loaded (and which version the
//! loader reports) and a `ResourceLocator` for files bundled with the module.
//! `InstalledMods` implements both over a mods directory; the in-memory
//! versions here back embedding callers and tests.

use crate::catalog::ModuleId;
use anyhow::{Result, anyhow};
use std::collections::{BTreeMap, BTreeSet};

/// Live installation truth for modules.
pub trait ModulePresenceOracle {
    /// Whether the module is currently installed.
    fn is_present(&self, id: &ModuleId) -> bool;

    /// Version string reported by the loader, if any.
    fn installed_version(&self, id: &ModuleId) -> Option<String>;
}

/// Access to files bundled inside a module.
pub trait ResourceLocator {
    /// Read `relative_path` from the module that owns `id`.
    ///
    /// `Ok(None)` means the module carries no such file; `Err` is reserved for
    /// I/O failures while reading one that exists.
    fn open_text_resource(&self, id: &ModuleId, relative_path: &str) -> Result<Option<Vec<u8>>>;
}

#[derive(Clone, Debug, Default)]
/// Fixed presence table: modules mapped to an optional loader version.
pub struct StaticOracle {
    modules: BTreeMap<ModuleId, Option<String>>,
}

impl StaticOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_module(mut self, id: &str, version: Option<&str>) -> Self {
        self.modules
            .insert(ModuleId::new(id), version.map(str::to_string));
        self
    }
}

impl ModulePresenceOracle for StaticOracle {
    fn is_present(&self, id: &ModuleId) -> bool {
        self.modules.contains_key(id)
    }

    fn installed_version(&self, id: &ModuleId) -> Option<String> {
        self.modules.get(id).cloned().flatten()
    }
}

#[derive(Clone, Debug, Default)]
/// Resources held in memory, keyed by module and relative path.
pub struct MemoryLocator {
    resources: BTreeMap<(ModuleId, String), Vec<u8>>,
    failures: BTreeSet<(ModuleId, String)>,
}

impl MemoryLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resource(mut self, id: &str, relative_path: &str, contents: impl Into<Vec<u8>>) -> Self {
        self.resources.insert(
            (ModuleId::new(id), relative_path.to_string()),
            contents.into(),
        );
        self
    }

    /// Make reads of `relative_path` fail as an I/O error would.
    pub fn with_failure(mut self, id: &str, relative_path: &str) -> Self {
        self.failures
            .insert((ModuleId::new(id), relative_path.to_string()));
        self
    }
}

impl ResourceLocator for MemoryLocator {
    fn open_text_resource(&self, id: &ModuleId, relative_path: &str) -> Result<Option<Vec<u8>>> {
        let key = (id.clone(), relative_path.to_string());
        if self.failures.contains(&key) {
            return Err(anyhow!("simulated read failure for {id}:{relative_path}"));
        }
        Ok(self.resources.get(&key).cloned())
    }
}
