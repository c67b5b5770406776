use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique key of a module inside the catalog (e.g., `hellasaudio`).
///
/// Matches the mod id the game loader reports, so presence and version
/// lookups use it verbatim.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(pub String);

/// Short token used to address a module on the command line (e.g., `helper`).
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandAlias(pub String);

impl ModuleId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl CommandAlias {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&ModuleId> for CommandAlias {
    fn from(id: &ModuleId) -> Self {
        CommandAlias(id.0.clone())
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for CommandAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Returns true when `value` is a non-empty `^[A-Za-z0-9_.-]+$` token.
///
/// Identifiers double as path segments (`config/<id>.json`), so anything that
/// could walk out of the resource root is rejected here.
pub fn is_valid_token(value: &str) -> bool {
    !value.is_empty()
        && value != "."
        && value != ".."
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}
