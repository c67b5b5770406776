//! Per-request metadata resolution for a single module.
//!
//! Resolution is deliberately tolerant: a missing or malformed
//! `config/<id>.json` never prevents reporting that a module is installed.
//! Failures while reading or parsing the document are logged and degrade to
//! the version fallback chain with empty dependency and feature lists.
//! Nothing here is cached; every call re-reads its inputs.

use crate::catalog::{ModuleDescriptor, ModuleId};
use crate::presence::{ModulePresenceOracle, ResourceLocator};
use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde_json::{Map, Value};
use std::iter;
use tracing::{debug, warn};

/// Version reported when neither the document nor the loader has one.
pub const UNKNOWN_VERSION: &str = "Unknown";

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
/// Metadata reported for an installed module.
pub struct ModuleMetadata {
    pub version: String,
    pub dependencies: Vec<String>,
    pub features: Vec<String>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
/// Best-effort projection of a `config/<id>.json` document.
pub struct MetadataDocument {
    pub version: Option<String>,
    pub dependencies: Vec<String>,
    pub features: Vec<String>,
}

/// Location of the metadata document inside the module's archive.
pub fn metadata_resource_path(id: &ModuleId) -> String {
    format!("config/{}.json", id.as_str())
}

/// Resolve metadata for `descriptor`, or `None` when the module is not installed.
pub fn resolve(
    descriptor: &ModuleDescriptor,
    oracle: &dyn ModulePresenceOracle,
    locator: &dyn ResourceLocator,
) -> Option<ModuleMetadata> {
    let id = &descriptor.identifier;
    if !oracle.is_present(id) {
        return None;
    }

    let document = load_document(id, locator).unwrap_or_default();
    let version = fallback_version(version_chain(document.version, id, oracle));
    Some(ModuleMetadata {
        version,
        dependencies: document.dependencies,
        features: document.features,
    })
}

/// Resolve only the version of `descriptor`.
///
/// Reads the same document and applies the same fallback chain as `resolve`;
/// used by the rollcall, which needs one line per module.
pub fn resolve_version(
    descriptor: &ModuleDescriptor,
    oracle: &dyn ModulePresenceOracle,
    locator: &dyn ResourceLocator,
) -> Option<String> {
    let id = &descriptor.identifier;
    if !oracle.is_present(id) {
        return None;
    }

    let document_version = load_document(id, locator).and_then(|document| document.version);
    Some(fallback_version(version_chain(document_version, id, oracle)))
}

/// First available candidate, or `UNKNOWN_VERSION`.
///
/// Candidates are consumed lazily so later sources are only queried when the
/// earlier ones come up empty.
pub fn fallback_version<I>(candidates: I) -> String
where
    I: IntoIterator<Item = Option<String>>,
{
    candidates
        .into_iter()
        .flatten()
        .next()
        .unwrap_or_else(|| UNKNOWN_VERSION.to_string())
}

/// Document version, then the loader-reported version.
fn version_chain<'a>(
    document_version: Option<String>,
    id: &'a ModuleId,
    oracle: &'a dyn ModulePresenceOracle,
) -> impl Iterator<Item = Option<String>> + 'a {
    iter::once(document_version).chain(iter::once_with(move || oracle.installed_version(id)))
}

/// Parse a metadata document without touching I/O.
///
/// Fails only when the text is not JSON or not an object. Field-level problems
/// (wrong types, non-scalar entries) are projected away silently.
pub fn parse_metadata_document(text: &str) -> Result<MetadataDocument> {
    let value: Value = serde_json::from_str(text).context("metadata is not valid JSON")?;
    let Value::Object(object) = value else {
        bail!("metadata is not a JSON object");
    };
    Ok(MetadataDocument {
        version: object.get("version").and_then(scalar_to_string),
        dependencies: string_list(&object, "dependencies"),
        features: string_list(&object, "features"),
    })
}

fn load_document(id: &ModuleId, locator: &dyn ResourceLocator) -> Option<MetadataDocument> {
    with_logged_failure(id, read_document(id, locator)).flatten()
}

fn read_document(id: &ModuleId, locator: &dyn ResourceLocator) -> Result<Option<MetadataDocument>> {
    let Some(text) = read_resource_text(id, locator)? else {
        return Ok(None);
    };
    parse_metadata_document(&text)
        .with_context(|| format!("parsing {}", metadata_resource_path(id)))
        .map(Some)
}

fn read_resource_text(id: &ModuleId, locator: &dyn ResourceLocator) -> Result<Option<String>> {
    let path = metadata_resource_path(id);
    let Some(bytes) = locator
        .open_text_resource(id, &path)
        .with_context(|| format!("reading {path}"))?
    else {
        debug!(module = %id, path = %path, "no metadata resource");
        return Ok(None);
    };
    let text = String::from_utf8(bytes).with_context(|| format!("{path} is not valid UTF-8"))?;
    Ok(Some(text))
}

fn with_logged_failure<T>(id: &ModuleId, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(module = %id, "failed to read metadata: {err:#}");
            None
        }
    }
}

/// Strings verbatim; numbers and booleans in their JSON text form.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn string_list(object: &Map<String, Value>, key: &str) -> Vec<String> {
    match object.get(key) {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_to_string).collect(),
        _ => Vec::new(),
    }
}
