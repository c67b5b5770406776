//! Embedded JSON Schema loading for catalog override files.
//!
//! The schema ships inside the binary so an installed `hellas` never depends
//! on a checkout. The `schema_version` const is read back out of the schema
//! payload, keeping the accepted version in one place.

use anyhow::{Context, Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde_json::Value;

pub(crate) const CATALOG_SCHEMA: &str = include_str!("../schema/hellas_catalog.schema.json");

const SCHEMA_VERSION_POINTER: &str = "/properties/schema_version/const";

/// Result of loading and compiling a JSON Schema.
pub(crate) struct SchemaLoadResult {
    pub schema_version: String,
    pub compiled: JSONSchema,
}

pub(crate) fn load_embedded_schema(name: &str, raw: &str) -> Result<SchemaLoadResult> {
    let schema: Value =
        serde_json::from_str(raw).with_context(|| format!("parsing embedded schema {name}"))?;
    let schema_version = extract_schema_version(&schema, SCHEMA_VERSION_POINTER)
        .ok_or_else(|| anyhow!("schema {name} missing schema_version const"))?;
    let compiled =
        JSONSchema::compile(&schema).map_err(|err| anyhow!("compiling schema {name}: {err}"))?;

    Ok(SchemaLoadResult {
        schema_version,
        compiled,
    })
}

/// Validate `instance`, collecting every schema violation into one error.
pub(crate) fn validate_instance(
    schema: &SchemaLoadResult,
    instance: &Value,
    label: &str,
) -> Result<()> {
    if let Err(errors) = schema.compiled.validate(instance) {
        let details = errors
            .map(|err| err.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        bail!("{label} failed schema validation:\n{details}");
    }
    Ok(())
}

fn extract_schema_version(schema: &Value, pointer: &str) -> Option<String> {
    let version = schema.pointer(pointer).and_then(Value::as_str)?;
    if version
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        Some(version.to_string())
    } else {
        None
    }
}
