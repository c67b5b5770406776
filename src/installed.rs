//! Filesystem-backed presence oracle and resource locator.
//!
//! `InstalledMods` scans a game instance's `mods/` directory once: every
//! `*.jar` is opened as a zip archive and every subdirectory is treated as an
//! exploded mod (the layout development environments use). Mod ids and
//! versions come from `META-INF/mods.toml`; a `${file.jarVersion}` version is
//! taken from the jar manifest, or left unset when the manifest has none.

use crate::catalog::ModuleId;
use crate::presence::{ModulePresenceOracle, ResourceLocator};
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Read};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use zip::ZipArchive;
use zip::result::ZipError;

const MODS_TOML: &str = "META-INF/mods.toml";
const MANIFEST: &str = "META-INF/MANIFEST.MF";
const JAR_VERSION_PLACEHOLDER: &str = "${file.jarVersion}";

#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
/// Where a mod's files live.
pub enum ModSource {
    Jar(PathBuf),
    Directory(PathBuf),
}

impl ModSource {
    pub fn path(&self) -> &Path {
        match self {
            ModSource::Jar(path) | ModSource::Directory(path) => path,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
/// One mod declared by a source.
pub struct InstalledMod {
    pub mod_id: ModuleId,
    pub version: Option<String>,
    pub source: ModSource,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
/// The fields of a `[[mods]]` table this crate reads.
pub struct DeclaredMod {
    #[serde(rename = "modId", default)]
    pub mod_id: String,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Clone, Debug, Default)]
/// Mods found under one directory, keyed by mod id.
pub struct InstalledMods {
    mods: BTreeMap<ModuleId, InstalledMod>,
}

impl InstalledMods {
    /// Scan `mods_dir`. A missing directory yields an empty set.
    ///
    /// Sources that cannot be read are logged and skipped so one broken jar
    /// does not hide the rest of the instance.
    pub fn scan(mods_dir: &Path) -> Result<Self> {
        if !mods_dir.is_dir() {
            debug!(path = %mods_dir.display(), "mods directory not found");
            return Ok(Self::default());
        }

        let mut found = Vec::new();
        for source in collect_mod_sources(mods_dir)? {
            match read_declared_mods(&source) {
                Ok(declared) if declared.is_empty() => {
                    debug!(path = %source.path().display(), "no mods.toml entries");
                }
                Ok(declared) => {
                    found.extend(declared.into_iter().map(|declared| InstalledMod {
                        mod_id: ModuleId(declared.mod_id),
                        version: declared.version,
                        source: source.clone(),
                    }));
                }
                Err(err) => {
                    warn!(path = %source.path().display(), "skipping unreadable mod: {err:#}");
                }
            }
        }
        Ok(Self::from_mods(found))
    }

    /// Build from already-known mods; the first source wins on duplicate ids.
    pub fn from_mods(mods: impl IntoIterator<Item = InstalledMod>) -> Self {
        let mut by_id: BTreeMap<ModuleId, InstalledMod> = BTreeMap::new();
        for installed in mods {
            if let Some(existing) = by_id.get(&installed.mod_id) {
                warn!(
                    module = %installed.mod_id,
                    kept = %existing.source.path().display(),
                    ignored = %installed.source.path().display(),
                    "duplicate mod id"
                );
                continue;
            }
            by_id.insert(installed.mod_id.clone(), installed);
        }
        Self { mods: by_id }
    }

    pub fn get(&self, id: &ModuleId) -> Option<&InstalledMod> {
        self.mods.get(id)
    }

    /// Installed mods in mod id order.
    pub fn iter(&self) -> impl Iterator<Item = &InstalledMod> {
        self.mods.values()
    }

    pub fn len(&self) -> usize {
        self.mods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mods.is_empty()
    }
}

impl ModulePresenceOracle for InstalledMods {
    fn is_present(&self, id: &ModuleId) -> bool {
        self.mods.contains_key(id)
    }

    fn installed_version(&self, id: &ModuleId) -> Option<String> {
        self.mods.get(id)?.version.clone()
    }
}

impl ResourceLocator for InstalledMods {
    fn open_text_resource(&self, id: &ModuleId, relative_path: &str) -> Result<Option<Vec<u8>>> {
        let Some(installed) = self.mods.get(id) else {
            return Ok(None);
        };
        validate_relative_path(relative_path)?;
        read_entry(&installed.source, relative_path)
    }
}

/// List jar files and exploded mod directories directly under `mods_dir`.
pub fn collect_mod_sources(mods_dir: &Path) -> Result<Vec<ModSource>> {
    let mut sources = Vec::new();
    for entry in
        fs::read_dir(mods_dir).with_context(|| format!("listing {}", mods_dir.display()))?
    {
        let path = entry
            .with_context(|| format!("listing {}", mods_dir.display()))?
            .path();
        if path.is_dir() {
            sources.push(ModSource::Directory(path));
        } else if path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("jar"))
        {
            sources.push(ModSource::Jar(path));
        }
    }
    sources.sort();
    Ok(sources)
}

fn read_declared_mods(source: &ModSource) -> Result<Vec<DeclaredMod>> {
    let Some(bytes) = read_entry(source, MODS_TOML)? else {
        return Ok(Vec::new());
    };
    let contents = String::from_utf8(bytes)
        .with_context(|| format!("{MODS_TOML} in {} is not UTF-8", source.path().display()))?;

    let mut declared = parse_mods_toml(&contents)
        .with_context(|| format!("parsing {MODS_TOML} in {}", source.path().display()))?;
    if declared
        .iter()
        .any(|m| m.version.as_deref() == Some(JAR_VERSION_PLACEHOLDER))
    {
        let jar_version = read_entry(source, MANIFEST)?
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .and_then(|text| manifest_attribute(&text, "Implementation-Version"));
        for declared_mod in &mut declared {
            if declared_mod.version.as_deref() == Some(JAR_VERSION_PLACEHOLDER) {
                declared_mod.version = jar_version.clone();
            }
        }
    }
    Ok(declared)
}

/// Read one entry from a jar or exploded directory; `None` when absent.
fn read_entry(source: &ModSource, relative_path: &str) -> Result<Option<Vec<u8>>> {
    match source {
        ModSource::Jar(jar) => {
            let file = File::open(jar).with_context(|| format!("opening {}", jar.display()))?;
            let mut archive = ZipArchive::new(file)
                .with_context(|| format!("reading archive {}", jar.display()))?;
            let mut entry = match archive.by_name(relative_path) {
                Ok(entry) => entry,
                Err(ZipError::FileNotFound) => return Ok(None),
                Err(err) => {
                    return Err(err)
                        .with_context(|| format!("reading {relative_path} from {}", jar.display()));
                }
            };
            let mut bytes = Vec::new();
            entry
                .read_to_end(&mut bytes)
                .with_context(|| format!("reading {relative_path} from {}", jar.display()))?;
            Ok(Some(bytes))
        }
        ModSource::Directory(dir) => {
            let path = dir.join(relative_path);
            match fs::read(&path) {
                Ok(bytes) => Ok(Some(bytes)),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
                Err(err) => Err(err).with_context(|| format!("reading {}", path.display())),
            }
        }
    }
}

fn validate_relative_path(relative_path: &str) -> Result<()> {
    let path = Path::new(relative_path);
    if relative_path.is_empty()
        || relative_path.contains('\\')
        || !path
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
    {
        bail!("resource path must be relative and stay inside the mod: {relative_path}");
    }
    Ok(())
}

#[derive(Deserialize)]
struct ModsToml {
    #[serde(default)]
    mods: Vec<DeclaredMod>,
}

/// `modId` and `version` of every `[[mods]]` table.
///
/// Tables without a `modId` are dropped; every other key is ignored.
pub fn parse_mods_toml(contents: &str) -> Result<Vec<DeclaredMod>> {
    let parsed: ModsToml = toml::from_str(contents).context("mods.toml is not valid TOML")?;
    Ok(parsed
        .mods
        .into_iter()
        .filter(|declared| !declared.mod_id.trim().is_empty())
        .collect())
}

/// Value of a main-section manifest attribute, joining continuation lines.
pub fn manifest_attribute(contents: &str, key: &str) -> Option<String> {
    let mut value: Option<String> = None;
    let mut current_key: Option<&str> = None;
    for line in contents.lines() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            // Per-entry sections follow the first blank line.
            break;
        }
        if let Some(rest) = line.strip_prefix(' ') {
            if current_key == Some(key) {
                if let Some(value) = &mut value {
                    value.push_str(rest);
                }
            }
            continue;
        }
        if let Some((name, raw)) = line.split_once(':') {
            let name = name.trim();
            current_key = Some(name);
            if name == key && value.is_none() {
                value = Some(raw.trim().to_string());
            }
        }
    }
    value.filter(|v| !v.is_empty())
}
