//! Runtime settings shared by the binary and embedding callers.
//!
//! Every setting resolves in the same order: explicit override, then the
//! matching `HELLAS_*` environment variable, then discovery. Game directory
//! discovery climbs from the working directory to the nearest ancestor that
//! has a `mods/` folder, so `hellas` works from anywhere inside an instance.

use crate::catalog::RegistryCatalog;
use crate::commands::DEFAULT_COMMAND_ROOT;
use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const GAME_DIR_ENV: &str = "HELLAS_GAME_DIR";
pub const MODS_DIR_ENV: &str = "HELLAS_MODS_DIR";
pub const CATALOG_ENV: &str = "HELLAS_CATALOG";
pub const COMMAND_ROOT_ENV: &str = "HELLAS_COMMAND_ROOT";

const MODS_DIR_NAME: &str = "mods";

#[derive(Clone, Debug, Default)]
/// Values supplied explicitly (CLI flags); each wins over its env variable.
pub struct Overrides {
    pub game_dir: Option<PathBuf>,
    pub mods_dir: Option<PathBuf>,
    pub catalog: Option<PathBuf>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Settings {
    pub game_dir: PathBuf,
    pub mods_dir: PathBuf,
    /// Catalog override file; `None` selects the built-in suite.
    pub catalog_path: Option<PathBuf>,
    pub command_root: String,
}

impl Settings {
    /// Resolve against the process environment and working directory.
    pub fn resolve(overrides: Overrides) -> Result<Self> {
        let cwd = env::current_dir().context("reading current directory")?;
        Ok(Self::resolve_with(overrides, env_non_empty, &cwd))
    }

    /// Resolve with an injected environment lookup.
    pub fn resolve_with(
        overrides: Overrides,
        lookup: impl Fn(&str) -> Option<String>,
        cwd: &Path,
    ) -> Self {
        let game_dir = overrides
            .game_dir
            .or_else(|| lookup(GAME_DIR_ENV).map(PathBuf::from))
            .map(|dir| absolutize(cwd, dir))
            .or_else(|| find_game_dir(cwd))
            .unwrap_or_else(|| cwd.to_path_buf());
        let mods_dir = overrides
            .mods_dir
            .or_else(|| lookup(MODS_DIR_ENV).map(PathBuf::from))
            .map(|dir| absolutize(cwd, dir))
            .unwrap_or_else(|| game_dir.join(MODS_DIR_NAME));
        let catalog_path = overrides
            .catalog
            .or_else(|| lookup(CATALOG_ENV).map(PathBuf::from))
            .map(|path| absolutize(cwd, path));
        let command_root =
            lookup(COMMAND_ROOT_ENV).unwrap_or_else(|| DEFAULT_COMMAND_ROOT.to_string());

        let settings = Self {
            game_dir,
            mods_dir,
            catalog_path,
            command_root,
        };
        debug!(?settings, "resolved settings");
        settings
    }

    /// The override catalog when configured, otherwise the built-in suite.
    pub fn load_catalog(&self) -> Result<RegistryCatalog> {
        match &self.catalog_path {
            Some(path) => RegistryCatalog::load(path),
            None => Ok(RegistryCatalog::hellas_suite()),
        }
    }
}

/// Environment variable value, treating blank values as unset.
pub fn env_non_empty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Nearest ancestor of `start` (inclusive) that contains a `mods/` directory.
pub fn find_game_dir(start: &Path) -> Option<PathBuf> {
    let mut dir = fs::canonicalize(start).ok()?;
    loop {
        if dir.join(MODS_DIR_NAME).is_dir() {
            return Some(dir);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

fn absolutize(cwd: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}
