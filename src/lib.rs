//! Shared library for the `hellas` mod reporter.
//!
//! The crate answers "which Hellas suite mods are installed, and what do they
//! declare?" for a game instance. `RegistryCatalog` is the fixed list of known
//! modules; `resolver` turns one catalog entry into `ModuleMetadata` using a
//! `ModulePresenceOracle` and a `ResourceLocator`; `rollcall` summarizes the
//! whole catalog; `CommandTable` renders the `hellas <alias> <verb>` replies.
//! `InstalledMods` implements both collaborators over a `mods/` directory.
//!
//! Absence is never an error here: an uninstalled module resolves to `None`,
//! and unreadable metadata degrades to a version-only answer.

pub mod catalog;
pub mod commands;
pub mod config;
pub mod installed;
pub mod presence;
pub mod resolver;
pub mod rollcall;
mod schema_loader;

pub use catalog::{
    CatalogEntry, CatalogFile, CommandAlias, ModuleDescriptor, ModuleId, RegistryCatalog,
    load_catalog_from_path,
};
pub use commands::{CommandReply, CommandTable, DEFAULT_COMMAND_ROOT, Outcome, Verb};
pub use config::{Overrides, Settings, find_game_dir};
pub use installed::{InstalledMod, InstalledMods, ModSource};
pub use presence::{MemoryLocator, ModulePresenceOracle, ResourceLocator, StaticOracle};
pub use resolver::{
    MetadataDocument, ModuleMetadata, UNKNOWN_VERSION, fallback_version, metadata_resource_path,
    parse_metadata_document, resolve, resolve_version,
};
pub use rollcall::{ModuleStatus, RollcallEntry, summarize};
