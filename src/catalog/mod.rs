//! Module catalog wiring.
//!
//! Holds the fixed list of modules the command surface knows about. Types in
//! `identity` are the keys, `model` carries descriptors and the optional
//! override file format, and `RegistryCatalog` is the validated, ordered view
//! every other component reads from.

pub mod identity;
pub mod index;
pub mod model;

pub use identity::{CommandAlias, ModuleId};
pub use index::RegistryCatalog;
pub use model::{CatalogEntry, CatalogFile, ModuleDescriptor, hellas_suite_descriptors};

pub use model::load_catalog_from_path;
