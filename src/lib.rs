//! Composer namespace resolution
//!
//! This library maps the PSR-4 namespace prefixes declared in `composer.json`
//! to directories on disk and translates between the two: the namespace of a
//! source file, the file of a fully qualified class name, the base namespace
//! of a name, and the test namespace of a component.

// Core modules
pub mod config;
pub mod error;
pub mod manifest;
pub mod mapping;
pub mod resolver;
pub mod cache_manager;
pub mod service;

// Re-export commonly used types
pub use config::{find_composer_json, find_project_root, AutoloadSection, ResolverOptions};
pub use error::{ManifestError, ResolveError};
pub use manifest::{DeclarationGroup, Manifest};
pub use mapping::{MappingTables, NamespaceMapping};
pub use service::{ComposerProject, NamespaceService};
