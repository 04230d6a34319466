//! Namespace mapping tables
//!
//! Turns the declared PSR-4 groups into (namespace prefix, absolute directory)
//! pairs. Declarations whose directory does not exist are dropped here: a
//! checkout may declare directories it hasn't created yet.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::manifest::{DeclarationGroup, Manifest};

/// A namespace prefix and the directory it is loaded from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamespaceMapping {
    prefix: String,
    directory: PathBuf,
}

impl NamespaceMapping {
    /// `directory` is expected to be canonical
    pub fn new(prefix: impl Into<String>, directory: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
            directory: directory.into(),
        }
    }

    /// Namespace prefix as declared, e.g. `App\`
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Canonical absolute directory
    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

/// Mapping tables for both autoload sections
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingTables {
    /// From `autoload`, in declaration order
    pub primary: Vec<NamespaceMapping>,
    /// From `autoload-dev`, in declaration order
    pub dev: Vec<NamespaceMapping>,
}

impl MappingTables {
    pub fn new(primary: Vec<NamespaceMapping>, dev: Vec<NamespaceMapping>) -> Self {
        Self { primary, dev }
    }

    /// Every mapping, primary entries first
    pub fn combined(&self) -> impl Iterator<Item = &NamespaceMapping> {
        self.primary.iter().chain(self.dev.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_empty() && self.dev.is_empty()
    }
}

/// Resolve one declaration group against the project root
pub fn build_mappings(group: &DeclarationGroup, project_root: &Path) -> Vec<NamespaceMapping> {
    group
        .iter()
        .filter_map(|(prefix, relative)| {
            // Declared directories are always relative to the root
            let joined = project_root.join(relative.trim_matches(['/', '\\']));

            match joined.canonicalize() {
                Ok(directory) => Some(NamespaceMapping::new(prefix, directory)),
                Err(e) => {
                    debug!("Dropping '{}' -> {:?}: {}", prefix, joined, e);
                    None
                }
            }
        })
        .collect()
}

/// Build the tables for both sections of a manifest
pub fn build_tables(manifest: &Manifest, project_root: &Path) -> MappingTables {
    MappingTables {
        primary: build_mappings(&manifest.autoload, project_root),
        dev: build_mappings(&manifest.autoload_dev, project_root),
    }
}
