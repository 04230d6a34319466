//! Namespace service
//!
//! Entry point for callers that hold a parsed manifest and a project root.
//! Every query builds the mapping tables from those two inputs (or takes them
//! from the cache when one is configured) and runs the matching resolver.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

use crate::cache_manager::{CacheStats, MappingCache};
use crate::config::ResolverOptions;
use crate::error::{ManifestError, Result};
use crate::manifest::{locate_and_fetch_manifest, Manifest};
use crate::mapping::{build_tables, MappingTables, NamespaceMapping};
use crate::resolver;

/// A Composer project: its root directory and parsed manifest
#[derive(Debug, Clone)]
pub struct ComposerProject {
    /// Directory containing `composer.json`
    pub root: PathBuf,
    /// Canonical path of `composer.json`
    pub manifest_path: PathBuf,
    pub manifest: Manifest,
}

impl ComposerProject {
    /// Find the nearest `composer.json` above `start` and load it
    pub fn discover(start: &Path) -> Result<Self, ManifestError> {
        let (manifest_path, manifest) = locate_and_fetch_manifest(start)?;
        let root = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| ManifestError::NotFound {
                start: start.to_path_buf(),
            })?;

        info!(
            "Loaded project at {:?}: {} autoload, {} autoload-dev prefixes",
            root,
            manifest.autoload.len(),
            manifest.autoload_dev.len()
        );

        Ok(Self {
            root,
            manifest_path,
            manifest,
        })
    }
}

/// Resolves namespaces and paths for Composer projects
pub struct NamespaceService {
    options: ResolverOptions,
    /// Present only when `options.cache_capacity` is set
    cache: Option<Mutex<MappingCache>>,
}

impl Default for NamespaceService {
    fn default() -> Self {
        Self::new(ResolverOptions::default())
    }
}

impl NamespaceService {
    pub fn new(options: ResolverOptions) -> Self {
        let cache = options.cache_capacity.map(|capacity| Mutex::new(MappingCache::new(capacity)));
        Self { options, cache }
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Mapping tables for both sections
    pub fn tables(&self, manifest: &Manifest, project_root: &Path) -> Arc<MappingTables> {
        match self.lock_cache() {
            Some(mut cache) => cache.get_or_build(manifest, project_root),
            None => Arc::new(build_tables(manifest, project_root)),
        }
    }

    /// `autoload` namespaces whose directory exists
    pub fn autoload(&self, manifest: &Manifest, project_root: &Path) -> Vec<NamespaceMapping> {
        self.tables(manifest, project_root).primary.clone()
    }

    /// `autoload-dev` namespaces whose directory exists
    pub fn autoload_dev(&self, manifest: &Manifest, project_root: &Path) -> Vec<NamespaceMapping> {
        self.tables(manifest, project_root).dev.clone()
    }

    /// Both sections, `autoload` first
    pub fn autoload_and_autoload_dev(&self, manifest: &Manifest, project_root: &Path) -> Vec<NamespaceMapping> {
        let tables = self.tables(manifest, project_root);
        tables.combined().cloned().collect()
    }

    /// Namespace (or class name, for a file) that owns `file_path`
    pub fn namespace_from_path(&self, file_path: &Path, manifest: &Manifest, project_root: &Path) -> Result<String> {
        let tables = self.tables(manifest, project_root);
        resolver::namespace_from_path(file_path, &tables, &self.options.source_extension)
    }

    /// Directory for a namespace, None if no prefix matches
    pub fn path_from_namespace(&self, namespace: &str, manifest: &Manifest, project_root: &Path) -> Option<PathBuf> {
        let tables = self.tables(manifest, project_root);
        resolver::path_from_namespace(namespace, &tables)
    }

    /// Source file for a class, interface or trait name, None if no prefix matches
    pub fn path_from_fqn(&self, fqn: &str, manifest: &Manifest, project_root: &Path) -> Option<PathBuf> {
        let tables = self.tables(manifest, project_root);
        resolver::path_from_fqn(fqn, &tables, &self.options.source_extension)
    }

    pub fn file_with_fqn_exists(&self, fqn: &str, manifest: &Manifest, project_root: &Path) -> bool {
        let tables = self.tables(manifest, project_root);
        resolver::file_with_fqn_exists(fqn, &tables, &self.options.source_extension)
    }

    /// Longest declared prefix of a namespace or FQN, empty if none
    pub fn base_namespace(&self, namespace_or_fqn: &str, manifest: &Manifest, project_root: &Path) -> String {
        let tables = self.tables(manifest, project_root);
        resolver::base_namespace(namespace_or_fqn, tables.combined())
    }

    /// Test namespace for a component, using the configured marker
    pub fn test_namespace(&self, component_fqn: &str, manifest: &Manifest, project_root: &Path) -> String {
        self.test_namespace_with_marker(component_fqn, manifest, project_root, &self.options.test_marker)
    }

    pub fn test_namespace_with_marker(
        &self,
        component_fqn: &str,
        manifest: &Manifest,
        project_root: &Path,
        marker: &str,
    ) -> String {
        let tables = self.tables(manifest, project_root);
        resolver::test_namespace(component_fqn, &tables, marker)
    }

    /// Cache counters, None when caching is disabled
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.lock_cache().map(|cache| cache.stats())
    }

    pub fn clear_cache(&self) {
        if let Some(mut cache) = self.lock_cache() {
            cache.clear();
        }
    }

    fn lock_cache(&self) -> Option<MutexGuard<'_, MappingCache>> {
        // Poisoned locks still hold a usable cache
        self.cache
            .as_ref()
            .map(|cache| cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner()))
    }
}
