//! In-memory cache of mapping tables
//!
//! Building the tables canonicalizes every declared directory. Callers that
//! resolve many names against the same project can keep the built tables here,
//! keyed by the manifest's declarations and the project root.
//!
//! Cached tables are not refreshed when directories are created or removed on
//! disk; call [`MappingCache::clear`] after such changes.

use lru::LruCache;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::manifest::Manifest;
use crate::mapping::{build_tables, MappingTables};

/// Identity of a set of mapping tables
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Hash of both declaration groups
    pub manifest_fingerprint: u64,
    /// Project root the declarations are relative to
    pub project_root: PathBuf,
}

impl CacheKey {
    pub fn new(manifest: &Manifest, project_root: &Path) -> Self {
        let mut hasher = DefaultHasher::new();
        manifest.hash(&mut hasher);

        Self {
            manifest_fingerprint: hasher.finish(),
            project_root: project_root.to_path_buf(),
        }
    }
}

/// Hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// LRU cache of built mapping tables
pub struct MappingCache {
    tables: LruCache<CacheKey, Arc<MappingTables>>,
    stats: CacheStats,
}

impl MappingCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            tables: LruCache::new(capacity),
            stats: CacheStats::default(),
        }
    }

    /// Cached tables for this manifest and root, building them on a miss
    pub fn get_or_build(&mut self, manifest: &Manifest, project_root: &Path) -> Arc<MappingTables> {
        let key = CacheKey::new(manifest, project_root);

        if let Some(tables) = self.tables.get(&key) {
            self.stats.hits += 1;
            debug!("Mapping cache hit for {:?}", project_root);
            return Arc::clone(tables);
        }

        self.stats.misses += 1;
        debug!("Mapping cache miss for {:?}, building tables", project_root);

        let tables = Arc::new(build_tables(manifest, project_root));
        // LRU handles eviction automatically
        self.tables.put(key, Arc::clone(&tables));
        tables
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Drop every cached table
    pub fn clear(&mut self) {
        self.tables.clear();
    }
}
