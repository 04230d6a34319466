//! Composer project configuration utilities
//!
//! This module provides the constants that name the parts of `composer.json`
//! we read, the resolver options, and discovery of the manifest file by
//! walking up from a starting directory.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Manifest file name
pub const COMPOSER_JSON: &str = "composer.json";

/// Autoload rule key inside each autoload section
pub const PSR_4: &str = "psr-4";

/// PHP namespace separator
pub const NAMESPACE_SEPARATOR: char = '\\';

/// Segment inserted after the base namespace for test classes
pub const DEFAULT_TEST_MARKER: &str = "Tests";

/// Extension of PHP source files (without the dot)
pub const DEFAULT_SOURCE_EXTENSION: &str = "php";

/// The two autoload sections of `composer.json`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AutoloadSection {
    /// `autoload` - production code
    #[serde(rename = "autoload")]
    Autoload,
    /// `autoload-dev` - tests and development helpers
    #[serde(rename = "autoload-dev")]
    AutoloadDev,
}

impl AutoloadSection {
    /// Key of this section in `composer.json`
    pub fn key(self) -> &'static str {
        match self {
            AutoloadSection::Autoload => "autoload",
            AutoloadSection::AutoloadDev => "autoload-dev",
        }
    }
}

impl fmt::Display for AutoloadSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Options shared by every resolution call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverOptions {
    /// Marker segment used by test namespace generation (e.g. "Tests")
    pub test_marker: String,

    /// Extension appended to resolved class paths, without the dot
    pub source_extension: String,

    /// Number of mapping tables to keep in memory.
    /// `None` rebuilds the tables on every call.
    pub cache_capacity: Option<NonZeroUsize>,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            test_marker: DEFAULT_TEST_MARKER.to_string(),
            source_extension: DEFAULT_SOURCE_EXTENSION.to_string(),
            cache_capacity: None,
        }
    }
}

impl ResolverOptions {
    pub fn with_test_marker(mut self, marker: impl Into<String>) -> Self {
        self.test_marker = marker.into();
        self
    }

    pub fn with_cache_capacity(mut self, capacity: NonZeroUsize) -> Self {
        self.cache_capacity = Some(capacity);
        self
    }
}

lazy_static! {
    // Match a bare drive root such as C:\
    static ref DRIVE_ROOT_RE: Regex = Regex::new(r"^[a-zA-Z]:\\$").unwrap();
}

/// Whether `dir` is a filesystem root (`/` or a drive root like `C:\`)
pub fn is_filesystem_root(dir: &Path) -> bool {
    let text = dir.to_string_lossy();
    text == "/" || DRIVE_ROOT_RE.is_match(&text) || dir.parent().is_none()
}

/// Find the nearest `composer.json` by walking up from a directory
///
/// Checks `start` first, then each parent directory. The walk stops at the
/// filesystem root (or a drive root on Windows).
///
/// Relative starts are resolved against the current directory first, so the
/// walk can continue above it.
///
/// Returns the canonical path of the manifest, or None if no manifest is found.
pub fn find_composer_json(start: &Path) -> Option<PathBuf> {
    let start = std::path::absolute(start).ok()?;
    let mut current = start.as_path();

    // If it's a file, start from its parent directory
    if current.is_file() {
        current = current.parent()?;
    }

    loop {
        let candidate = current.join(COMPOSER_JSON);
        if candidate.exists() {
            // A manifest that can't be canonicalized is treated as missing
            let found = candidate.canonicalize().ok();
            if let Some(path) = &found {
                info!("Found {} at {:?}", COMPOSER_JSON, path);
            }
            return found;
        }

        if is_filesystem_root(current) {
            debug!("Reached filesystem root {:?} without finding {}", current, COMPOSER_JSON);
            return None;
        }

        // Move up one directory
        current = current.parent()?;
    }
}

/// Find the project root: the directory containing the nearest `composer.json`
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    find_composer_json(start).and_then(|manifest| manifest.parent().map(Path::to_path_buf))
}

// ============================================================================
// Tests
// ============================================================================
