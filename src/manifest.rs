//! `composer.json` loading
//!
//! Only the PSR-4 rules of the `autoload` and `autoload-dev` sections are read.
//! Both are kept in declaration order, which namespace-to-path resolution
//! depends on.

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::{find_composer_json, AutoloadSection, PSR_4};
use crate::error::ManifestError;

/// One PSR-4 section: namespace prefix -> directory relative to the project root
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DeclarationGroup {
    entries: Vec<(String, String)>,
}

impl DeclarationGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a declaration, keeping declaration order
    pub fn push(&mut self, prefix: impl Into<String>, directory: impl Into<String>) {
        self.entries.push((prefix.into(), directory.into()));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, d)| (p.as_str(), d.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<P: Into<String>, D: Into<String>> FromIterator<(P, D)> for DeclarationGroup {
    fn from_iter<I: IntoIterator<Item = (P, D)>>(iter: I) -> Self {
        let mut group = DeclarationGroup::new();
        for (prefix, directory) in iter {
            group.push(prefix, directory);
        }
        group
    }
}

/// The parts of `composer.json` the resolver works with
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Manifest {
    /// `autoload > psr-4`
    pub autoload: DeclarationGroup,
    /// `autoload-dev > psr-4`
    pub autoload_dev: DeclarationGroup,
}

impl Manifest {
    pub fn new(autoload: DeclarationGroup, autoload_dev: DeclarationGroup) -> Self {
        Self { autoload, autoload_dev }
    }

    pub fn section(&self, section: AutoloadSection) -> &DeclarationGroup {
        match section {
            AutoloadSection::Autoload => &self.autoload,
            AutoloadSection::AutoloadDev => &self.autoload_dev,
        }
    }
}

/// Parse `composer.json` content
///
/// Missing sections and a missing `psr-4` key yield empty groups.
pub fn parse_manifest(content: &str) -> serde_json::Result<Manifest> {
    let root: Value = serde_json::from_str(content)?;

    Ok(Manifest {
        autoload: read_group(&root, AutoloadSection::Autoload),
        autoload_dev: read_group(&root, AutoloadSection::AutoloadDev),
    })
}

fn read_group(root: &Value, section: AutoloadSection) -> DeclarationGroup {
    let mut group = DeclarationGroup::new();

    let rules = match root
        .get(section.key())
        .and_then(|s| s.get(PSR_4))
        .and_then(Value::as_object)
    {
        Some(rules) => rules,
        None => return group,
    };

    for (prefix, directory) in rules {
        match directory {
            Value::String(dir) => group.push(prefix.as_str(), dir.as_str()),
            Value::Array(_) => {
                // One directory per prefix only
                warn!(
                    "Skipping {} > {} entry '{}': multiple directories are not supported",
                    section, PSR_4, prefix
                );
            }
            other => {
                warn!(
                    "Skipping {} > {} entry '{}': expected a directory string, got {}",
                    section, PSR_4, prefix, other
                );
            }
        }
    }

    group
}

/// Read and parse a `composer.json` file
pub fn fetch_manifest(path: &Path) -> Result<Manifest, ManifestError> {
    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ManifestError::NotFound {
                start: path.to_path_buf(),
            }
        } else {
            ManifestError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    parse_manifest(&content).map_err(|source| ManifestError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Locate the nearest `composer.json` above `start` and load it
pub fn locate_and_fetch_manifest(start: &Path) -> Result<(PathBuf, Manifest), ManifestError> {
    let path = find_composer_json(start).ok_or_else(|| ManifestError::NotFound {
        start: start.to_path_buf(),
    })?;
    let manifest = fetch_manifest(&path)?;
    Ok((path, manifest))
}

/// Same as [`locate_and_fetch_manifest`], treating every failure as "no manifest"
pub fn find_and_fetch_manifest(start: &Path) -> Option<(PathBuf, Manifest)> {
    match locate_and_fetch_manifest(start) {
        Ok(found) => Some(found),
        Err(e) => {
            debug!("No usable manifest: {}", e);
            None
        }
    }
}
