//! Error types for manifest loading and namespace resolution

use std::path::PathBuf;
use thiserror::Error;

/// Failure to load `composer.json`.
///
/// These are signals, not crashes: the service treats every variant as
/// "this project has no manifest".
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("composer.json not found from {}", .start.display())]
    NotFound { start: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure to resolve a file path to a namespace
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("file path \"{}\" does not belong to any namespace", .path.display())]
    NamespaceNotFound { path: PathBuf },
}

pub type Result<T, E = ResolveError> = std::result::Result<T, E>;
