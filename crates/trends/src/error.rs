//! Error types for the trends crate

use std::path::PathBuf;
use thiserror::Error;

/// A root path could not be collected.
///
/// Carries the configured root so callers can log it and move on to the
/// next root.
#[derive(Error, Debug)]
#[error("failed to collect {root}: {source}")]
pub struct CollectionError {
    /// The configured root path whose collection failed.
    pub root: String,
    /// What the cluster reported.
    #[source]
    pub source: qumulo::Error,
}

impl CollectionError {
    pub fn new(root: impl Into<String>, source: qumulo::Error) -> Self {
        Self {
            root: root.into(),
            source,
        }
    }
}

/// Errors from loading or saving a snapshot file
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// No snapshot has been written yet
    #[error("no snapshot at {}", .0.display())]
    Missing(PathBuf),

    /// The file exists but could not be read or written
    #[error("snapshot IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid snapshot
    #[error("invalid snapshot {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl SnapshotError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this is the first-run condition rather than a real failure.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing(_))
    }
}

/// Result type for snapshot operations
pub type Result<T> = std::result::Result<T, SnapshotError>;
