//! Run-level error taxonomy.
//!
//! Every failure a run can end with falls into one of these classes, so the
//! binaries can log it with the right advice and exit non-zero.

use std::process::ExitCode;
use thiserror::Error;

/// Why a run failed.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed configuration; raised before any network call.
    #[error("configuration error: {0:#}")]
    Config(anyhow::Error),

    /// The cluster rejected our credentials or could not be reached to log in.
    #[error("cluster authentication failed: {0}")]
    Authentication(#[source] qumulo::Error),

    /// No root path could be collected.
    #[error(transparent)]
    Collection(#[from] trends::CollectionError),

    /// Some roots were collected and delivered, others failed.
    #[error("{} of {total} root path(s) could not be collected: {}", .failed.len(), .failed.join(", "))]
    PartialCollection { failed: Vec<String>, total: usize },

    /// The snapshot exists but could not be read or written.
    #[error(transparent)]
    Snapshot(#[from] trends::SnapshotError),

    /// Email or time-series delivery failed.
    #[error("delivery failed: {0:#}")]
    Delivery(anyhow::Error),
}

impl Error {
    /// Short class name used in log lines.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Authentication(_) => "authentication",
            Self::Collection(_) | Self::PartialCollection { .. } => "collection",
            Self::Snapshot(_) => "snapshot",
            Self::Delivery(_) => "delivery",
        }
    }

    /// Actionable advice for the operator, when there is any.
    #[must_use]
    pub fn advice(&self) -> Option<&'static str> {
        match self {
            Self::Config(_) => Some("Check the --config-file contents and command-line arguments"),
            Self::Authentication(e) => Some(e.category().advice()),
            Self::Collection(e) => Some(e.source.category().advice()),
            Self::PartialCollection { .. } => Some("The report only covers the roots that succeeded"),
            Self::Snapshot(_) => Some("Fix or remove the snapshot file; a missing file starts a new baseline"),
            Self::Delivery(_) => None,
        }
    }

    /// Process exit code. Every failure class exits with `1`.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::FAILURE
    }
}

/// Result type for runs
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind() {
        assert_eq!(Error::Config(anyhow::anyhow!("missing key")).kind(), "config");
        assert_eq!(
            Error::PartialCollection {
                failed: vec!["/a".to_string()],
                total: 2
            }
            .kind(),
            "collection"
        );
        assert_eq!(Error::Delivery(anyhow::anyhow!("smtp down")).kind(), "delivery");
    }

    #[test]
    fn test_partial_collection_display() {
        let err = Error::PartialCollection {
            failed: vec!["/a".to_string(), "/b".to_string()],
            total: 3,
        };
        assert_eq!(
            err.to_string(),
            "2 of 3 root path(s) could not be collected: /a, /b"
        );
    }

    #[test]
    fn test_config_display_includes_context_chain() {
        let inner = anyhow::anyhow!("missing field `dir_paths`").context("Invalid config.json");
        let err = Error::Config(inner);
        let display = err.to_string();
        assert!(display.contains("Invalid config.json"));
        assert!(display.contains("dir_paths"));
    }

    #[test]
    fn test_collection_advice_follows_category() {
        let err = Error::Collection(trends::CollectionError::new(
            "/data",
            qumulo::Error::NotFound("/data".to_string()),
        ));
        assert_eq!(
            err.advice(),
            Some(qumulo::ErrorCategory::NotFound.advice())
        );
    }
}
