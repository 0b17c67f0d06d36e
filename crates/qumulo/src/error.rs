//! Error types for cluster API operations.
//!
//! Errors are categorized so callers can tell a rejected login apart from an
//! unreachable cluster or a response that did not decode.

use std::fmt;

/// Result type alias for cluster operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of cluster errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Transport failures and unexpected HTTP statuses.
    Network,
    /// Credentials were rejected or are missing.
    Authentication,
    /// The requested path or file id does not exist.
    NotFound,
    /// The cluster answered with something we could not decode.
    Format,
    /// Other/unknown errors.
    Other,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Cluster connectivity issue",
            Self::Authentication => "Authentication failed",
            Self::NotFound => "Path or file not found on the cluster",
            Self::Format => "Unexpected API response",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network => "Check the cluster address and port, then try again",
            Self::Authentication => "Verify the username/password or access token",
            Self::NotFound => "Verify the configured directory paths exist on the cluster",
            Self::Format => "The cluster software version may not be supported",
            Self::Other => "Check the error details for more information",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur while talking to the cluster.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP request failed: {message}")]
    Http {
        /// Error message.
        message: String,
        /// HTTP status code if available.
        status: Option<u16>,
    },

    /// Login was rejected, or a request was made without a session.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// A path or id could not be found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid response from the API.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),

    /// Generic error.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an HTTP error.
    pub fn http(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Http {
            message: message.into(),
            status,
        }
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Http {
                status: Some(401 | 403),
                ..
            } => ErrorCategory::Authentication,
            Error::Http {
                status: Some(404), ..
            } => ErrorCategory::NotFound,
            Error::Http { .. } => ErrorCategory::Network,
            Error::Authentication(_) => ErrorCategory::Authentication,
            Error::NotFound(_) => ErrorCategory::NotFound,
            Error::InvalidResponse(_) => ErrorCategory::Format,
            Error::Other(_) => ErrorCategory::Other,
        }
    }

    /// Whether the cluster rejected our credentials.
    #[must_use]
    pub fn is_authentication(&self) -> bool {
        self.category() == ErrorCategory::Authentication
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::Http {
                message: format!("HTTP {}", code),
                status: Some(code),
            },
            ureq::Error::Json(e) => Self::InvalidResponse(e.to_string()),
            other => Self::Http {
                message: other.to_string(),
                status: None,
            },
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}
