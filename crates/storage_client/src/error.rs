//! Error type for storage operations.

use std::path::PathBuf;

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Invalid construction arguments (empty credentials, unbuildable HTTP client)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Local file could not be read or written
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Service answered a call with a non-2xx status
    #[error("Storage API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// Response was 2xx but could not be interpreted
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Operation called with an invalid combination of arguments
    #[error("{0}")]
    Usage(String),

    /// Transport failure (connect, TLS, timeout)
    #[error("Network error: {0}")]
    Network(String),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io { path: path.into(), source }
    }

    /// HTTP status carried by an [`StorageError::Api`] error.
    pub fn status(&self) -> Option<u16> {
        match self {
            StorageError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
