//! Common error type for configuration and startup failures.

use thiserror::Error;

/// Errors raised by the shared configuration layer.
#[derive(Debug, Error)]
pub enum CommonError {
    /// Configuration file exists but could not be read
    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file contains invalid JSON
    #[error("failed to parse config file {path}: {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
