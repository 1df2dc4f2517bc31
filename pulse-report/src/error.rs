//! Error taxonomy for the scrape pipeline.
//!
//! Distinguishes soft failures (a scrape that mechanically succeeded but
//! yielded zero usable rows, expected under markup drift) from hard
//! failures (transport, timeout, parse). Neither is fatal to the report:
//! failures are always scoped to the section that produced them.

use std::fmt;

/// Errors raised while scraping a single source.
///
/// `Display` and `Error` are implemented by hand because the `source`
/// fields hold a source *name* (a `String`), and thiserror's derive
/// unconditionally treats any field named `source` as an error cause.
#[derive(Debug, Clone)]
pub enum ScrapeError {
    /// All extraction strategies were exhausted without producing a row.
    /// Expected under markup drift; logged at warn level.
    Empty { source: String },

    /// HTTP transport or status error.
    Http { source: String, message: String },

    /// Page load exceeded the configured timeout.
    Timeout { source: String },

    /// Response was received but could not be interpreted.
    Parse { source: String, message: String },
}

impl fmt::Display for ScrapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { source } => write!(f, "no rows extracted from {source}"),
            Self::Http { source, message } => write!(f, "http error from {source}: {message}"),
            Self::Timeout { source } => write!(f, "timeout loading {source}"),
            Self::Parse { source, message } => write!(f, "failed to parse {source}: {message}"),
        }
    }
}

impl std::error::Error for ScrapeError {}

impl ScrapeError {
    /// Soft failures produce empty/placeholder data instead of a section
    /// error; hard failures are converted to `{"error": ...}` for the
    /// section that raised them.
    pub fn is_soft(&self) -> bool {
        matches!(self, Self::Empty { .. })
    }

    /// The source name this error was raised for.
    pub fn source_name(&self) -> &str {
        match self {
            Self::Empty { source }
            | Self::Http { source, .. }
            | Self::Timeout { source }
            | Self::Parse { source, .. } => source,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
