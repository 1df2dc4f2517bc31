//! Resilient scraping layer.
//!
//! A provider is one external website scraped for one data kind. Each
//! provider is described by a [`SourceDescriptor`] plus an ordered list of
//! extraction strategies; adding a new source means adding a descriptor,
//! not modifying pipeline logic.

pub mod fallback;
pub mod fetch;
pub mod provider;

pub use fallback::{extract_first, ExtractionStrategy};
pub use fetch::{HttpPageFetcher, PageFetcher, RetryPolicy};
pub use provider::{PageAdapter, ProviderAdapter};

use serde::{Deserialize, Serialize};

/// Identifies one external source: a human-readable name plus the URL to
/// scrape. The strategy list lives with the adapter built from this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// Source name used in logs and provenance fields (e.g. "Trendlyne")
    pub name: String,
    /// Page URL
    pub url: String,
}

impl SourceDescriptor {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}
