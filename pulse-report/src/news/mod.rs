//! Financial news scraping and classification.

pub mod classify;
pub mod sources;

pub use classify::{ClassifierConfig, NewsClassifier};

use serde::{Deserialize, Serialize};

/// Sentinel summary for articles whose container carried no usable
/// summary text.
pub const NO_SUMMARY: &str = "No summary available";

/// One scraped article.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsArticle {
    pub title: String,
    pub summary: String,
    pub source: String,
}

impl NewsArticle {
    pub fn new(
        title: impl Into<String>,
        summary: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
            source: source.into(),
        }
    }

    /// Rendered bullet line for the highlights payload.
    pub fn bullet(&self) -> String {
        format!("{} (Source: {})", self.title, self.source)
    }
}

/// Classified highlight buckets, each a capped list of bullet lines.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct NewsHighlights {
    pub impact: Vec<String>,
    pub india: Vec<String>,
    pub global: Vec<String>,
}
