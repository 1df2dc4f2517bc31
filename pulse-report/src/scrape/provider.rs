//! Provider adapters.
//!
//! A provider adapter owns everything needed to scrape one source: its
//! descriptor and its ordered strategy list. The generic [`PageAdapter`]
//! covers the common page-then-table case; data kinds with bespoke
//! post-processing wrap it or implement [`ProviderAdapter`] directly.

use async_trait::async_trait;
use scraper::Html;
use tracing::info;

use super::fallback::{extract_first, ExtractionStrategy};
use super::fetch::PageFetcher;
use super::SourceDescriptor;
use crate::error::ScrapeError;
use crate::model::RawRecord;

/// One scrapeable source of raw records.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Source name used in logs and provenance fields.
    fn name(&self) -> &str;

    /// Scrape the source once. An exhausted strategy list surfaces as
    /// [`ScrapeError::Empty`].
    async fn fetch(&self, fetcher: &dyn PageFetcher) -> Result<Vec<RawRecord>, ScrapeError>;
}

/// Generic adapter: fetch one page, parse it, run the strategy chain.
pub struct PageAdapter {
    descriptor: SourceDescriptor,
    strategies: Vec<ExtractionStrategy>,
}

impl PageAdapter {
    pub fn new(descriptor: SourceDescriptor, strategies: Vec<ExtractionStrategy>) -> Self {
        Self {
            descriptor,
            strategies,
        }
    }

    pub fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }
}

#[async_trait]
impl ProviderAdapter for PageAdapter {
    fn name(&self) -> &str {
        &self.descriptor.name
    }

    async fn fetch(&self, fetcher: &dyn PageFetcher) -> Result<Vec<RawRecord>, ScrapeError> {
        let body = fetcher
            .fetch_page(&self.descriptor.name, &self.descriptor.url)
            .await?;

        // Parsed documents are not Send; parsing and extraction stay in
        // one synchronous scope with no await in between.
        let records = {
            let doc = Html::parse_document(&body);
            extract_first(&doc, &self.strategies)
        };

        if records.is_empty() {
            return Err(ScrapeError::Empty {
                source: self.descriptor.name.clone(),
            });
        }

        info!(
            source = %self.descriptor.name,
            records = records.len(),
            "Scraped source"
        );
        Ok(records)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrape::fallback::select_table_rows;

    struct CannedFetcher {
        body: String,
    }

    #[async_trait]
    impl PageFetcher for CannedFetcher {
        async fn fetch_page(&self, _source: &str, _url: &str) -> Result<String, ScrapeError> {
            Ok(self.body.clone())
        }
    }

    struct FailingFetcher;

    #[async_trait]
    impl PageFetcher for FailingFetcher {
        async fn fetch_page(&self, source: &str, _url: &str) -> Result<String, ScrapeError> {
            Err(ScrapeError::Timeout {
                source: source.to_string(),
            })
        }
    }

    fn table_adapter() -> PageAdapter {
        let strategies = vec![
            ExtractionStrategy::new("missing-table", |doc: &Html| {
                select_table_rows(doc, "#nope")
                    .into_iter()
                    .map(|cells| {
                        let mut r = RawRecord::new();
                        r.insert_str("first", cells[0].clone());
                        r
                    })
                    .collect()
            }),
            ExtractionStrategy::new("plain-table", |doc: &Html| {
                select_table_rows(doc, "table")
                    .into_iter()
                    .map(|cells| {
                        let mut r = RawRecord::new();
                        r.insert_str("first", cells[0].clone());
                        r
                    })
                    .collect()
            }),
        ];
        PageAdapter::new(
            SourceDescriptor::new("Test", "http://example.invalid"),
            strategies,
        )
    }

    #[tokio::test]
    async fn test_falls_through_to_working_strategy() {
        let fetcher = CannedFetcher {
            body: "<table><tr><td>IT</td></tr><tr><td>Energy</td></tr></table>".into(),
        };
        let records = table_adapter().fetch(&fetcher).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get_str("first"), Some("IT"));
    }

    #[tokio::test]
    async fn test_exhausted_strategies_yield_empty_error() {
        let fetcher = CannedFetcher {
            body: "<div>no tables at all</div>".into(),
        };
        let err = table_adapter().fetch(&fetcher).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Empty { .. }));
        assert!(err.is_soft());
    }

    #[tokio::test]
    async fn test_transport_errors_pass_through() {
        let err = table_adapter().fetch(&FailingFetcher).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Timeout { .. }));
        assert_eq!(err.source_name(), "Test");
    }
}
