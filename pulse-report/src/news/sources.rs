//! News site profiles and the generic article adapter.
//!
//! Each supported site carries ordered selector chains for the article
//! container, title, and summary. Unknown hosts fall back to a generic
//! profile. The per-site chains are tried first; the generic chains
//! back them up container by container.

use scraper::{ElementRef, Html, Selector};

use super::{NewsArticle, NO_SUMMARY};
use crate::model::RawRecord;
use crate::scrape::fallback::{element_text, first_text_match};
use crate::scrape::{ExtractionStrategy, PageAdapter, SourceDescriptor};

pub const DEFAULT_NEWS_URLS: [&str; 2] = [
    "https://www.cnbc.com/finance/",
    "https://www.financialexpress.com/market/",
];

/// Articles taken from one source page per scrape.
const MAX_ARTICLES_PER_SOURCE: usize = 20;

/// Shortest summary text considered usable.
const MIN_SUMMARY_LEN: usize = 15;

// ============================================================================
// Site profiles
// ============================================================================

/// Selector chains for one news site layout.
pub struct SiteProfile {
    pub name: &'static str,
    pub containers: &'static [&'static str],
    pub titles: &'static [&'static str],
    pub summaries: &'static [&'static str],
}

static YAHOO_FINANCE: SiteProfile = SiteProfile {
    name: "yahoo_finance",
    containers: &["li.js-stream-content", "div.Ov\\(h\\)", "div.NewsArticle"],
    titles: &["h3", "a[data-test='mega-item-header']", "h2 a"],
    summaries: &["p", "div[data-test='story-body']", "div.summary"],
};

static REUTERS: SiteProfile = SiteProfile {
    name: "reuters",
    containers: &["div.story-card", "article", "div.media-story-card"],
    titles: &[
        "h3.text-heading-label",
        "div.heading",
        "div.media-story-card__heading",
    ],
    summaries: &[
        "p.text-paragraph",
        "div.standfirst",
        "div.media-story-card__description",
    ],
};

static CNBC: SiteProfile = SiteProfile {
    name: "cnbc",
    containers: &[
        "div.Card-standardBreakerCard",
        "div.Card",
        "div.SearchResult-searchResult",
    ],
    titles: &[
        "a.Card-title",
        "div.Card-titleContainer",
        "div.SearchResult-searchResultTitle",
    ],
    summaries: &["div.Card-description", "p", "div.SearchResult-searchResultCard div"],
};

static FINANCIAL_EXPRESS: SiteProfile = SiteProfile {
    name: "financial_express",
    containers: &["div.stories-card", "div.ie-stories", "div.article-list", "article"],
    titles: &["h3.title", "h4.entry-title a", "h2 a", "h3 a"],
    summaries: &["p.excerpt", "div.excerpt", "p", "div.story-short"],
};

static DEFAULT_PROFILE: SiteProfile = SiteProfile {
    name: "default",
    containers: &[
        "article",
        "div.article",
        "div.card",
        "div.post",
        "div.item",
        "div.story",
        "div.news-item",
        ".story-card",
        ".news-card",
    ],
    titles: &["h1", "h2", "h3", "h4", "a.title", "div.title", "a.headline"],
    summaries: &[
        "p",
        "div.summary",
        "div.excerpt",
        "div.description",
        "div.content",
        ".synopsis",
        ".summary",
    ],
};

/// The layout profile to use for a URL.
pub fn profile_for(url: &str) -> &'static SiteProfile {
    if url.contains("finance.yahoo.com") {
        &YAHOO_FINANCE
    } else if url.contains("reuters.com") {
        &REUTERS
    } else if url.contains("cnbc.com") {
        &CNBC
    } else if url.contains("financialexpress.com") {
        &FINANCIAL_EXPRESS
    } else {
        &DEFAULT_PROFILE
    }
}

/// Human-readable source name for a URL, used in bullets and logs.
pub fn source_name(url: &str) -> &'static str {
    if url.contains("finance.yahoo.com") {
        "Yahoo Finance"
    } else if url.contains("reuters.com") {
        "Reuters"
    } else if url.contains("cnbc.com") {
        "CNBC"
    } else if url.contains("financialexpress.com") {
        "Financial Express"
    } else {
        "Unknown Source"
    }
}

// ============================================================================
// Adapter
// ============================================================================

/// Article adapter for a news URL: the site profile is the primary
/// strategy, the generic profile the fallback.
pub fn news_adapter(url: &str) -> PageAdapter {
    let profile = profile_for(url);
    let source = source_name(url);

    let mut strategies = vec![ExtractionStrategy::new(
        format!("news profile {}", profile.name),
        move |doc: &Html| extract_articles(doc, profile, source),
    )];

    if !std::ptr::eq(profile, &DEFAULT_PROFILE) {
        strategies.push(ExtractionStrategy::new(
            "news profile default",
            move |doc: &Html| extract_articles(doc, &DEFAULT_PROFILE, source),
        ));
    }

    PageAdapter::new(SourceDescriptor::new(source, url), strategies)
}

fn extract_articles(doc: &Html, profile: &SiteProfile, source: &str) -> Vec<RawRecord> {
    let mut containers: Vec<ElementRef<'_>> = Vec::new();
    for raw in profile.containers {
        let Ok(sel) = Selector::parse(raw) else {
            continue;
        };
        containers.extend(doc.select(&sel));
    }

    containers
        .into_iter()
        .take(MAX_ARTICLES_PER_SOURCE)
        .filter_map(|container| extract_article(&container, profile, source))
        .collect()
}

fn extract_article(
    container: &ElementRef<'_>,
    profile: &SiteProfile,
    source: &str,
) -> Option<RawRecord> {
    // Title from the site chain, generic chain as backstop. No title
    // means the container was not an article.
    let title = first_text_match(container, profile.titles)
        .or_else(|| first_text_match(container, DEFAULT_PROFILE.titles))?;

    let summary = first_summary_match(container, profile.summaries)
        .or_else(|| first_summary_match(container, DEFAULT_PROFILE.summaries))
        .unwrap_or_else(|| NO_SUMMARY.to_string());

    let mut record = RawRecord::new();
    record.insert_str("title", title);
    record.insert_str("summary", summary);
    record.insert_str("source", source);
    Some(record)
}

/// Like [`first_text_match`] but rejects texts too short to be a real
/// summary (bylines, timestamps).
fn first_summary_match(root: &ElementRef<'_>, selectors: &[&str]) -> Option<String> {
    for raw in selectors {
        let Ok(sel) = Selector::parse(raw) else {
            continue;
        };
        for el in root.select(&sel) {
            let text = element_text(&el);
            if text.len() > MIN_SUMMARY_LEN {
                return Some(text);
            }
        }
    }
    None
}

/// Lift raw article records into typed articles. Records without a
/// title are dropped.
pub fn articles_from_records(raw: Vec<RawRecord>) -> Vec<NewsArticle> {
    raw.into_iter()
        .filter_map(|record| {
            Some(NewsArticle::new(
                record.get_str("title")?.to_string(),
                record
                    .get_str("summary")
                    .unwrap_or(NO_SUMMARY)
                    .to_string(),
                record.get_str("source")?.to_string(),
            ))
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScrapeError;
    use crate::scrape::{PageFetcher, ProviderAdapter};
    use async_trait::async_trait;

    struct CannedFetcher(String);

    #[async_trait]
    impl PageFetcher for CannedFetcher {
        async fn fetch_page(&self, _source: &str, _url: &str) -> Result<String, ScrapeError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_profile_and_source_resolution() {
        assert_eq!(profile_for("https://www.cnbc.com/finance/").name, "cnbc");
        assert_eq!(source_name("https://www.cnbc.com/finance/"), "CNBC");
        assert_eq!(
            source_name("https://www.financialexpress.com/market/"),
            "Financial Express"
        );
        assert_eq!(profile_for("https://example.com/news").name, "default");
        assert_eq!(source_name("https://example.com/news"), "Unknown Source");
    }

    #[tokio::test]
    async fn test_cnbc_articles_extracted() {
        let html = r#"
            <div class="Card">
              <a class="Card-title">Fed holds rates steady</a>
              <div class="Card-description">The central bank left policy unchanged for a third meeting.</div>
            </div>
            <div class="Card">
              <a class="Card-title">Banks rally on earnings</a>
            </div>"#;

        let adapter = news_adapter("https://www.cnbc.com/finance/");
        let raw = adapter.fetch(&CannedFetcher(html.into())).await.unwrap();
        let articles = articles_from_records(raw);

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "Fed holds rates steady");
        assert!(articles[0].summary.starts_with("The central bank"));
        assert_eq!(articles[0].source, "CNBC");
        // No usable summary in the second card.
        assert_eq!(articles[1].summary, NO_SUMMARY);
    }

    #[tokio::test]
    async fn test_generic_profile_backstops_unknown_layout() {
        // Nothing matches the CNBC chains; the generic article profile
        // still finds the story.
        let html = r#"
            <article>
              <h3>Oil slips on demand worries</h3>
              <p>Crude prices fell as traders weighed fresh inventory data.</p>
            </article>"#;

        let adapter = news_adapter("https://www.cnbc.com/finance/");
        let raw = adapter.fetch(&CannedFetcher(html.into())).await.unwrap();
        let articles = articles_from_records(raw);

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Oil slips on demand worries");
        assert_eq!(articles[0].source, "CNBC");
    }

    #[tokio::test]
    async fn test_short_summary_rejected() {
        let html = r#"
            <article>
              <h3>Markets open flat</h3>
              <p>2 min read</p>
            </article>"#;

        let adapter = news_adapter("https://example.com/news");
        let raw = adapter.fetch(&CannedFetcher(html.into())).await.unwrap();
        let articles = articles_from_records(raw);

        assert_eq!(articles[0].summary, NO_SUMMARY);
    }

    #[tokio::test]
    async fn test_no_articles_is_soft_empty() {
        let adapter = news_adapter("https://www.cnbc.com/finance/");
        let err = adapter
            .fetch(&CannedFetcher("<div>nothing here</div>".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::Empty { .. }));
    }
}
