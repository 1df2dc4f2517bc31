//! Keyword-based news classification.
//!
//! Articles are routed into three buckets by substring matching over the
//! lowercased title and summary. Priority is fixed: market-impact
//! keywords first, then India-specific, then global. An article matching
//! nothing defaults to the impact bucket when it came from a major wire
//! source, global otherwise.

use super::{NewsArticle, NewsHighlights, NO_SUMMARY};

/// Immutable keyword configuration. Built once and shared; the keyword
/// lists are never mutated after construction.
pub struct ClassifierConfig {
    pub impact_keywords: Vec<&'static str>,
    pub india_keywords: Vec<&'static str>,
    pub global_keywords: Vec<&'static str>,
    /// Sources whose unmatched articles default to the impact bucket.
    pub major_sources: Vec<&'static str>,
    /// Per-bucket cap on emitted bullet lines.
    pub max_per_category: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            impact_keywords: vec![
                "policy",
                "regulation",
                "economy",
                "inflation",
                "recession",
                "central bank",
                "fed",
                "federal reserve",
                "interest rate",
                "gdp",
                "treasury",
                "economic growth",
                "fiscal",
                "monetary",
                "budget",
                "minister",
                "government",
                "tax",
                "deficit",
                "stimulus",
                "debt",
                "tariff",
                "market crash",
                "rally",
                "volatility",
                "crisis",
                "emergency",
                "warning",
                "alert",
                "critical",
                "major",
                "significant",
                "breakthrough",
                "disruption",
                "transformation",
                "revolution",
            ],
            india_keywords: vec![
                "india",
                "indian",
                "mumbai",
                "delhi",
                "bse",
                "nse",
                "sensex",
                "nifty",
                "rupee",
                "rbi",
                "sebi",
                "finance minister",
                "pm modi",
                "government of india",
                "indian economy",
                "indian market",
                "indian stock",
                "indian rupee",
                "indian banks",
                "indian companies",
            ],
            global_keywords: vec![
                "global",
                "world",
                "international",
                "foreign",
                "overseas",
                "europe",
                "asia",
                "america",
                "china",
                "japan",
                "uk",
                "us",
                "european",
                "asian",
                "american",
                "foreign exchange",
                "forex",
                "global market",
                "world economy",
                "international trade",
                "global economy",
                "world market",
            ],
            major_sources: vec!["Reuters", "CNBC", "Financial Express"],
            max_per_category: 7,
        }
    }
}

/// Routes articles into highlight buckets using a [`ClassifierConfig`].
pub struct NewsClassifier {
    config: ClassifierConfig,
}

impl NewsClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn classify(&self, articles: &[NewsArticle]) -> NewsHighlights {
        let mut highlights = NewsHighlights::default();

        for article in articles {
            let title = article.title.to_lowercase();
            // The sentinel summary must not participate in matching.
            let summary = if article.summary == NO_SUMMARY {
                String::new()
            } else {
                article.summary.to_lowercase()
            };

            let bullet = article.bullet();

            if matches_any(&self.config.impact_keywords, &title, &summary) {
                highlights.impact.push(bullet);
            } else if matches_any(&self.config.india_keywords, &title, &summary) {
                highlights.india.push(bullet);
            } else if matches_any(&self.config.global_keywords, &title, &summary) {
                highlights.global.push(bullet);
            } else if self
                .config
                .major_sources
                .iter()
                .any(|s| *s == article.source)
            {
                highlights.impact.push(bullet);
            } else {
                highlights.global.push(bullet);
            }
        }

        highlights.impact.truncate(self.config.max_per_category);
        highlights.india.truncate(self.config.max_per_category);
        highlights.global.truncate(self.config.max_per_category);
        highlights
    }
}

fn matches_any(keywords: &[&str], title: &str, summary: &str) -> bool {
    keywords
        .iter()
        .any(|kw| title.contains(kw) || summary.contains(kw))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> NewsClassifier {
        NewsClassifier::new(ClassifierConfig::default())
    }

    fn article(title: &str, summary: &str, source: &str) -> NewsArticle {
        NewsArticle::new(title, summary, source)
    }

    #[test]
    fn test_impact_outranks_india_and_global() {
        let articles = [article(
            "RBI policy decision shakes global markets",
            NO_SUMMARY,
            "CNBC",
        )];
        let out = classifier().classify(&articles);

        assert_eq!(out.impact.len(), 1);
        assert!(out.india.is_empty());
        assert!(out.global.is_empty());
        assert_eq!(
            out.impact[0],
            "RBI policy decision shakes global markets (Source: CNBC)"
        );
    }

    #[test]
    fn test_india_before_global() {
        let articles = [article("Sensex gains as Asia watches", NO_SUMMARY, "CNBC")];
        let out = classifier().classify(&articles);
        assert_eq!(out.india.len(), 1);
        assert!(out.global.is_empty());
    }

    #[test]
    fn test_summary_participates_in_matching() {
        let articles = [article(
            "Quiet session for equities",
            "Traders cited the falling rupee as the main driver.",
            "Yahoo Finance",
        )];
        let out = classifier().classify(&articles);
        assert_eq!(out.india.len(), 1);
    }

    #[test]
    fn test_sentinel_summary_does_not_match() {
        // "available" must not trip any keyword via the sentinel text.
        let articles = [article("Quiet corporate earnings roundup", NO_SUMMARY, "Blog")];
        let out = classifier().classify(&articles);
        assert!(out.india.is_empty());
        assert_eq!(out.global.len(), 1);
    }

    #[test]
    fn test_unmatched_major_source_defaults_to_impact() {
        let articles = [
            article("Quarterly earnings roundup", NO_SUMMARY, "Reuters"),
            article("Quarterly earnings roundup", NO_SUMMARY, "Some Blog"),
        ];
        let out = classifier().classify(&articles);
        assert_eq!(out.impact.len(), 1);
        assert_eq!(out.global.len(), 1);
    }

    #[test]
    fn test_buckets_capped_at_seven() {
        let articles: Vec<NewsArticle> = (0..12)
            .map(|i| article(&format!("Inflation print number {i}"), NO_SUMMARY, "CNBC"))
            .collect();
        let out = classifier().classify(&articles);
        assert_eq!(out.impact.len(), 7);
    }

    #[test]
    fn test_empty_input() {
        let out = classifier().classify(&[]);
        assert!(out.impact.is_empty() && out.india.is_empty() && out.global.is_empty());
    }
}
