//! Composite report orchestration.
//!
//! One `generate()` call runs the six data sections concurrently, merges
//! them into a [`CompositeDocument`], then runs the two enrichment
//! sections (analysis, then summary-of-analysis) sequentially. A section
//! failure is recorded as that section's error placeholder and never
//! propagates to its siblings; the run itself always completes.

use chrono::{Local, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use pulse_common::config::{Config, ReportConfig};

use crate::insight::{
    self, InsightClient, INSTITUTIONAL_INSIGHTS_UNAVAILABLE, OVERVIEW_INSIGHTS_UNAVAILABLE,
    PERFORMERS_INSIGHTS_SKIPPED, SECTOR_INSIGHTS_UNAVAILABLE, SNAPSHOT_INSIGHTS_UNAVAILABLE,
};
use crate::market::overview::{fetch_overview, overview_digest, OVERVIEW_SYMBOLS};
use crate::market::performers::{
    force_negative, performer_records, performers_adapter, GAINERS_URL, LOSERS_URL,
};
use crate::market::snapshot::{fetch_snapshot, previous_trading_day};
use crate::market::{indicators, QuoteProvider, YahooChartProvider};
use crate::model::{CompositeDocument, GenerationStatus, RawRecord, Section};
use crate::news::sources::{articles_from_records, news_adapter, source_name, DEFAULT_NEWS_URLS};
use crate::news::{ClassifierConfig, NewsClassifier};
use crate::scrape::{
    HttpPageFetcher, PageAdapter, PageFetcher, ProviderAdapter, RetryPolicy,
};
use crate::sector::sources::{
    institutional_adapter, institutional_reading, sector_records, trendlyne_sector_adapter,
    DEFAULT_INSTITUTIONAL_URLS, DEFAULT_SECTOR_URL,
};
use crate::sector::{combine_institutional, SectorNormalizer, SectorTaxonomy};

/// Drives one full report generation.
pub struct ReportOrchestrator {
    fetcher: Arc<dyn PageFetcher>,
    quotes: Arc<dyn QuoteProvider>,
    insight: Option<InsightClient>,
    retry: RetryPolicy,
    report: ReportConfig,
    classifier: NewsClassifier,
}

impl ReportOrchestrator {
    /// Build the orchestrator from loaded configuration, wiring live
    /// HTTP providers.
    pub fn from_config(config: &Config) -> Self {
        let report = config.report_config();
        let timeout = Duration::from_secs(report.fetch_timeout_secs);
        let insight = config
            .gemini_api_key()
            .map(|key| InsightClient::new(key, timeout));
        if insight.is_none() {
            warn!("No Gemini API key configured, insight sections will use placeholders");
        }

        Self {
            fetcher: Arc::new(HttpPageFetcher::new(timeout)),
            quotes: Arc::new(YahooChartProvider::new(timeout)),
            insight,
            retry: RetryPolicy::new(
                report.retry_max_attempts,
                Duration::from_secs(report.retry_backoff_secs),
            ),
            report,
            classifier: NewsClassifier::new(ClassifierConfig::default()),
        }
    }

    /// Fully-injected constructor (tests).
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        quotes: Arc<dyn QuoteProvider>,
        insight: Option<InsightClient>,
        retry: RetryPolicy,
        report: ReportConfig,
    ) -> Self {
        Self {
            fetcher,
            quotes,
            insight,
            retry,
            report,
            classifier: NewsClassifier::new(ClassifierConfig::default()),
        }
    }

    /// Generate the composite report document.
    pub async fn generate(&self) -> CompositeDocument {
        info!("Generating composite market report");
        let mut document = CompositeDocument::new();

        let (sector, news, indicators, snapshot, overview, performers) = tokio::join!(
            self.sector_and_fii_section(),
            self.news_section(),
            self.indicators_section(),
            self.snapshot_section(),
            self.overview_section(),
            self.performers_section(),
        );

        document.insert_section(Section::SectorAndFii, sector);
        document.insert_section(Section::NewsHighlights, news);
        document.insert_section(Section::FinancialIndicators, indicators);
        document.insert_section(Section::MarketSnapshot, snapshot);
        document.insert_section(Section::MarketOverview, overview);
        document.insert_section(Section::TopPerformers, performers);
        document.set_meta(GenerationStatus::InProgress);

        self.enrich(&mut document).await;

        document.set_meta(GenerationStatus::Complete);
        info!("Composite market report complete");
        document
    }

    /// Generate the analysis and summary sections over the assembled
    /// data. The summary requires a successful analysis.
    async fn enrich(&self, document: &mut CompositeDocument) {
        let data = document.to_value();

        let analysis = match &self.insight {
            Some(client) => {
                info!("Generating market analysis");
                client.generate(&insight::market_analysis_prompt(&data)).await
            }
            None => Err(anyhow::anyhow!("an API key is required for analysis generation")),
        };

        match &analysis {
            Ok(text) => document.insert_section(
                Section::MarketAnalysis,
                Ok(json!({
                    "analysis": text,
                    "timestamp": Utc::now().to_rfc3339(),
                })),
            ),
            Err(e) => document.insert_section(
                Section::MarketAnalysis,
                Err(anyhow::anyhow!("{e}")),
            ),
        }

        let summary = match (&self.insight, &analysis) {
            (Some(client), Ok(analysis_text)) => {
                info!("Generating market summary");
                client
                    .generate(&insight::market_summary_prompt(&data, analysis_text))
                    .await
                    .map(|text| {
                        json!({
                            "content": text,
                            "timestamp": Utc::now().to_rfc3339(),
                        })
                    })
            }
            _ => Err(anyhow::anyhow!("cannot generate summary without successful analysis")),
        };
        document.insert_section(Section::Summary, summary);
    }

    // ========================================================================
    // Data sections
    // ========================================================================

    /// Retry-wrapped scrape where an exhausted strategy list degrades to
    /// zero rows instead of an error.
    async fn scrape_or_empty(&self, adapter: &PageAdapter) -> anyhow::Result<Vec<RawRecord>> {
        match self
            .retry
            .run(adapter.name(), || adapter.fetch(self.fetcher.as_ref()))
            .await
        {
            Ok(rows) => Ok(rows),
            Err(e) if e.is_soft() => {
                warn!(source = e.source_name(), "Scrape produced no rows");
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn sector_and_fii_section(&self) -> anyhow::Result<Value> {
        let sector_url = self
            .report
            .sector_url
            .as_deref()
            .unwrap_or(DEFAULT_SECTOR_URL);
        let adapter = trendlyne_sector_adapter(sector_url);
        let raw = self.scrape_or_empty(&adapter).await?;
        let rows = sector_records(raw, adapter.name());

        let normalizer = SectorNormalizer::new(SectorTaxonomy::default());
        let sectors = normalizer.normalize(rows);
        info!(sectors = sectors.len(), "Scraped sector data");

        let institutional_urls: Vec<String> = match &self.report.institutional_urls {
            Some(urls) => urls.clone(),
            None => DEFAULT_INSTITUTIONAL_URLS
                .iter()
                .map(|u| u.to_string())
                .collect(),
        };

        let mut readings = Vec::new();
        for url in &institutional_urls {
            let adapter = institutional_adapter(url);
            match self.scrape_or_empty(&adapter).await {
                Ok(raw) => {
                    if let Some(reading) =
                        raw.first().and_then(|r| institutional_reading(r, adapter.name()))
                    {
                        readings.push(reading);
                    }
                }
                Err(e) => {
                    warn!(source = adapter.name(), error = %e, "Institutional scrape failed");
                }
            }
        }
        let institutional = combine_institutional(readings);

        let sector_insight = match &self.insight {
            Some(client) => client
                .generate(&insight::sector_insights_prompt(&sectors))
                .await
                .unwrap_or_else(|e| format!("Sector insights generation failed: {e}")),
            None => SECTOR_INSIGHTS_UNAVAILABLE.to_string(),
        };
        let institutional_insight = match &self.insight {
            Some(client) => client
                .generate(&insight::institutional_insights_prompt(&institutional))
                .await
                .unwrap_or_else(|e| format!("Institutional insights generation failed: {e}")),
            None => INSTITUTIONAL_INSIGHTS_UNAVAILABLE.to_string(),
        };

        Ok(json!({
            "sector_movement": {
                "data": sectors,
                "insight": sector_insight,
            },
            "institutional_activity": {
                "data": institutional,
                "insight": institutional_insight,
            },
        }))
    }

    async fn news_section(&self) -> anyhow::Result<Value> {
        let urls: Vec<String> = match &self.report.news_urls {
            Some(urls) => urls.clone(),
            None => DEFAULT_NEWS_URLS.iter().map(|u| u.to_string()).collect(),
        };

        let mut articles = Vec::new();
        let mut failed_sources = Vec::new();
        for url in &urls {
            let adapter = news_adapter(url);
            match self
                .retry
                .run(adapter.name(), || adapter.fetch(self.fetcher.as_ref()))
                .await
            {
                Ok(raw) => {
                    let scraped = articles_from_records(raw);
                    info!(source = source_name(url), articles = scraped.len(), "Scraped articles");
                    articles.extend(scraped);
                }
                Err(e) => {
                    warn!(source = source_name(url), error = %e, "News scrape failed");
                    failed_sources.push(source_name(url).to_string());
                }
            }
        }

        if articles.is_empty() {
            anyhow::bail!(
                "Failed to scrape any articles. Failed sources: {}",
                failed_sources.join(", ")
            );
        }

        let highlights = self.classifier.classify(&articles);
        Ok(json!({
            "timestamp": Utc::now().to_rfc3339(),
            "impact": highlights.impact,
            "india": highlights.india,
            "global": highlights.global,
        }))
    }

    async fn indicators_section(&self) -> anyhow::Result<Value> {
        let dashboard = indicators::fetch_indicators(self.quotes.as_ref()).await;
        Ok(json!({ "indicators": dashboard }))
    }

    async fn snapshot_section(&self) -> anyhow::Result<Value> {
        let snapshot = fetch_snapshot(self.quotes.as_ref()).await;
        if snapshot.is_empty() {
            anyhow::bail!("No stock data available");
        }

        let insights = match &self.insight {
            Some(client) => match client
                .generate(&insight::snapshot_insights_prompt(&snapshot))
                .await
            {
                Ok(text) => insight::clean_insight_lines(&text),
                Err(e) => vec![format!("Snapshot insights generation failed: {e}")],
            },
            None => vec![SNAPSHOT_INSIGHTS_UNAVAILABLE.to_string()],
        };

        Ok(json!({
            "date": previous_trading_day(),
            "snapshot": snapshot,
            "insights": insights,
        }))
    }

    async fn overview_section(&self) -> anyhow::Result<Value> {
        let symbols: Vec<String> = match &self.report.overview_symbols {
            Some(symbols) => symbols.clone(),
            None => OVERVIEW_SYMBOLS.iter().map(|s| s.to_string()).collect(),
        };
        let market_data = fetch_overview(self.quotes.as_ref(), &symbols).await;

        let insights = match &self.insight {
            Some(client) => client
                .generate(&insight::overview_insights_prompt(&overview_digest(&market_data)))
                .await
                .unwrap_or_else(|_| OVERVIEW_INSIGHTS_UNAVAILABLE.to_string()),
            None => OVERVIEW_INSIGHTS_UNAVAILABLE.to_string(),
        };

        Ok(json!({
            "market_data": market_data,
            "insights": insights,
        }))
    }

    async fn performers_section(&self) -> anyhow::Result<Value> {
        let gainers_adapter = performers_adapter("Trendlyne Gainers", GAINERS_URL);
        let losers_adapter = performers_adapter("Trendlyne Losers", LOSERS_URL);

        let gainers = match self.scrape_or_empty(&gainers_adapter).await {
            Ok(raw) => performer_records(raw),
            Err(e) => {
                warn!(error = %e, "Gainers scrape failed");
                Vec::new()
            }
        };
        let mut losers = match self.scrape_or_empty(&losers_adapter).await {
            Ok(raw) => performer_records(raw),
            Err(e) => {
                warn!(error = %e, "Losers scrape failed");
                Vec::new()
            }
        };
        force_negative(&mut losers);
        info!(gainers = gainers.len(), losers = losers.len(), "Scraped top performers");

        let insight_text = match &self.insight {
            Some(client) => {
                let date = Local::now().format("%Y-%m-%d").to_string();
                client
                    .generate(&insight::performers_insights_prompt(&gainers, &losers, &date))
                    .await
                    .unwrap_or_else(|e| format!("Error generating insights: {e}"))
            }
            None => PERFORMERS_INSIGHTS_SKIPPED.to_string(),
        };

        Ok(json!({
            "top_gainers": gainers,
            "top_losers": losers,
            "insight": insight_text,
        }))
    }
}

// ============================================================================
// Tests
// ============================================================================
