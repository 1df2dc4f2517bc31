//! Daily quote history provider.
//!
//! The live implementation queries the Yahoo Finance chart endpoint,
//! which serves JSON without authentication. The trait seam lets every
//! downstream section be tested against canned histories.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::error::ScrapeError;

/// One daily bar. Close is always present; rows with a null close are
/// dropped at the provider boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ohlc {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Daily history for one symbol over a named range ("2d", "6mo").
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn daily_history(&self, symbol: &str, range: &str) -> Result<Vec<Ohlc>, ScrapeError>;
}

// ============================================================================
// Yahoo chart endpoint
// ============================================================================

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize, Default)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Quote provider backed by `query1.finance.yahoo.com`.
pub struct YahooChartProvider {
    client: reqwest::Client,
    base_url: String,
}

impl YahooChartProvider {
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            base_url: "https://query1.finance.yahoo.com".to_string(),
        }
    }

    /// Point the provider at another host (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl QuoteProvider for YahooChartProvider {
    async fn daily_history(&self, symbol: &str, range: &str) -> Result<Vec<Ohlc>, ScrapeError> {
        let url = format!(
            "{}/v8/finance/chart/{}?range={}&interval=1d",
            self.base_url, symbol, range
        );
        debug!(symbol, range, "Fetching quote history");

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                ScrapeError::Timeout {
                    source: symbol.to_string(),
                }
            } else {
                ScrapeError::Http {
                    source: symbol.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Http {
                source: symbol.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        let payload: ChartResponse =
            response.json().await.map_err(|e| ScrapeError::Parse {
                source: symbol.to_string(),
                message: e.to_string(),
            })?;

        if let Some(err) = payload.chart.error {
            return Err(ScrapeError::Http {
                source: symbol.to_string(),
                message: err.description,
            });
        }

        let quote = payload
            .chart
            .result
            .and_then(|mut results| results.drain(..).next())
            .and_then(|r| r.indicators.quote.into_iter().next())
            .ok_or_else(|| ScrapeError::Empty {
                source: symbol.to_string(),
            })?;

        let bars: Vec<Ohlc> = quote
            .close
            .iter()
            .enumerate()
            .filter_map(|(i, close)| {
                let close = (*close)?;
                Some(Ohlc {
                    open: quote.open.get(i).copied().flatten().unwrap_or(close),
                    high: quote.high.get(i).copied().flatten().unwrap_or(close),
                    low: quote.low.get(i).copied().flatten().unwrap_or(close),
                    close,
                })
            })
            .collect();

        if bars.is_empty() {
            return Err(ScrapeError::Empty {
                source: symbol.to_string(),
            });
        }
        Ok(bars)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn chart_body(closes: &[f64]) -> serde_json::Value {
        json!({
            "chart": {
                "result": [{
                    "indicators": {
                        "quote": [{
                            "open": closes,
                            "high": closes,
                            "low": closes,
                            "close": closes,
                        }]
                    }
                }],
                "error": null
            }
        })
    }

    #[tokio::test]
    async fn test_history_parses_bars() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/^NSEI"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chart_body(&[100.0, 101.5])))
            .mount(&server)
            .await;

        let provider =
            YahooChartProvider::new(Duration::from_secs(5)).with_base_url(server.uri());
        let bars = provider.daily_history("^NSEI", "2d").await.unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[1].close, 101.5);
    }

    #[tokio::test]
    async fn test_null_closes_are_dropped() {
        let server = MockServer::start().await;
        let body = json!({
            "chart": {
                "result": [{
                    "indicators": {
                        "quote": [{
                            "open": [1.0, null, 3.0],
                            "high": [1.0, null, 3.0],
                            "low": [1.0, null, 3.0],
                            "close": [1.0, null, 3.0],
                        }]
                    }
                }],
                "error": null
            }
        });
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let provider =
            YahooChartProvider::new(Duration::from_secs(5)).with_base_url(server.uri());
        let bars = provider.daily_history("GC=F", "2d").await.unwrap();
        assert_eq!(bars.len(), 2);
    }

    #[tokio::test]
    async fn test_endpoint_error_surfaces() {
        let server = MockServer::start().await;
        let body = json!({
            "chart": { "result": null, "error": { "code": "Not Found", "description": "No data found" } }
        });
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let provider =
            YahooChartProvider::new(Duration::from_secs(5)).with_base_url(server.uri());
        let err = provider.daily_history("BOGUS", "2d").await.unwrap_err();
        match err {
            ScrapeError::Http { message, .. } => assert!(message.contains("No data found")),
            other => panic!("expected Http error, got {:?}", other),
        }
    }
}
