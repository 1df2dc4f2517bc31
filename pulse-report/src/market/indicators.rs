//! Financial indicator dashboard.
//!
//! A fixed basket of global references: three equity indices, Brent
//! crude, MCX gold (derived from the dollar gold future), the USD/INR
//! rate, and the India 10Y yield. Each indicator is presented as a
//! formatted value, a percent change against the prior session, and a
//! one-word remark. A symbol that cannot be fetched renders as an
//! unavailable entry rather than failing the section.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use super::quotes::QuoteProvider;
use super::round2;

/// USD to INR conversion used for the MCX gold derivation. A fixed rate
/// keeps the derivation independent of the currency fetch.
const GOLD_USD_INR: f64 = 75.0;

/// Static India 10Y yield pair (current, previous). No free quote
/// source covers Indian government bonds.
const INDIA_10Y: (f64, f64) = (7.15, 7.10);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndicatorReading {
    pub value: String,
    pub percent_change: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

impl IndicatorReading {
    fn unavailable() -> Self {
        Self {
            value: "N/A".to_string(),
            percent_change: "N/A".to_string(),
            remarks: Some("Data unavailable".to_string()),
        }
    }
}

fn percent_change(current: f64, previous: f64) -> String {
    if previous == 0.0 {
        return "N/A".to_string();
    }
    format!("{:.2}%", (current - previous) / previous * 100.0)
}

fn up_down(current: f64, previous: f64) -> String {
    if current > previous { "Up" } else { "Down" }.to_string()
}

/// Last two session closes for a symbol, newest last.
async fn two_closes(provider: &dyn QuoteProvider, symbol: &str) -> Option<(f64, f64)> {
    match provider.daily_history(symbol, "2d").await {
        Ok(bars) if bars.len() >= 2 => {
            Some((bars[bars.len() - 2].close, bars[bars.len() - 1].close))
        }
        Ok(_) => {
            warn!(symbol, "Insufficient history for indicator");
            None
        }
        Err(e) => {
            warn!(symbol, error = %e, "Indicator fetch failed");
            None
        }
    }
}

/// Assemble the full indicator dashboard, keyed by display name.
pub async fn fetch_indicators(provider: &dyn QuoteProvider) -> Map<String, Value> {
    let mut indicators = Map::new();

    let indices = [
        ("^DJI", "Dow Jones"),
        ("^IXIC", "Nasdaq"),
        ("^N225", "Nikkei"),
    ];
    for (symbol, name) in indices {
        let reading = match two_closes(provider, symbol).await {
            Some((prev, current)) => IndicatorReading {
                value: format!("{}", round2(current)),
                percent_change: percent_change(current, prev),
                remarks: Some(up_down(current, prev)),
            },
            None => IndicatorReading::unavailable(),
        };
        insert(&mut indicators, name, reading);
    }

    let crude = match two_closes(provider, "BZ=F").await {
        Some((prev, current)) => IndicatorReading {
            value: format!("${}", round2(current)),
            percent_change: percent_change(current, prev),
            remarks: Some(up_down(current, prev)),
        },
        None => IndicatorReading::unavailable(),
    };
    insert(&mut indicators, "Crude Oil (Brent)", crude);

    // Gold future is quoted in USD/oz; present it as INR per 10 grams.
    let gold = match two_closes(provider, "GC=F").await {
        Some((prev_usd, current_usd)) => {
            let current = current_usd * GOLD_USD_INR / 10.0;
            let prev = prev_usd * GOLD_USD_INR / 10.0;
            IndicatorReading {
                value: format!("INR{}/10g", round2(current)),
                percent_change: percent_change(current, prev),
                remarks: Some(up_down(current, prev)),
            }
        }
        None => IndicatorReading::unavailable(),
    };
    insert(&mut indicators, "Gold (MCX)", gold);

    // The currency feed quotes the pair inverted; the reciprocal is the
    // published rate.
    let currency = match two_closes(provider, "INR=X").await {
        Some((prev_raw, current_raw)) if prev_raw != 0.0 && current_raw != 0.0 => {
            let current = 1.0 / current_raw;
            let prev = 1.0 / prev_raw;
            IndicatorReading {
                value: format!("{}", round2(current)),
                percent_change: percent_change(current, prev),
                remarks: Some(
                    if current > prev {
                        "INR weakened"
                    } else {
                        "INR strengthened"
                    }
                    .to_string(),
                ),
            }
        }
        _ => IndicatorReading::unavailable(),
    };
    insert(&mut indicators, "USD/INR", currency);

    let (current_yield, prev_yield) = INDIA_10Y;
    insert(
        &mut indicators,
        "India 10Y Yield",
        IndicatorReading {
            value: format!("{}%", current_yield),
            percent_change: percent_change(current_yield, prev_yield),
            remarks: Some(up_down(current_yield, prev_yield)),
        },
    );

    indicators
}

fn insert(map: &mut Map<String, Value>, name: &str, reading: IndicatorReading) {
    map.insert(
        name.to_string(),
        serde_json::to_value(reading).unwrap_or(Value::Null),
    );
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScrapeError;
    use crate::market::quotes::Ohlc;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct CannedQuotes {
        closes: HashMap<&'static str, Vec<f64>>,
    }

    #[async_trait]
    impl QuoteProvider for CannedQuotes {
        async fn daily_history(
            &self,
            symbol: &str,
            _range: &str,
        ) -> Result<Vec<Ohlc>, ScrapeError> {
            match self.closes.get(symbol) {
                Some(closes) => Ok(closes
                    .iter()
                    .map(|&c| Ohlc {
                        open: c,
                        high: c,
                        low: c,
                        close: c,
                    })
                    .collect()),
                None => Err(ScrapeError::Http {
                    source: symbol.to_string(),
                    message: "no data".to_string(),
                }),
            }
        }
    }

    fn provider() -> CannedQuotes {
        let mut closes = HashMap::new();
        closes.insert("^DJI", vec![40000.0, 40400.0]);
        closes.insert("^IXIC", vec![18000.0, 17820.0]);
        closes.insert("BZ=F", vec![80.0, 82.0]);
        closes.insert("GC=F", vec![2000.0, 2020.0]);
        closes.insert("INR=X", vec![0.0120, 0.0119]);
        CannedQuotes { closes }
    }

    #[tokio::test]
    async fn test_dashboard_values_and_remarks() {
        let indicators = fetch_indicators(&provider()).await;

        assert_eq!(indicators["Dow Jones"]["value"], "40400");
        assert_eq!(indicators["Dow Jones"]["percent_change"], "1.00%");
        assert_eq!(indicators["Dow Jones"]["remarks"], "Up");

        assert_eq!(indicators["Nasdaq"]["remarks"], "Down");
        assert_eq!(indicators["Crude Oil (Brent)"]["value"], "$82");

        // 2020 * 75 / 10 = 15150 INR per 10g.
        assert_eq!(indicators["Gold (MCX)"]["value"], "INR15150/10g");
    }

    #[tokio::test]
    async fn test_reciprocal_currency_remark() {
        let indicators = fetch_indicators(&provider()).await;
        // Rate moved from 83.33 to 84.03: the rupee weakened.
        assert_eq!(indicators["USD/INR"]["remarks"], "INR weakened");
    }

    #[tokio::test]
    async fn test_static_bond_yield_always_present() {
        let indicators = fetch_indicators(&provider()).await;
        assert_eq!(indicators["India 10Y Yield"]["value"], "7.15%");
        assert_eq!(indicators["India 10Y Yield"]["remarks"], "Up");
    }

    #[tokio::test]
    async fn test_missing_symbol_becomes_unavailable() {
        let indicators = fetch_indicators(&CannedQuotes {
            closes: HashMap::new(),
        })
        .await;

        assert_eq!(indicators["Nikkei"]["value"], "N/A");
        assert_eq!(indicators["Nikkei"]["remarks"], "Data unavailable");
        // The static yield entry never depends on the provider.
        assert_eq!(indicators["India 10Y Yield"]["value"], "7.15%");
    }
}
