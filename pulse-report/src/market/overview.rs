//! Index overview: per-symbol OHLC with day-over-day change.

use chrono::Local;
use serde_json::{json, Map, Value};
use tracing::warn;

use super::quotes::QuoteProvider;
use super::round2;

/// Tracked Indian indices in report order.
pub const OVERVIEW_SYMBOLS: [&str; 6] = [
    "^NSEI",
    "^BSESN",
    "^CRSLDX",
    "^NSEBANK",
    "^CNXIT",
    "^NSEMDCP50",
];

/// Display name for an overview symbol.
pub fn index_name(symbol: &str) -> &str {
    match symbol {
        "^NSEI" => "NIFTY 50",
        "^BSESN" => "SENSEX",
        "^CRSLDX" => "CRSLDX",
        "^NSEBANK" => "BANK NIFTY",
        "^CNXIT" => "NIFTY IT",
        "^NSEMDCP50" => "NIFTY Midcap 50",
        other => other,
    }
}

/// Build the overview payload. Each symbol resolves to either an OHLC
/// object or an `{"Error": ...}` placeholder; the `_meta` block records
/// when the overview was taken.
pub async fn fetch_overview(provider: &dyn QuoteProvider, symbols: &[String]) -> Map<String, Value> {
    let mut overview = Map::new();
    let now = Local::now();
    overview.insert(
        "_meta".to_string(),
        json!({
            "date": now.format("%Y-%m-%d").to_string(),
            "timestamp": now.format("%H:%M:%S").to_string(),
        }),
    );

    for symbol in symbols {
        let entry = match provider.daily_history(symbol, "2d").await {
            Ok(bars) if bars.len() >= 2 => {
                let prev_close = bars[bars.len() - 2].close;
                let current = bars[bars.len() - 1];
                let change = current.close - prev_close;
                json!({
                    "Open": round2(current.open),
                    "High": round2(current.high),
                    "Low": round2(current.low),
                    "Close": round2(current.close),
                    "Change": round2(change),
                    "Change%": round2(change / prev_close * 100.0),
                    "PrevClose": round2(prev_close),
                })
            }
            Ok(_) => {
                warn!(symbol, "Insufficient history for overview");
                json!({ "Error": "Insufficient data" })
            }
            Err(e) => {
                warn!(symbol, error = %e, "Overview fetch failed");
                json!({ "Error": e.to_string() })
            }
        };
        overview.insert(symbol.clone(), entry);
    }

    overview
}

/// Human-readable digest of the overview, one line per healthy index.
/// Feeds the enrichment prompts; error entries are skipped.
pub fn overview_digest(overview: &Map<String, Value>) -> String {
    let mut lines = Vec::new();
    for (symbol, data) in overview {
        if symbol == "_meta" || data.get("Open").is_none() {
            continue;
        }
        lines.push(format!(
            "{}: Open={}, High={}, Low={}, Close={}, Change={} ({}%)",
            index_name(symbol),
            data["Open"],
            data["High"],
            data["Low"],
            data["Close"],
            data["Change"],
            data["Change%"],
        ));
    }
    lines.join("\n")
}

// ============================================================================
// Tests
// ============================================================================
