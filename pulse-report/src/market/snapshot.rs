//! Technical snapshot of the major Indian indices.
//!
//! For each index with at least 50 daily closes over the last six
//! months: last close, 20-day support (minimum close), 14-period RSI
//! with Wilder smoothing, and MACD(12, 26) with its 9-period signal.
//! Indices with too little history are skipped, not errored.

use chrono::{Datelike, Duration as ChronoDuration, Local, Weekday};
use serde_json::{json, Map, Value};
use tracing::warn;

use super::quotes::QuoteProvider;
use super::round2;

/// Snapshot indices, name then symbol, in report order.
pub const SNAPSHOT_INDICES: [(&str, &str); 5] = [
    ("Nifty 50", "^NSEI"),
    ("Sensex", "^BSESN"),
    ("Nifty Bank", "^NSEBANK"),
    ("Nifty IT", "^CNXIT"),
    ("Nifty FMCG", "^CNXFMCG"),
];

const MIN_HISTORY: usize = 50;
const SUPPORT_WINDOW: usize = 20;
const RSI_PERIOD: usize = 14;

/// The previous weekday, formatted for the snapshot header.
pub fn previous_trading_day() -> String {
    let mut day = Local::now().date_naive() - ChronoDuration::days(1);
    while matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
        day -= ChronoDuration::days(1);
    }
    day.format("%B %d, %Y").to_string()
}

/// Build the snapshot payload, one object per index with enough history.
pub async fn fetch_snapshot(provider: &dyn QuoteProvider) -> Map<String, Value> {
    let mut snapshot = Map::new();

    for (name, symbol) in SNAPSHOT_INDICES {
        let closes = match provider.daily_history(symbol, "6mo").await {
            Ok(bars) => bars.iter().map(|b| b.close).collect::<Vec<f64>>(),
            Err(e) => {
                warn!(symbol, error = %e, "Snapshot fetch failed");
                continue;
            }
        };
        if closes.len() < MIN_HISTORY {
            warn!(symbol, bars = closes.len(), "Insufficient history for snapshot");
            continue;
        }

        let close = *closes.last().unwrap_or(&0.0);
        let support = closes[closes.len() - SUPPORT_WINDOW..]
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min);
        let rsi = wilder_rsi(&closes, RSI_PERIOD);
        let (macd_line, macd_signal) = macd(&closes);

        snapshot.insert(
            name.to_string(),
            json!({
                "close": round2(close),
                "support": round2(support),
                "rsi": round2(rsi),
                "macd": {
                    "line": round2(macd_line),
                    "signal": round2(macd_signal),
                },
            }),
        );
    }

    snapshot
}

// ============================================================================
// Indicator math
// ============================================================================

/// Exponential moving average series, seeded with the first value.
fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    let alpha = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut ema = match values.first() {
        Some(v) => *v,
        None => return out,
    };
    out.push(ema);
    for value in &values[1..] {
        ema = alpha * value + (1.0 - alpha) * ema;
        out.push(ema);
    }
    out
}

/// RSI with Wilder smoothing: the first average is a simple mean of the
/// first `period` moves, subsequent averages decay with 1/period.
fn wilder_rsi(closes: &[f64], period: usize) -> f64 {
    if closes.len() <= period {
        return 50.0;
    }

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for window in closes[..=period].windows(2) {
        let delta = window[1] - window[0];
        if delta > 0.0 {
            avg_gain += delta;
        } else {
            avg_loss -= delta;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;

    let k = (period - 1) as f64 / period as f64;
    for window in closes[period..].windows(2) {
        let delta = window[1] - window[0];
        let gain = delta.max(0.0);
        let loss = (-delta).max(0.0);
        avg_gain = avg_gain * k + gain / period as f64;
        avg_loss = avg_loss * k + loss / period as f64;
    }

    if avg_loss == 0.0 {
        return 100.0;
    }
    100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
}

/// MACD(12, 26) line and its 9-period signal, both at the last close.
fn macd(closes: &[f64]) -> (f64, f64) {
    let fast = ema_series(closes, 12);
    let slow = ema_series(closes, 26);
    let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal = ema_series(&line, 9);
    (
        line.last().copied().unwrap_or(0.0),
        signal.last().copied().unwrap_or(0.0),
    )
}

// ============================================================================
// Tests
// ============================================================================
