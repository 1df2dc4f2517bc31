//! Quote-driven market sections.
//!
//! Everything here is built on the [`QuoteProvider`] seam: financial
//! indicators, the index overview, the technical snapshot, and the top
//! performers tables. Each section tolerates per-symbol failures by
//! embedding a placeholder for the symbol instead of failing the
//! section.

pub mod indicators;
pub mod overview;
pub mod performers;
pub mod quotes;
pub mod snapshot;

pub use quotes::{Ohlc, QuoteProvider, YahooChartProvider};

/// Round to two decimals for presentation payloads.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
