//! Top gainers and losers from screener tables.
//!
//! The screener table is header-driven: columns are located by header
//! text rather than position, so column reordering on the site does not
//! break extraction. Change cells arrive as a combined "12.50 (4.2%)"
//! value which is split into absolute and percent parts.

use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::model::RawRecord;
use crate::scrape::fallback::element_text;
use crate::scrape::{ExtractionStrategy, PageAdapter, SourceDescriptor};

pub const GAINERS_URL: &str =
    "https://trendlyne.com/stock-screeners/price-based/top-gainers/today/";
pub const LOSERS_URL: &str =
    "https://trendlyne.com/stock-screeners/price-based/top-losers/today/";

/// Rows taken from the top of each screener table.
const MAX_PERFORMERS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformerRecord {
    pub company_name: String,
    pub current_price: f64,
    pub price_change: f64,
    pub percentage_change: f64,
}

/// Matches combined change cells such as "33.93 (20.0%)".
fn change_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([-\d.]+)\s+\(([-\d.]+)%?\)").unwrap())
}

fn parse_numeric(text: &str) -> Option<f64> {
    text.replace("INR", "")
        .replace(',', "")
        .replace('%', "")
        .trim()
        .parse()
        .ok()
}

fn parse_price_change(text: &str) -> f64 {
    if let Some(caps) = change_pattern().captures(text.trim()) {
        if let Ok(value) = caps[1].parse() {
            return value;
        }
    }
    parse_numeric(text).unwrap_or(0.0)
}

fn parse_percentage_change(text: &str) -> f64 {
    if let Some(caps) = change_pattern().captures(text.trim()) {
        if let Ok(value) = caps[2].parse() {
            return value;
        }
    }
    parse_numeric(text).unwrap_or(0.0)
}

// ============================================================================
// Extraction
// ============================================================================

/// Screener table adapter for one URL (gainers or losers page).
pub fn performers_adapter(name: &str, url: &str) -> PageAdapter {
    let strategies = vec![ExtractionStrategy::new("screener table.table", |doc: &Html| {
        extract_performers(doc)
    })];
    PageAdapter::new(SourceDescriptor::new(name, url), strategies)
}

fn extract_performers(doc: &Html) -> Vec<RawRecord> {
    // Fixed selector literals, always parseable.
    let table_sel = Selector::parse("table.table").unwrap();
    let th_sel = Selector::parse("thead tr th").unwrap();
    let row_sel = Selector::parse("tbody tr").unwrap();
    let td_sel = Selector::parse("td").unwrap();

    let Some(table) = doc.select(&table_sel).next() else {
        return Vec::new();
    };

    let headers: Vec<String> = table.select(&th_sel).map(|th| element_text(&th)).collect();
    if headers.is_empty() {
        return Vec::new();
    }

    let price_idx = headers
        .iter()
        .position(|h| ["LTP", "Price", "Last"].iter().any(|term| h.contains(term)))
        .unwrap_or(1);
    let change_idx = headers
        .iter()
        .position(|h| h.contains("Change(%)") || h.contains("Change %"))
        .or_else(|| headers.iter().position(|h| h.contains("Change")));

    table
        .select(&row_sel)
        .take(MAX_PERFORMERS)
        .filter_map(|row| {
            let cells: Vec<String> = row.select(&td_sel).map(|td| element_text(&td)).collect();
            let company = cells.first()?.clone();
            let current_price = parse_numeric(cells.get(price_idx)?)?;

            let (price_change, percentage_change) = match change_idx {
                Some(idx) => {
                    let text = cells.get(idx).map(String::as_str).unwrap_or("0 (0%)");
                    (parse_price_change(text), parse_percentage_change(text))
                }
                None => (0.0, 0.0),
            };

            let mut record = RawRecord::new();
            record.insert_str("company_name", company);
            record.insert_f64("current_price", current_price);
            record.insert_f64("price_change", price_change);
            record.insert_f64("percentage_change", percentage_change);
            Some(record)
        })
        .collect()
}

/// Lift raw screener records into typed rows.
pub fn performer_records(raw: Vec<RawRecord>) -> Vec<PerformerRecord> {
    raw.into_iter()
        .filter_map(|record| {
            Some(PerformerRecord {
                company_name: record.get_str("company_name")?.to_string(),
                current_price: record.get_f64("current_price")?,
                price_change: record.get_f64("price_change")?,
                percentage_change: record.get_f64("percentage_change")?,
            })
        })
        .collect()
}

/// Loser rows must carry negative changes even when the site lists them
/// as magnitudes.
pub fn force_negative(records: &mut [PerformerRecord]) {
    for record in records {
        if record.price_change > 0.0 {
            record.price_change = -record.price_change;
        }
        if record.percentage_change > 0.0 {
            record.percentage_change = -record.percentage_change;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
