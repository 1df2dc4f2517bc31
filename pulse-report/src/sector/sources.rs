//! Source adapters for sector and institutional data.
//!
//! Each adapter pairs a source URL with the selector chain observed to
//! work on that site, in preference order. Numeric cells carry thousands
//! separators and unit suffixes which are stripped before parsing.

use scraper::Html;

use super::{InstitutionalActivity, InstitutionalSide, SectorRecord};
use crate::model::RawRecord;
use crate::scrape::fallback::select_table_rows;
use crate::scrape::{ExtractionStrategy, PageAdapter, SourceDescriptor};

pub const DEFAULT_SECTOR_URL: &str =
    "https://trendlyne.com/equity/sector-industry-analysis/sector/day/";

pub const DEFAULT_INSTITUTIONAL_URLS: [&str; 2] = [
    "https://www.moneycontrol.com/stocks/marketstats/fii_dii_activity/index.php",
    "https://trendlyne.com/macro-data/fii-dii/latest/cash-pastmonth/",
];

// ============================================================================
// Sector movement
// ============================================================================

const SECTOR_SELECTORS: [&str; 4] = [
    ".table-responsive table",
    ".dataTables_wrapper table",
    ".table",
    "#sectors-table",
];

/// Trendlyne sector table adapter. Each usable row carries the sector
/// name in the first cell, daily change in the second, advances and
/// declines in the fourth and fifth.
pub fn trendlyne_sector_adapter(url: &str) -> PageAdapter {
    let strategies = SECTOR_SELECTORS
        .into_iter()
        .map(|selector| {
            ExtractionStrategy::new(format!("sector {selector}"), move |doc: &Html| {
                select_table_rows(doc, selector)
                    .into_iter()
                    .filter_map(|cells| sector_row_to_record(&cells))
                    .collect()
            })
        })
        .collect();

    PageAdapter::new(SourceDescriptor::new("Trendlyne", url), strategies)
}

fn sector_row_to_record(cells: &[String]) -> Option<RawRecord> {
    if cells.len() < 5 {
        return None;
    }
    let name = cells[0].trim();
    if name.is_empty() {
        return None;
    }
    let change: f64 = cells[1].trim().trim_end_matches('%').parse().ok()?;
    let advances: i64 = cells[3].trim().parse().ok()?;
    let declines: i64 = cells[4].trim().parse().ok()?;

    let mut record = RawRecord::new();
    record.insert_str("sector_name", name);
    record.insert_f64("change_percentage", change);
    record.insert_i64("advances", advances);
    record.insert_i64("declines", declines);
    Some(record)
}

/// Lift raw sector records into typed rows, tagging provenance. Rows
/// missing any required field are dropped.
pub fn sector_records(raw: Vec<RawRecord>, source: &str) -> Vec<SectorRecord> {
    raw.into_iter()
        .filter_map(|record| {
            let advances = record.get_i64("advances")?;
            let declines = record.get_i64("declines")?;
            Some(SectorRecord {
                sector_name: record.get_str("sector_name")?.to_string(),
                num_companies: advances + declines,
                advances,
                declines,
                change_percentage: record.get_f64("change_percentage")?,
                source: source.to_string(),
            })
        })
        .collect()
}

// ============================================================================
// Institutional activity
// ============================================================================

const MONEYCONTROL_SELECTORS: [&str; 4] =
    [".mctable1", "table.mctable", "#fii-dii-table", ".data-table"];

const TRENDLYNE_INSTITUTIONAL_SELECTORS: [&str; 4] =
    [".table", ".data-table", "#fii-dii-data", ".table-responsive table"];

/// Build the institutional adapter for a URL, recognizing the site by
/// host. Unknown hosts get the Trendlyne selector chain, the more
/// generic of the two.
pub fn institutional_adapter(url: &str) -> PageAdapter {
    if url.contains("moneycontrol.com") {
        moneycontrol_institutional_adapter(url)
    } else {
        trendlyne_institutional_adapter(url)
    }
}

/// MoneyControl FII/DII table. The latest reading sits in the first or
/// second data row; the first row holding six numeric cells wins.
pub fn moneycontrol_institutional_adapter(url: &str) -> PageAdapter {
    let strategies = MONEYCONTROL_SELECTORS
        .into_iter()
        .map(|selector| {
            ExtractionStrategy::new(format!("fii-dii {selector}"), move |doc: &Html| {
                let rows = select_table_rows(doc, selector);
                rows.iter()
                    .take(2)
                    .find_map(|cells| institutional_row_to_record(cells))
                    .into_iter()
                    .collect()
            })
        })
        .collect();

    PageAdapter::new(SourceDescriptor::new("MoneyControl", url), strategies)
}

/// Trendlyne FII/DII table. Only the first data row is considered.
pub fn trendlyne_institutional_adapter(url: &str) -> PageAdapter {
    let strategies = TRENDLYNE_INSTITUTIONAL_SELECTORS
        .into_iter()
        .map(|selector| {
            ExtractionStrategy::new(format!("fii-dii {selector}"), move |doc: &Html| {
                let rows = select_table_rows(doc, selector);
                rows.first()
                    .and_then(|cells| institutional_row_to_record(cells))
                    .into_iter()
                    .collect()
            })
        })
        .collect();

    PageAdapter::new(SourceDescriptor::new("Trendlyne", url), strategies)
}

/// Pull the first six numeric cell values from a row as FII buy/sell/net
/// then DII buy/sell/net. Non-numeric cells (dates, labels) are skipped.
fn institutional_row_to_record(cells: &[String]) -> Option<RawRecord> {
    let values: Vec<f64> = cells
        .iter()
        .filter_map(|cell| {
            cell.trim()
                .replace(',', "")
                .replace("INR", "")
                .trim()
                .parse()
                .ok()
        })
        .collect();

    if values.len() < 6 {
        return None;
    }

    let mut record = RawRecord::new();
    record.insert_f64("fii_buy", values[0]);
    record.insert_f64("fii_sell", values[1]);
    record.insert_f64("fii_net", values[2]);
    record.insert_f64("dii_buy", values[3]);
    record.insert_f64("dii_sell", values[4]);
    record.insert_f64("dii_net", values[5]);
    Some(record)
}

/// Lift one raw institutional record into a typed reading.
pub fn institutional_reading(record: &RawRecord, source: &str) -> Option<InstitutionalActivity> {
    Some(InstitutionalActivity {
        fii: InstitutionalSide {
            buy_value: record.get_f64("fii_buy")?,
            sell_value: record.get_f64("fii_sell")?,
            net_value: record.get_f64("fii_net")?,
        },
        dii: InstitutionalSide {
            buy_value: record.get_f64("dii_buy")?,
            sell_value: record.get_f64("dii_sell")?,
            net_value: record.get_f64("dii_net")?,
        },
        source: source.to_string(),
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrape::{PageFetcher, ProviderAdapter};
    use async_trait::async_trait;
    use crate::error::ScrapeError;

    struct CannedFetcher(String);

    #[async_trait]
    impl PageFetcher for CannedFetcher {
        async fn fetch_page(&self, _source: &str, _url: &str) -> Result<String, ScrapeError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_sector_rows_from_responsive_table() {
        let html = r#"
            <div class="table-responsive"><table>
              <thead><tr><th>Sector</th><th>Chg%</th><th>Mcap</th><th>Adv</th><th>Dec</th></tr></thead>
              <tbody>
                <tr><td>Nifty IT</td><td>1.25%</td><td>12L</td><td>8</td><td>2</td></tr>
                <tr><td>PSU Bank</td><td>-0.40%</td><td>9L</td><td>3</td><td>9</td></tr>
              </tbody>
            </table></div>"#;

        let adapter = trendlyne_sector_adapter(DEFAULT_SECTOR_URL);
        let raw = adapter.fetch(&CannedFetcher(html.into())).await.unwrap();
        let rows = sector_records(raw, "Trendlyne");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].sector_name, "Nifty IT");
        assert_eq!(rows[0].change_percentage, 1.25);
        assert_eq!(rows[0].num_companies, 10);
        assert_eq!(rows[1].declines, 9);
        assert_eq!(rows[1].source, "Trendlyne");
    }

    #[tokio::test]
    async fn test_sector_rows_skip_short_and_malformed() {
        let html = r#"
            <table class="table">
              <tr><td>Header-ish row</td><td>n/a</td></tr>
              <tr><td>Energy</td><td>0.70%</td><td>x</td><td>5</td><td>5</td></tr>
              <tr><td>Broken</td><td>abc%</td><td>x</td><td>5</td><td>5</td></tr>
            </table>"#;

        let adapter = trendlyne_sector_adapter(DEFAULT_SECTOR_URL);
        let raw = adapter.fetch(&CannedFetcher(html.into())).await.unwrap();
        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0].get_str("sector_name"), Some("Energy"));
    }

    #[tokio::test]
    async fn test_moneycontrol_reading_strips_separators() {
        let html = r#"
            <table class="mctable1">
              <tr><th>FII Buy</th><th>FII Sell</th><th>FII Net</th><th>DII Buy</th><th>DII Sell</th><th>DII Net</th></tr>
              <tr><td>12,345.60</td><td>11,000.10</td><td>1,345.50</td><td>8,000.00</td><td>7,500.00</td><td>500.00</td></tr>
            </table>"#;

        let adapter = institutional_adapter(DEFAULT_INSTITUTIONAL_URLS[0]);
        assert_eq!(adapter.name(), "MoneyControl");

        let raw = adapter.fetch(&CannedFetcher(html.into())).await.unwrap();
        let reading = institutional_reading(&raw[0], adapter.name()).unwrap();

        assert_eq!(reading.fii.buy_value, 12345.6);
        assert_eq!(reading.fii.net_value, 1345.5);
        assert_eq!(reading.dii.net_value, 500.0);
        assert_eq!(reading.source, "MoneyControl");
    }

    #[tokio::test]
    async fn test_trendlyne_reading_strips_inr_prefix() {
        let html = r#"
            <table class="table"><tbody>
              <tr><td>24 Aug</td><td>INR 1,000.0</td><td>INR 900.0</td><td>INR 100.0</td>
                  <td>INR 600.0</td><td>INR 550.0</td><td>INR 50.0</td></tr>
            </tbody></table>"#;

        let adapter = institutional_adapter(DEFAULT_INSTITUTIONAL_URLS[1]);
        assert_eq!(adapter.name(), "Trendlyne");

        let raw = adapter.fetch(&CannedFetcher(html.into())).await.unwrap();
        let reading = institutional_reading(&raw[0], adapter.name()).unwrap();

        assert_eq!(reading.fii.buy_value, 1000.0);
        assert_eq!(reading.dii.sell_value, 550.0);
    }

    #[tokio::test]
    async fn test_institutional_needs_six_numeric_cells() {
        let html = r#"
            <table class="table">
              <tr><td>1.0</td><td>2.0</td><td>3.0</td><td>words</td></tr>
            </table>"#;

        let adapter = trendlyne_institutional_adapter(DEFAULT_INSTITUTIONAL_URLS[1]);
        let err = adapter.fetch(&CannedFetcher(html.into())).await.unwrap_err();
        assert!(err.is_soft());
    }
}
