//! Field-wise combination of institutional flow readings.

use tracing::{info, warn};

use super::{InstitutionalActivity, InstitutionalSide};

/// Provenance sentinel used when no source produced a reading.
pub const NO_DATA_SOURCE: &str = "No data available";

/// Average per-source FII/DII readings field by field.
///
/// Zero readings yield all-zero values with the no-data sentinel as
/// source; the caller still gets a well-formed payload. Provenance is
/// the comma-joined source names in scrape order.
pub fn combine_institutional(readings: Vec<InstitutionalActivity>) -> InstitutionalActivity {
    if readings.is_empty() {
        warn!("No institutional data could be scraped from any source");
        return InstitutionalActivity {
            fii: InstitutionalSide::default(),
            dii: InstitutionalSide::default(),
            source: NO_DATA_SOURCE.to_string(),
        };
    }

    let n = readings.len() as f64;
    let mut fii = InstitutionalSide::default();
    let mut dii = InstitutionalSide::default();
    let mut sources = Vec::with_capacity(readings.len());

    for reading in &readings {
        fii.buy_value += reading.fii.buy_value;
        fii.sell_value += reading.fii.sell_value;
        fii.net_value += reading.fii.net_value;
        dii.buy_value += reading.dii.buy_value;
        dii.sell_value += reading.dii.sell_value;
        dii.net_value += reading.dii.net_value;
        sources.push(reading.source.clone());
    }

    fii.buy_value /= n;
    fii.sell_value /= n;
    fii.net_value /= n;
    dii.buy_value /= n;
    dii.sell_value /= n;
    dii.net_value /= n;

    info!(sources = readings.len(), "Combined institutional data");

    InstitutionalActivity {
        fii,
        dii,
        source: sources.join(", "),
    }
}

// ============================================================================
// Tests
// ============================================================================
