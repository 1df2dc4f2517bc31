//! Sector movement and institutional activity pipeline.
//!
//! Sector rows come from a single equity analytics source and are
//! normalized onto a fixed taxonomy; institutional (FII/DII) flows are
//! scraped from several sources and combined field-wise. The two feeds
//! are independent: either side may come back empty without affecting
//! the other.

pub mod combine;
pub mod normalize;
pub mod sources;

pub use combine::{combine_institutional, NO_DATA_SOURCE};
pub use normalize::{SectorNormalizer, SectorTaxonomy};

use serde::{Deserialize, Serialize};

/// One normalized sector movement row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectorRecord {
    pub sector_name: String,
    pub num_companies: i64,
    pub advances: i64,
    pub declines: i64,
    pub change_percentage: f64,
    pub source: String,
}

/// Buy/sell/net flow for one institutional investor class, in INR crore.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct InstitutionalSide {
    pub buy_value: f64,
    pub sell_value: f64,
    pub net_value: f64,
}

/// Combined FII and DII activity with source provenance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstitutionalActivity {
    pub fii: InstitutionalSide,
    pub dii: InstitutionalSide,
    /// Comma-joined names of the sources that contributed, or the
    /// no-data sentinel when none did.
    pub source: String,
}
