//! Pulse Report - Composite market data aggregation service.
//!
//! Assembles a daily Indian market report from independent sources:
//! sector movement and institutional (FII/DII) flows, classified news
//! highlights, global financial indicators, a technical snapshot, an
//! index overview, and screener-based top performers, enriched with
//! generated analysis and summary sections.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                     pulse-report (Service)                     │
//! ├────────────────────────────────────────────────────────────────┤
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────────┐  │
//! │  │  Scrape      │  │  Quote       │  │  Insight             │  │
//! │  │  Layer       │  │  Provider    │  │  Client              │  │
//! │  └──────┬───────┘  └──────┬───────┘  └──────────┬───────────┘  │
//! │         └─────────────────┴─────────────────────┘              │
//! │                     Report Orchestrator                        │
//! │               (fault-isolated composite sections)              │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Fault isolation
//!
//! Every report section is computed independently. A section that
//! fails resolves to an `{"error": ...}` placeholder in the composite
//! document; its siblings and the run as a whole are unaffected.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod error;
pub mod insight;
pub mod market;
pub mod model;
pub mod news;
pub mod orchestrator;
pub mod scrape;
pub mod sector;

pub use error::ScrapeError;
pub use model::CompositeDocument;
pub use orchestrator::ReportOrchestrator;
