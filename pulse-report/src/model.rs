//! Shared data model for the aggregation pipeline.
//!
//! `RawRecord` is the untyped, per-provider row produced by extraction
//! strategies; it lives only within one pipeline run. The composite
//! document is the final owned output of one orchestrator invocation,
//! keyed by the fixed section names consumed by downstream renderers.

use chrono::Utc;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

// ============================================================================
// Raw records
// ============================================================================

/// A kind-specific mapping of string keys to JSON values as scraped from
/// one provider. No cross-provider guarantees on key names exist before
/// normalization.
#[derive(Debug, Clone, Default)]
pub struct RawRecord {
    fields: BTreeMap<String, Value>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_str(&mut self, key: &str, value: impl Into<String>) {
        self.fields.insert(key.to_string(), Value::String(value.into()));
    }

    pub fn insert_f64(&mut self, key: &str, value: f64) {
        self.fields.insert(key.to_string(), json!(value));
    }

    pub fn insert_i64(&mut self, key: &str, value: i64) {
        self.fields.insert(key.to_string(), json!(value));
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.fields.get(key).and_then(Value::as_f64)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.fields.get(key).and_then(Value::as_i64)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// ============================================================================
// Sections
// ============================================================================

/// The independent data sections the orchestrator assembles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    SectorAndFii,
    NewsHighlights,
    FinancialIndicators,
    MarketSnapshot,
    MarketOverview,
    TopPerformers,
    MarketAnalysis,
    Summary,
}

impl Section {
    /// The JSON key this section occupies in the composite document.
    pub fn key(&self) -> &'static str {
        match self {
            Self::SectorAndFii => "sector_and_fii",
            Self::NewsHighlights => "news_highlights",
            Self::FinancialIndicators => "financial_indicators",
            Self::MarketSnapshot => "market_snapshot",
            Self::MarketOverview => "market_overview",
            Self::TopPerformers => "top_performers",
            Self::MarketAnalysis => "market_analysis",
            Self::Summary => "summary",
        }
    }

    /// The six scraped data sections, in fixed report order. The two
    /// derived sections (analysis, summary) are produced by the
    /// enrichment phase.
    pub const DATA_SECTIONS: [Section; 6] = [
        Self::SectorAndFii,
        Self::NewsHighlights,
        Self::FinancialIndicators,
        Self::MarketSnapshot,
        Self::MarketOverview,
        Self::TopPerformers,
    ];
}

/// Generation status recorded in the composite `_meta` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStatus {
    InProgress,
    Complete,
}

impl GenerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Complete => "complete",
        }
    }
}

// ============================================================================
// Composite document
// ============================================================================

/// The merged, partially-fault-tolerant aggregation result for one run.
///
/// Each section key maps to either a populated payload or an
/// `{"error": message}` placeholder; consumers must tolerate both. The
/// `_meta` block records the generation timestamp and status.
#[derive(Debug, Clone, Default)]
pub struct CompositeDocument {
    sections: Map<String, Value>,
}

impl CompositeDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a section result, converting an error into the
    /// `{"error": message}` placeholder. Failures never cross section
    /// boundaries.
    pub fn insert_section(&mut self, section: Section, result: anyhow::Result<Value>) {
        let value = match result {
            Ok(payload) => payload,
            Err(err) => {
                tracing::error!(section = section.key(), error = %err, "Section failed");
                json!({ "error": err.to_string() })
            }
        };
        self.sections.insert(section.key().to_string(), value);
    }

    /// Read a section back (used by the enrichment phase and tests).
    pub fn section(&self, section: Section) -> Option<&Value> {
        self.sections.get(section.key())
    }

    /// Whether a section resolved to the error placeholder.
    pub fn section_failed(&self, section: Section) -> bool {
        self.section(section)
            .map(|v| v.get("error").is_some())
            .unwrap_or(true)
    }

    /// Stamp the `_meta` block with the current time and the given status.
    pub fn set_meta(&mut self, status: GenerationStatus) {
        self.sections.insert(
            "_meta".to_string(),
            json!({
                "timestamp": Utc::now().to_rfc3339(),
                "generation_status": status.as_str(),
            }),
        );
    }

    /// The recorded generation status, if `_meta` has been stamped.
    pub fn generation_status(&self) -> Option<&str> {
        self.sections
            .get("_meta")
            .and_then(|m| m.get("generation_status"))
            .and_then(Value::as_str)
    }

    /// Consume the document into its JSON representation. Ownership
    /// transfers to the caller (API layer / report assembler).
    pub fn into_value(self) -> Value {
        Value::Object(self.sections)
    }

    /// Borrow the document as a JSON value (for enrichment prompts).
    pub fn to_value(&self) -> Value {
        Value::Object(self.sections.clone())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_record_round_trip() {
        let mut record = RawRecord::new();
        record.insert_str("sector_name", "Nifty IT");
        record.insert_f64("change_percentage", -1.25);
        record.insert_i64("advances", 3);

        assert_eq!(record.get_str("sector_name"), Some("Nifty IT"));
        assert_eq!(record.get_f64("change_percentage"), Some(-1.25));
        assert_eq!(record.get_i64("advances"), Some(3));
        assert!(record.get_str("missing").is_none());
    }

    #[test]
    fn test_section_keys_are_fixed() {
        assert_eq!(Section::SectorAndFii.key(), "sector_and_fii");
        assert_eq!(Section::NewsHighlights.key(), "news_highlights");
        assert_eq!(Section::FinancialIndicators.key(), "financial_indicators");
        assert_eq!(Section::MarketSnapshot.key(), "market_snapshot");
        assert_eq!(Section::MarketOverview.key(), "market_overview");
        assert_eq!(Section::TopPerformers.key(), "top_performers");
        assert_eq!(Section::MarketAnalysis.key(), "market_analysis");
        assert_eq!(Section::Summary.key(), "summary");
    }

    #[test]
    fn test_error_sections_become_placeholders() {
        let mut doc = CompositeDocument::new();
        doc.insert_section(Section::NewsHighlights, Err(anyhow::anyhow!("scrape failed")));
        doc.insert_section(Section::SectorAndFii, Ok(json!({"sector_movement": []})));

        let failed = doc.section(Section::NewsHighlights).unwrap();
        assert_eq!(failed["error"], "scrape failed");
        assert!(doc.section_failed(Section::NewsHighlights));
        assert!(!doc.section_failed(Section::SectorAndFii));
    }

    #[test]
    fn test_meta_status() {
        let mut doc = CompositeDocument::new();
        assert!(doc.generation_status().is_none());

        doc.set_meta(GenerationStatus::InProgress);
        assert_eq!(doc.generation_status(), Some("in_progress"));

        doc.set_meta(GenerationStatus::Complete);
        assert_eq!(doc.generation_status(), Some("complete"));

        let value = doc.into_value();
        assert!(value["_meta"]["timestamp"].is_string());
    }
}
