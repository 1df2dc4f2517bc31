//! Selector fallback engine.
//!
//! Source markup changes unpredictably, so each page carries an ordered
//! list of extraction strategies. The engine tries them in sequence and
//! short-circuits on the first strategy that yields at least one
//! structured row; it never merges results across strategies. Exhausting
//! every strategy with zero rows is the caller's soft failure.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::model::RawRecord;

/// One named extraction attempt over a parsed page.
pub struct ExtractionStrategy {
    name: String,
    extract: Box<dyn Fn(&Html) -> Vec<RawRecord> + Send + Sync>,
}

impl ExtractionStrategy {
    pub fn new<F>(name: impl Into<String>, extract: F) -> Self
    where
        F: Fn(&Html) -> Vec<RawRecord> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            extract: Box::new(extract),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn run(&self, doc: &Html) -> Vec<RawRecord> {
        (self.extract)(doc)
    }
}

impl std::fmt::Debug for ExtractionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionStrategy")
            .field("name", &self.name)
            .finish()
    }
}

/// Try strategies in order, returning the rows of the first one that
/// produces a non-empty result. Returns empty when all are exhausted.
pub fn extract_first(doc: &Html, strategies: &[ExtractionStrategy]) -> Vec<RawRecord> {
    for strategy in strategies {
        let rows = strategy.run(doc);
        if !rows.is_empty() {
            debug!(strategy = strategy.name(), rows = rows.len(), "Extraction strategy succeeded");
            return rows;
        }
        debug!(strategy = strategy.name(), "Extraction strategy yielded no rows, trying next");
    }
    Vec::new()
}

// ============================================================================
// Selector helpers
// ============================================================================

/// Concatenated, trimmed text of an element.
pub fn element_text(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// The trimmed cell texts of every data row in the first table matching
/// `table_selector`. Rows come from `tbody tr` when a tbody exists,
/// plain `tr` otherwise. An invalid selector yields no rows.
pub fn select_table_rows(doc: &Html, table_selector: &str) -> Vec<Vec<String>> {
    let Ok(table_sel) = Selector::parse(table_selector) else {
        return Vec::new();
    };
    let Some(table) = doc.select(&table_sel).next() else {
        return Vec::new();
    };

    // Selector literals below are fixed and always parse.
    let tbody_sel = Selector::parse("tbody tr").unwrap();
    let tr_sel = Selector::parse("tr").unwrap();
    let td_sel = Selector::parse("td").unwrap();

    let rows: Vec<ElementRef<'_>> = {
        let tbody_rows: Vec<_> = table.select(&tbody_sel).collect();
        if tbody_rows.is_empty() {
            table.select(&tr_sel).collect()
        } else {
            tbody_rows
        }
    };

    rows.iter()
        .map(|row| row.select(&td_sel).map(|td| element_text(&td)).collect())
        .filter(|cells: &Vec<String>| !cells.is_empty())
        .collect()
}

/// First non-empty text match for an ordered selector chain, scoped to
/// `root`. Invalid selectors in the chain are skipped.
pub fn first_text_match(root: &ElementRef<'_>, selectors: &[&str]) -> Option<String> {
    for raw in selectors {
        let Ok(sel) = Selector::parse(raw) else {
            continue;
        };
        for el in root.select(&sel) {
            let text = element_text(&el);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn record(n: i64) -> RawRecord {
        let mut r = RawRecord::new();
        r.insert_i64("n", n);
        r
    }

    #[test]
    fn test_short_circuits_on_first_success() {
        let a_calls = Arc::new(AtomicU32::new(0));
        let b_calls = Arc::new(AtomicU32::new(0));
        let c_calls = Arc::new(AtomicU32::new(0));

        let a = Arc::clone(&a_calls);
        let b = Arc::clone(&b_calls);
        let c = Arc::clone(&c_calls);

        let strategies = vec![
            ExtractionStrategy::new("a-empty", move |_| {
                a.fetch_add(1, Ordering::SeqCst);
                Vec::new()
            }),
            ExtractionStrategy::new("b-rows", move |_| {
                b.fetch_add(1, Ordering::SeqCst);
                vec![record(1), record(2), record(3)]
            }),
            ExtractionStrategy::new("c-never", move |_| {
                c.fetch_add(1, Ordering::SeqCst);
                vec![record(9)]
            }),
        ];

        let doc = Html::parse_document("<html></html>");
        let rows = extract_first(&doc, &strategies);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].get_i64("n"), Some(1));
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 1);
        // Never invokes a strategy after the first success.
        assert_eq!(c_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_all_exhausted_returns_empty() {
        let strategies = vec![
            ExtractionStrategy::new("a", |_| Vec::new()),
            ExtractionStrategy::new("b", |_| Vec::new()),
        ];
        let doc = Html::parse_document("<html></html>");
        assert!(extract_first(&doc, &strategies).is_empty());
    }

    #[test]
    fn test_select_table_rows_prefers_tbody() {
        let html = r#"
            <table class="table">
              <thead><tr><th>Name</th><th>Change</th></tr></thead>
              <tbody>
                <tr><td>IT</td><td>1.2%</td></tr>
                <tr><td>Energy</td><td>-0.4%</td></tr>
              </tbody>
            </table>"#;
        let doc = Html::parse_document(html);
        let rows = select_table_rows(&doc, ".table");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["IT".to_string(), "1.2%".to_string()]);
    }

    #[test]
    fn test_select_table_rows_without_tbody() {
        let html = "<table><tr><td>a</td></tr><tr><td>b</td></tr></table>";
        let doc = Html::parse_document(html);
        let rows = select_table_rows(&doc, "table");
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_select_table_rows_missing_table() {
        let doc = Html::parse_document("<div>no table here</div>");
        assert!(select_table_rows(&doc, "#sectors-table").is_empty());
    }

    #[test]
    fn test_first_text_match_walks_chain() {
        let html = r#"<article><h3></h3><a class="headline">Rates steady</a></article>"#;
        let doc = Html::parse_document(html);
        let sel = Selector::parse("article").unwrap();
        let root = doc.select(&sel).next().unwrap();

        let text = first_text_match(&root, &["h3", "a.headline"]);
        assert_eq!(text.as_deref(), Some("Rates steady"));
    }
}
