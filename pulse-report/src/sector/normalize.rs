//! Sector name normalization.
//!
//! Source sites label sectors inconsistently ("IT", "Software &
//! Services", "Nifty Information Technology"). Every scraped name is
//! folded onto a fixed taxonomy by case-insensitive keyword containment;
//! the first matching bucket wins, and an unmatched name passes through
//! in title case so novel sectors are preserved rather than dropped.

use tracing::debug;

use super::SectorRecord;

/// A canonical bucket: its display name and the keywords that map raw
/// names into it.
struct Bucket {
    canonical: &'static str,
    keywords: &'static [&'static str],
}

/// Immutable keyword taxonomy. Bucket order is significant: matching
/// stops at the first bucket containing a keyword of the raw name.
pub struct SectorTaxonomy {
    buckets: Vec<Bucket>,
}

impl Default for SectorTaxonomy {
    fn default() -> Self {
        Self {
            buckets: vec![
                Bucket {
                    canonical: "Information Technology",
                    keywords: &["it", "software", "tech", "information"],
                },
                Bucket {
                    canonical: "Banking & Financial Services",
                    keywords: &["bank", "finance", "financial", "nbfc"],
                },
                Bucket {
                    canonical: "Pharmaceuticals & Healthcare",
                    keywords: &["pharma", "health", "medical", "drug"],
                },
                Bucket {
                    canonical: "Energy",
                    keywords: &["energy", "oil", "gas", "petrol", "power"],
                },
                Bucket {
                    canonical: "FMCG",
                    keywords: &["fmcg", "consumer goods"],
                },
                Bucket {
                    canonical: "Automobiles",
                    keywords: &["auto", "automobile", "vehicle"],
                },
                Bucket {
                    canonical: "Realty",
                    keywords: &["real estate", "realty", "property"],
                },
                Bucket {
                    canonical: "Infrastructure",
                    keywords: &["infra", "construction", "cement"],
                },
                Bucket {
                    canonical: "Metals and Mining",
                    keywords: &["metal", "steel", "mining", "mineral"],
                },
                Bucket {
                    canonical: "Telecom",
                    keywords: &["telecom", "communication"],
                },
                Bucket {
                    canonical: "Agriculture and Chemicals",
                    keywords: &["agri", "chemical", "fertilizer"],
                },
            ],
        }
    }
}

impl SectorTaxonomy {
    /// Canonical bucket count, also the cap on emitted sector rows.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Map a raw sector name onto its canonical bucket. Unmatched names
    /// pass through in title case.
    pub fn canonical(&self, raw: &str) -> String {
        let lowered = raw.to_lowercase();
        for bucket in &self.buckets {
            if bucket.keywords.iter().any(|kw| lowered.contains(kw)) {
                return bucket.canonical.to_string();
            }
        }
        debug!(raw, "Sector name has no taxonomy bucket, passing through");
        title_case(raw)
    }
}

fn title_case(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// Normalizer
// ============================================================================

/// Deduplicates normalized rows by canonical name, then orders and caps
/// the result set.
///
/// When two raw rows normalize to the same canonical name, the later row
/// replaces the earlier one. Output is sorted by change percentage
/// descending and capped at the taxonomy size.
pub struct SectorNormalizer {
    taxonomy: SectorTaxonomy,
}

impl SectorNormalizer {
    pub fn new(taxonomy: SectorTaxonomy) -> Self {
        Self { taxonomy }
    }

    pub fn taxonomy(&self) -> &SectorTaxonomy {
        &self.taxonomy
    }

    pub fn normalize(&self, rows: Vec<SectorRecord>) -> Vec<SectorRecord> {
        // Insertion-ordered so replacement keeps behavior deterministic.
        let mut by_name: Vec<SectorRecord> = Vec::new();

        for mut row in rows {
            row.sector_name = self.taxonomy.canonical(&row.sector_name);
            if let Some(existing) = by_name
                .iter_mut()
                .find(|r| r.sector_name == row.sector_name)
            {
                *existing = row;
            } else {
                by_name.push(row);
            }
        }

        by_name.sort_by(|a, b| b.change_percentage.total_cmp(&a.change_percentage));
        by_name.truncate(self.taxonomy.len());
        by_name
    }
}

// ============================================================================
// Tests
// ============================================================================
