//! Placeholder comparison shown when the upstream comparison is unavailable
//!
//! Reports built from this data always carry `is_fallback = true` and the
//! reason the live comparison could not be used.

use super::{AffinityAggregator, ComparisonReport};
use crate::culture::models::{ComparisonQuery, RawTagComparison, SideAffinity};
use tracing::warn;

/// (name, subtype, combined, a, b, delta)
const DEMO_TAGS: &[(&str, &str, f64, f64, f64, f64)] = &[
    ("Indie", "urn:tag:genre:music", 0.0048, 0.0051, 0.0045, 1.1),
    ("Coming Of Age", "urn:tag:keyword:media", 0.0044, 0.0046, 0.0041, 1.2),
    ("Dream Pop", "urn:tag:genre:music", 0.0041, 0.0062, 0.0019, 2.4),
    ("Film Noir", "urn:tag:genre:media", 0.0038, 0.0017, 0.0058, 2.9),
    ("Minimalism", "urn:tag:style:design", 0.0035, 0.0036, 0.0033, 1.05),
    ("Slow Cinema", "urn:tag:keyword:media", 0.0032, 0.0047, 0.0016, 2.1),
    ("Jazz", "urn:tag:genre:music", 0.0031, 0.0030, 0.0031, 1.0),
    ("Magical Realism", "urn:tag:genre:book", 0.0027, 0.0012, 0.0042, 3.5),
    ("Street Food", "urn:tag:category:place", 0.0022, 0.0024, 0.0019, 1.3),
    ("Vinyl", "", 0.0018, 0.0021, 0.0015, 1.4),
];

/// Raw records of the demo comparison
pub fn demo_comparison() -> Vec<RawTagComparison> {
    DEMO_TAGS
        .iter()
        .map(|&(name, subtype, combined, a, b, delta)| RawTagComparison {
            name: name.to_string(),
            tag_id: format!("demo:{}", name.to_lowercase().replace(' ', "_")),
            subtype: (!subtype.is_empty()).then(|| subtype.to_string()),
            query: ComparisonQuery {
                affinity: Some(combined),
                a: Some(SideAffinity { affinity: Some(a) }),
                b: Some(SideAffinity { affinity: Some(b) }),
                delta: Some(delta),
            },
        })
        .collect()
}

impl AffinityAggregator {
    /// Report over the demo data, flagged as placeholder
    pub fn fallback(&self, reason: impl Into<String>) -> ComparisonReport {
        let reason = reason.into();
        warn!("Serving demo comparison: {}", reason);

        let mut report = self.aggregate(&demo_comparison());
        report.is_fallback = true;
        report.fallback_reason = Some(reason);
        report
    }
}
