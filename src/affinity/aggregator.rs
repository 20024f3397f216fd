//! Comparison aggregation

use super::{AffinityTag, AffinityThresholds, ComparisonReport};
use crate::culture::models::RawTagComparison;
use indexmap::IndexMap;
use tracing::debug;

/// Category key for tags without a subtype
pub const OTHER_CATEGORY: &str = "other";

/// Classifies raw comparison records into report buckets
#[derive(Debug, Clone, Default)]
pub struct AffinityAggregator {
    thresholds: AffinityThresholds,
}

fn finite_or_zero(v: Option<f64>) -> f64 {
    v.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// First `limit` tags (already sorted) that satisfy `pred`
fn take_matching(
    tags: &[AffinityTag],
    limit: usize,
    pred: impl Fn(&AffinityTag) -> bool,
) -> Vec<AffinityTag> {
    tags.iter().filter(|t| pred(*t)).take(limit).cloned().collect()
}

impl AffinityAggregator {
    pub fn new(thresholds: AffinityThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &AffinityThresholds {
        &self.thresholds
    }

    /// Flatten one raw record; missing numbers become 0
    pub fn normalize(raw: &RawTagComparison) -> AffinityTag {
        let q = &raw.query;
        AffinityTag {
            name: raw.name.clone(),
            tag_id: raw.tag_id.clone(),
            subtype: raw.subtype.clone().filter(|s| !s.trim().is_empty()),
            a_affinity: finite_or_zero(q.a.as_ref().and_then(|a| a.affinity)),
            b_affinity: finite_or_zero(q.b.as_ref().and_then(|b| b.affinity)),
            combined_affinity: finite_or_zero(q.affinity),
            delta: finite_or_zero(q.delta),
        }
    }

    /// Category of a tag: the first segment of its subtype once the prefix
    /// is stripped (`urn:tag:genre:music` -> `genre`)
    pub fn category_of(&self, tag: &AffinityTag) -> String {
        tag.subtype
            .as_deref()
            .map(|s| s.strip_prefix(self.thresholds.subtype_prefix.as_str()).unwrap_or(s))
            .and_then(|s| s.split(':').next())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(OTHER_CATEGORY)
            .to_string()
    }

    fn is_common(&self, t: &AffinityTag) -> bool {
        t.a_affinity.min(t.b_affinity) > self.thresholds.common_min_affinity
            && t.delta < self.thresholds.common_max_delta
    }

    fn leans(&self, this: f64, other: f64, delta: f64) -> bool {
        this > other
            && delta > self.thresholds.stronger_min_delta
            && this > self.thresholds.stronger_min_affinity
    }

    fn is_top(&self, t: &AffinityTag) -> bool {
        t.combined_affinity > self.thresholds.top_min_combined
    }

    fn is_moderate(&self, t: &AffinityTag) -> bool {
        (self.thresholds.moderate_min_combined..=self.thresholds.moderate_max_combined)
            .contains(&t.combined_affinity)
    }

    /// Build the report for one comparison
    pub fn aggregate(&self, raw: &[RawTagComparison]) -> ComparisonReport {
        let mut tags: Vec<AffinityTag> = raw.iter().map(Self::normalize).collect();

        let avg_affinity = if tags.is_empty() {
            0.0
        } else {
            tags.iter().map(|t| t.combined_affinity).sum::<f64>() / tags.len() as f64
        };
        let overlap_score = (avg_affinity * self.thresholds.overlap_scale).clamp(0.0, 1.0);

        tags.sort_by(|a, b| b.combined_affinity.total_cmp(&a.combined_affinity));

        let t = &self.thresholds;
        let common_tags = take_matching(&tags, t.common_limit, |x| self.is_common(x));
        let profile1_stronger = take_matching(&tags, t.stronger_limit, |x| {
            self.leans(x.a_affinity, x.b_affinity, x.delta)
        });
        let profile2_stronger = take_matching(&tags, t.stronger_limit, |x| {
            self.leans(x.b_affinity, x.a_affinity, x.delta)
        });
        let top_tags = take_matching(&tags, t.top_limit, |x| self.is_top(x));
        let moderate_tags = take_matching(&tags, t.moderate_limit, |x| self.is_moderate(x));

        let mut tags_by_category: IndexMap<String, Vec<AffinityTag>> = IndexMap::new();
        for tag in &tags {
            tags_by_category
                .entry(self.category_of(tag))
                .or_default()
                .push(tag.clone());
        }

        debug!(
            "Aggregated {} tags: overlap {:.2}, {} common, {} top, {} categories",
            tags.len(),
            overlap_score,
            common_tags.len(),
            top_tags.len(),
            tags_by_category.len()
        );

        ComparisonReport {
            overlap_score,
            common_tags,
            profile1_stronger,
            profile2_stronger,
            top_tags,
            moderate_tags,
            tags_by_category,
            total_tags: tags.len(),
            avg_affinity,
            is_fallback: false,
            fallback_reason: None,
        }
    }
}
