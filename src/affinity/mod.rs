//! Tag-affinity comparison
//!
//! Turns the raw per-tag records of a two-profile comparison into the
//! classified views shown to the user: overlap score, shared tags, tags
//! skewed toward either profile, strongest and moderate tags, and tags
//! grouped by category.

pub mod aggregator;
pub mod fallback;

pub use aggregator::AffinityAggregator;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Classification thresholds.
///
/// The defaults are tuned to the upstream API, whose affinities sit on a
/// roughly 0..0.005 scale; `overlap_scale` maps that range onto 0..1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AffinityThresholds {
    /// Multiplier applied to the mean combined affinity
    pub overlap_scale: f64,
    /// Both sides must exceed this for a tag to be shared
    pub common_min_affinity: f64,
    /// Shared tags must be less lopsided than this
    pub common_max_delta: f64,
    pub common_limit: usize,
    /// A tag leans toward one profile above this delta
    pub stronger_min_delta: f64,
    /// ... and when that profile's affinity exceeds this
    pub stronger_min_affinity: f64,
    pub stronger_limit: usize,
    pub top_min_combined: f64,
    pub top_limit: usize,
    pub moderate_min_combined: f64,
    pub moderate_max_combined: f64,
    pub moderate_limit: usize,
    /// Prefix stripped from subtypes before taking the category segment
    pub subtype_prefix: String,
}

impl Default for AffinityThresholds {
    fn default() -> Self {
        Self {
            overlap_scale: 200.0,
            common_min_affinity: 0.0015,
            common_max_delta: 2.0,
            common_limit: 15,
            stronger_min_delta: 1.3,
            stronger_min_affinity: 0.002,
            stronger_limit: 12,
            top_min_combined: 0.004,
            top_limit: 10,
            moderate_min_combined: 0.003,
            moderate_max_combined: 0.004,
            moderate_limit: 10,
            subtype_prefix: "urn:tag:".to_string(),
        }
    }
}

/// A tag extended with both profiles' affinities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffinityTag {
    pub name: String,
    pub tag_id: String,
    pub subtype: Option<String>,
    pub a_affinity: f64,
    pub b_affinity: f64,
    pub combined_affinity: f64,
    /// How lopsided the tag is between the two profiles
    pub delta: f64,
}

/// Classified view of one comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Mean combined affinity scaled into [0, 1]
    pub overlap_score: f64,
    pub common_tags: Vec<AffinityTag>,
    pub profile1_stronger: Vec<AffinityTag>,
    pub profile2_stronger: Vec<AffinityTag>,
    pub top_tags: Vec<AffinityTag>,
    pub moderate_tags: Vec<AffinityTag>,
    pub tags_by_category: IndexMap<String, Vec<AffinityTag>>,
    pub total_tags: usize,
    pub avg_affinity: f64,
    /// Set when the report holds placeholder data instead of upstream results
    pub is_fallback: bool,
    pub fallback_reason: Option<String>,
}

impl ComparisonReport {
    /// Overlap as a whole percentage for display
    pub fn overlap_percent(&self) -> u32 {
        (self.overlap_score * 100.0).round() as u32
    }
}
