//! Integration tests for comparison aggregation
//!
//! Feeds API-shaped JSON through the aggregator and checks the report.

use serde_json::json;
use tastegraph::affinity::AffinityAggregator;
use tastegraph::culture::Comparison;

fn comparison(value: serde_json::Value) -> Comparison {
    serde_json::from_value(value).unwrap()
}

#[test]
fn test_indie_example_from_api_json() {
    let raw = comparison(json!({
        "tags": [{
            "name": "indie",
            "tag_id": "urn:tag:genre:indie",
            "subtype": "urn:tag:genre:music",
            "query": {"affinity": 0.0045, "a": {"affinity": 0.005}, "b": {"affinity": 0.004}, "delta": 1.1}
        }]
    }));

    let report = AffinityAggregator::default().aggregate(&raw.tags);

    assert!((report.overlap_score - 0.9).abs() < 1e-9);
    assert_eq!(report.overlap_percent(), 90);
    assert_eq!(report.common_tags[0].name, "indie");
    assert_eq!(report.top_tags[0].name, "indie");
    assert_eq!(report.tags_by_category.keys().collect::<Vec<_>>(), vec!["genre"]);
}

#[test]
fn test_missing_numbers_are_zero_and_uncategorized() {
    let raw = comparison(json!({
        "tags": [{"name": "mystery", "query": {}}]
    }));

    let report = AffinityAggregator::default().aggregate(&raw.tags);
    let tag = &report.tags_by_category["other"][0];

    assert_eq!(tag.name, "mystery");
    assert_eq!(tag.a_affinity, 0.0);
    assert_eq!(tag.combined_affinity, 0.0);
    assert!(report.common_tags.is_empty());
    assert!(report.top_tags.is_empty());
    assert_eq!(report.overlap_score, 0.0);
}

#[test]
fn test_overlap_is_clamped_and_lists_are_capped() {
    let tags: Vec<_> = (0..20)
        .map(|i| {
            json!({
                "name": format!("tag{}", i),
                "tag_id": format!("urn:tag:keyword:{}", i),
                "subtype": "urn:tag:keyword:media",
                "query": {"affinity": 0.009, "a": {"affinity": 0.009}, "b": {"affinity": 0.009}, "delta": 1.0}
            })
        })
        .collect();
    let raw = comparison(json!({ "tags": tags }));

    let agg = AffinityAggregator::default();
    let report = agg.aggregate(&raw.tags);

    assert_eq!(report.overlap_score, 1.0);
    assert_eq!(report.total_tags, 20);
    assert_eq!(report.common_tags.len(), agg.thresholds().common_limit);
    assert_eq!(report.top_tags.len(), agg.thresholds().top_limit);
    assert_eq!(report.tags_by_category["keyword"].len(), 20);
}

#[test]
fn test_results_sorted_by_combined_affinity() {
    let raw = comparison(json!({
        "tags": [
            {"name": "low", "query": {"affinity": 0.0041, "a": {"affinity": 0.004}, "b": {"affinity": 0.004}, "delta": 1.0}},
            {"name": "high", "query": {"affinity": 0.008, "a": {"affinity": 0.008}, "b": {"affinity": 0.008}, "delta": 1.0}}
        ]
    }));

    let report = AffinityAggregator::default().aggregate(&raw.tags);
    let names: Vec<&str> = report.top_tags.iter().map(|t| t.name.as_str()).collect();

    assert_eq!(names, vec!["high", "low"]);
}

#[test]
fn test_fallback_report_is_labeled() {
    let report = AffinityAggregator::default().fallback("upstream timed out");

    assert!(report.is_fallback);
    assert_eq!(report.fallback_reason.as_deref(), Some("upstream timed out"));
    assert!(report.total_tags > 0);
}
