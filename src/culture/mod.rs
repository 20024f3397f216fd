//! Cultural-graph API access
//!
//! `CultureApi` is the seam the rest of the crate talks to; `CultureClient`
//! is the HTTP implementation. Tests substitute their own implementations.

pub mod client;
pub mod models;

pub use client::CultureClient;
pub use models::{
    Analysis, AnalysisTag, Comparison, Entity, EntityType, HeatmapPoint, Insights,
    RawTagComparison, Tag, TrendPoint,
};

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CultureError {
    #[error("Cultural API error: {0}")]
    ApiError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type CultureResult<T> = Result<T, CultureError>;

/// Operations of the cultural-graph API
#[async_trait]
pub trait CultureApi: Send + Sync {
    /// Free-text entity search; `entity_type` filters the returned list
    async fn search(
        &self,
        query: &str,
        limit: usize,
        entity_type: Option<EntityType>,
    ) -> CultureResult<Vec<Entity>>;

    /// Recommendations of `filter_type` seeded by entities
    async fn insights(&self, entity_ids: &[String], filter_type: EntityType) -> CultureResult<Insights>;

    /// Recommendations of `target_type` seeded by tags
    async fn insights_by_tags(&self, tag_ids: &[String], target_type: EntityType) -> CultureResult<Insights>;

    /// Tags that characterize a set of entities
    async fn analysis(&self, entity_ids: &[String]) -> CultureResult<Analysis>;

    /// Per-tag affinity of two entity sets
    async fn compare(&self, a: &[String], b: &[String]) -> CultureResult<Comparison>;

    /// Geographic affinity around a point
    async fn heatmap(
        &self,
        entity_id: &str,
        longitude: f64,
        latitude: f64,
        radius_m: u32,
    ) -> CultureResult<Vec<HeatmapPoint>>;

    /// Weekly popularity between two dates
    async fn trend(&self, entity_id: &str, start: NaiveDate, end: NaiveDate) -> CultureResult<Vec<TrendPoint>>;
}
