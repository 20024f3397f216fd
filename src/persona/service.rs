//! Persona service
//!
//! Every upstream call goes through here. Failures are logged and replaced
//! by flagged placeholder data; only missing local state is an error.

use super::search::SearchCache;
use super::summary::{demo_heatmap, HeatmapSummary, TrendSummary};
use super::{Fetched, PersonaRecord};
use crate::affinity::{AffinityAggregator, ComparisonReport};
use crate::config::AppConfig;
use crate::culture::{CultureApi, Entity, EntityType, Insights};
use crate::graph::{GraphBuilder, GraphError, PersonaGraph};
use crate::interaction::debounced;
use crate::narrative::{build_prompt, ContentKind, PromptContext, TextGenerator};
use crate::session::{PersonaSession, SessionError};
use chrono::NaiveDate;
use futures::future::join_all;
use indexmap::IndexSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Tags kept on a persona
pub const PERSONA_TAG_LIMIT: usize = 12;
/// Hotspots reported by a heatmap summary
pub const HOTSPOT_LIMIT: usize = 5;

#[derive(Error, Debug)]
pub enum PersonaError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("At least one entity must be selected")]
    EmptySelection,
}

pub type PersonaResult<T> = Result<T, PersonaError>;

pub struct PersonaService {
    culture: Arc<dyn CultureApi>,
    generator: Arc<dyn TextGenerator>,
    session: PersonaSession,
    aggregator: AffinityAggregator,
    search_cache: SearchCache,
    search_debounce: Duration,
    graph_seed: u64,
}

/// Tags carried by the entities themselves, deduplicated in order
fn tags_from_entities(entities: &[Entity], limit: usize) -> Vec<String> {
    let mut seen = IndexSet::new();
    for tag in entities.iter().flat_map(|e| e.tags.iter()) {
        let identity = tag.identity();
        if !identity.is_empty() {
            seen.insert(identity.to_string());
        }
        if seen.len() == limit {
            break;
        }
    }
    seen.into_iter().collect()
}

impl PersonaService {
    pub fn new(
        culture: Arc<dyn CultureApi>,
        generator: Arc<dyn TextGenerator>,
        session: PersonaSession,
        config: &AppConfig,
    ) -> Self {
        Self {
            culture,
            generator,
            session,
            aggregator: AffinityAggregator::new(config.affinity.clone()),
            search_cache: SearchCache::new(config.culture.search_cache_size, chrono::Duration::minutes(10)),
            search_debounce: Duration::from_millis(config.culture.search_debounce_ms),
            graph_seed: config.graph_seed,
        }
    }

    pub fn session(&self) -> &PersonaSession {
        &self.session
    }

    pub fn aggregator(&self) -> &AffinityAggregator {
        &self.aggregator
    }

    /// Entity search; live results are cached
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
        entity_type: Option<EntityType>,
    ) -> Fetched<Vec<Entity>> {
        if query.trim().is_empty() {
            return Fetched::Live(Vec::new());
        }
        if let Some(hit) = self.search_cache.get(query, limit, entity_type) {
            return Fetched::Live(hit);
        }

        match self.culture.search(query, limit, entity_type).await {
            Ok(entities) => {
                self.search_cache.insert(query, limit, entity_type, entities.clone());
                Fetched::Live(entities)
            }
            Err(e) => {
                warn!("Search '{}' failed: {}", query, e);
                Fetched::fallback(Vec::new(), e.to_string())
            }
        }
    }

    /// Search-as-you-type. Queries arriving within the debounce window of
    /// a newer one are dropped; each surviving query is searched and sent
    /// to `results` with its outcome. Returns once `queries` closes or the
    /// receiving side of `results` is gone.
    pub async fn live_search(
        &self,
        queries: mpsc::Receiver<String>,
        limit: usize,
        entity_type: Option<EntityType>,
        results: mpsc::Sender<(String, Fetched<Vec<Entity>>)>,
    ) {
        let mut settled = debounced(queries, self.search_debounce);
        while let Some(query) = settled.recv().await {
            debug!("Live search '{}'", query);
            let fetched = self.search(&query, limit, entity_type).await;
            if results.send((query, fetched)).await.is_err() {
                break;
            }
        }
    }

    /// Derive tags for the selected entities and store the persona.
    ///
    /// Tags come from the analysis endpoint, strongest first. When that
    /// fails or yields nothing, the entities' own tags are used instead.
    pub async fn build_persona(&self, entities: Vec<Entity>) -> PersonaResult<Fetched<PersonaRecord>> {
        if entities.is_empty() {
            return Err(PersonaError::EmptySelection);
        }
        let ids: Vec<String> = entities.iter().map(|e| e.id.clone()).collect();

        let analysis = self.culture.analysis(&ids).await;
        let fetched = match analysis {
            Ok(mut analysis) if !analysis.tags.is_empty() => {
                analysis.tags.sort_by(|a, b| b.affinity.total_cmp(&a.affinity));
                let mut tags = IndexSet::new();
                for tag in &analysis.tags {
                    let name = tag.name.trim();
                    if !name.is_empty() {
                        tags.insert(name.to_string());
                    }
                }
                let tags: Vec<String> = tags.into_iter().take(PERSONA_TAG_LIMIT).collect();
                Fetched::Live(PersonaRecord::new(tags, entities))
            }
            Ok(_) => {
                let tags = tags_from_entities(&entities, PERSONA_TAG_LIMIT);
                Fetched::fallback(PersonaRecord::new(tags, entities), "analysis returned no tags")
            }
            Err(e) => {
                warn!("Analysis failed, using entity tags: {}", e);
                let tags = tags_from_entities(&entities, PERSONA_TAG_LIMIT);
                Fetched::fallback(PersonaRecord::new(tags, entities), e.to_string())
            }
        };

        self.session.save_persona(fetched.data())?;
        info!(
            "Built persona from {} entities ({} tags{})",
            fetched.data().entities.len(),
            fetched.data().tags.len(),
            if fetched.is_fallback() { ", fallback" } else { "" }
        );
        Ok(fetched)
    }

    pub fn current_persona(&self) -> PersonaResult<PersonaRecord> {
        Ok(self.session.load_persona()?)
    }

    /// Force graph of the stored persona
    pub fn persona_graph(&self) -> PersonaResult<PersonaGraph> {
        let persona = self.current_persona()?;
        Ok(GraphBuilder::new(self.graph_seed).build(&persona)?)
    }

    /// Recommendations of one type seeded by the persona's entities
    pub async fn recommendations(&self, filter_type: EntityType) -> PersonaResult<Fetched<Insights>> {
        let persona = self.current_persona()?;
        Ok(self.insights_or_fallback(&persona.entity_ids(), filter_type).await)
    }

    async fn insights_or_fallback(&self, ids: &[String], filter_type: EntityType) -> Fetched<Insights> {
        match self.culture.insights(ids, filter_type).await {
            Ok(insights) => Fetched::Live(insights),
            Err(e) => {
                warn!("Insights for {} failed: {}", filter_type, e);
                Fetched::fallback(Insights::default(), e.to_string())
            }
        }
    }

    /// Recommendations for several types, fetched concurrently
    pub async fn recommendations_for(
        &self,
        types: &[EntityType],
    ) -> PersonaResult<Vec<(EntityType, Fetched<Insights>)>> {
        let persona = self.current_persona()?;
        let ids = persona.entity_ids();

        let requests = types.iter().map(|&t| {
            let ids = &ids;
            async move { (t, self.insights_or_fallback(ids, t).await) }
        });
        Ok(join_all(requests).await)
    }

    /// Compare two entity sets
    pub async fn compare(&self, a: &[String], b: &[String]) -> Fetched<ComparisonReport> {
        let reason = match self.culture.compare(a, b).await {
            Ok(comparison) if !comparison.tags.is_empty() => {
                return Fetched::Live(self.aggregator.aggregate(&comparison.tags));
            }
            Ok(_) => "comparison returned no tags".to_string(),
            Err(e) => e.to_string(),
        };
        let report = self.aggregator.fallback(reason.clone());
        Fetched::fallback(report, reason)
    }

    /// Compare the stored persona against another entity set
    pub async fn compare_with_persona(&self, other: &[String]) -> PersonaResult<Fetched<ComparisonReport>> {
        let persona = self.current_persona()?;
        Ok(self.compare(&persona.entity_ids(), other).await)
    }

    pub async fn heatmap(
        &self,
        entity_id: &str,
        longitude: f64,
        latitude: f64,
        radius_m: u32,
    ) -> Fetched<HeatmapSummary> {
        let reason = match self.culture.heatmap(entity_id, longitude, latitude, radius_m).await {
            Ok(points) if !points.is_empty() => {
                return Fetched::Live(HeatmapSummary::from_points(&points, HOTSPOT_LIMIT));
            }
            Ok(_) => "heatmap returned no points".to_string(),
            Err(e) => e.to_string(),
        };
        warn!("Serving demo heatmap for {}: {}", entity_id, reason);
        Fetched::fallback(
            HeatmapSummary::from_points(&demo_heatmap(longitude, latitude), HOTSPOT_LIMIT),
            reason,
        )
    }

    pub async fn trend(&self, entity_id: &str, start: NaiveDate, end: NaiveDate) -> Fetched<TrendSummary> {
        match self.culture.trend(entity_id, start, end).await {
            Ok(points) => Fetched::Live(TrendSummary::from_points(&points)),
            Err(e) => {
                warn!("Trend for {} failed: {}", entity_id, e);
                Fetched::fallback(TrendSummary::from_points(&[]), e.to_string())
            }
        }
    }

    /// Generated content for the stored persona, served from the session
    /// cache unless `refresh` is set. Content built around a comparison is
    /// always generated afresh, since the cache slot is keyed by kind
    /// only. Placeholder text is never cached.
    pub async fn generate(
        &self,
        kind: ContentKind,
        comparison: Option<&ComparisonReport>,
        refresh: bool,
    ) -> PersonaResult<Fetched<String>> {
        let persona = self.current_persona()?;

        if !refresh && comparison.is_none() {
            if let Some(cached) = self.session.cached_content(kind)? {
                return Ok(Fetched::Live(cached.text));
            }
        }

        let ctx = PromptContext {
            entity_names: persona.entities.iter().map(|e| e.name.as_str()).collect(),
            tags: persona.tags.iter().map(String::as_str).collect(),
            comparison,
        };
        let prompt = build_prompt(kind, &ctx);

        match self.generator.generate(&prompt).await {
            Ok(text) => {
                self.session.store_content(kind, &text)?;
                Ok(Fetched::Live(text))
            }
            Err(e) => {
                warn!("Generating {} failed: {}", kind, e);
                Ok(Fetched::fallback(kind.placeholder().to_string(), e.to_string()))
            }
        }
    }

    /// End the session
    pub fn reset(&self) -> PersonaResult<()> {
        self.session.reset()?;
        self.search_cache.clear();
        Ok(())
    }
}
