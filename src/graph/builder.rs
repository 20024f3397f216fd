//! Persona graph construction
//!
//! Builds the user/tag/entity graph the layout engine consumes:
//! - one user node at the centre
//! - one tag node per distinct tag across the persona and its entities
//! - up to eight entity nodes
//! - user-tag, user-entity and entity-tag (cross-domain) edges
//!
//! Cosmetic jitter on tag radii and user-tag strengths comes from a seeded
//! generator, so a given seed always reproduces the same graph.

use super::edge::GraphEdge;
use super::node::GraphNode;
use super::store::{GraphResult, PersonaGraph};
use super::types::{EdgeKind, NodeId};
use crate::culture::models::Entity;
use crate::persona::PersonaRecord;
use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;
use rustc_hash::FxHashSet;
use std::sync::OnceLock;
use tracing::debug;

/// Id of the singleton user node
pub const USER_NODE_ID: &str = "center";
/// Label of the user node
pub const USER_LABEL: &str = "You";
/// Radius of the user node
pub const USER_RADIUS: f64 = 20.0;
/// Entities beyond this many are left out of the graph
pub const MAX_ENTITY_NODES: usize = 8;
/// Persona tags linked directly to the user
pub const MAX_USER_TAG_EDGES: usize = 8;
/// Tags of each entity linked to that entity
pub const MAX_TAGS_PER_ENTITY: usize = 3;
/// Strength of entity-tag edges when the tag carries no score
pub const DEFAULT_TAG_SCORE: f64 = 0.6;

fn slug_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("static pattern"))
}

/// Lowercase, collapse every non-alphanumeric run to `-`
pub fn slugify(s: &str) -> String {
    let lowered = s.trim().to_lowercase();
    let slug = slug_pattern().replace_all(&lowered, "-");
    slug.trim_matches('-').to_string()
}

/// Hands out unique node ids, suffixing `-2`, `-3`, ... on collision
#[derive(Debug, Default)]
struct IdAllocator {
    used: FxHashSet<String>,
}

impl IdAllocator {
    fn reserve(&mut self, id: &str) {
        self.used.insert(id.to_string());
    }

    fn allocate(&mut self, prefix: &str, raw: &str) -> NodeId {
        let slug = slugify(raw);
        let base = if slug.is_empty() {
            prefix.to_string()
        } else {
            format!("{}-{}", prefix, slug)
        };

        let mut candidate = base.clone();
        let mut n = 2;
        while self.used.contains(&candidate) {
            candidate = format!("{}-{}", base, n);
            n += 1;
        }
        self.used.insert(candidate.clone());
        NodeId::new(candidate)
    }
}

/// A distinct tag collected from the persona
struct TagEntry {
    label: String,
    tag_id: Option<String>,
}

/// Builds `PersonaGraph`s from persona records
pub struct GraphBuilder {
    rng: StdRng,
}

impl GraphBuilder {
    /// Builder whose jitter is drawn from `seed`
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Construct the graph. An empty entity list still yields the user node
    /// and the persona's tags.
    pub fn build(&mut self, persona: &PersonaRecord) -> GraphResult<PersonaGraph> {
        let entities: Vec<&Entity> = persona.entities.iter().take(MAX_ENTITY_NODES).collect();

        // 1. Distinct tags, persona tags first
        let mut tags: IndexMap<String, TagEntry> = IndexMap::new();
        let mut persona_tags: Vec<String> = Vec::new();
        for raw in &persona.tags {
            let name = raw.trim();
            if name.is_empty() {
                continue;
            }
            if !tags.contains_key(name) {
                persona_tags.push(name.to_string());
                tags.insert(
                    name.to_string(),
                    TagEntry { label: name.to_string(), tag_id: None },
                );
            }
        }
        for tag in persona.entities.iter().flat_map(|e| e.tags.iter()) {
            let identity = tag.identity();
            if identity.is_empty() {
                continue;
            }
            let entry = tags.entry(identity.to_string()).or_insert_with(|| TagEntry {
                label: identity.to_string(),
                tag_id: None,
            });
            if entry.tag_id.is_none() {
                entry.tag_id = tag.id.clone();
            }
        }

        // 2. Nodes
        let mut graph = PersonaGraph::new();
        let mut ids = IdAllocator::default();
        ids.reserve(USER_NODE_ID);
        graph.add_node(GraphNode::user(USER_NODE_ID, USER_LABEL, USER_RADIUS))?;

        let mut tag_nodes: IndexMap<&str, NodeId> = IndexMap::with_capacity(tags.len());
        for (identity, entry) in &tags {
            let id = ids.allocate("tag", identity);
            let radius = 8.0 + self.rng.gen_range(0.0..4.0);
            graph.add_node(GraphNode::tag(id.clone(), entry.label.clone(), radius, entry.tag_id.clone()))?;
            tag_nodes.insert(identity.as_str(), id);
        }

        let mut entity_nodes: Vec<(NodeId, &Entity)> = Vec::with_capacity(entities.len());
        for &entity in &entities {
            let id = ids.allocate("entity", &entity.id);
            let weight = entity.weight().clamp(0.0, 1.0);
            graph.add_node(GraphNode::entity(
                id.clone(),
                entity.name.clone(),
                6.0 + weight * 8.0,
                entity.id.clone(),
                entity.entity_type.clone(),
                weight,
            ))?;
            entity_nodes.push((id, entity));
        }

        // 3. Edges
        let user = NodeId::new(USER_NODE_ID);
        for name in persona_tags.iter().take(MAX_USER_TAG_EDGES) {
            if let Some(target) = tag_nodes.get(name.as_str()) {
                let strength = 0.7 + self.rng.gen_range(0.0..0.3);
                graph.add_edge(GraphEdge::new(user.clone(), target.clone(), strength, EdgeKind::UserTag))?;
            }
        }

        for (id, entity) in &entity_nodes {
            graph.add_edge(GraphEdge::new(user.clone(), id.clone(), entity.weight(), EdgeKind::UserEntity))?;
        }

        for (id, entity) in &entity_nodes {
            let mut linked: FxHashSet<&str> = FxHashSet::default();
            for tag in entity.tags.iter().take(MAX_TAGS_PER_ENTITY) {
                let identity = tag.identity();
                if !linked.insert(identity) {
                    continue;
                }
                if let Some(target) = tag_nodes.get(identity) {
                    let strength = tag.score.unwrap_or(DEFAULT_TAG_SCORE);
                    graph.add_edge(GraphEdge::new(id.clone(), target.clone(), strength, EdgeKind::EntityTag))?;
                }
            }
        }

        debug!(
            "Built persona graph: {} nodes ({} tags, {} entities), {} edges",
            graph.node_count(),
            tag_nodes.len(),
            entity_nodes.len(),
            graph.edge_count()
        );

        Ok(graph)
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new(0)
    }
}
