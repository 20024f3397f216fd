//! Data models for the cultural-graph API
//!
//! Response shapes are fixed by the upstream service. Every numeric field is
//! optional on the wire and defaults when absent so a partially filled
//! record never fails the whole response.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Known entity types, identified upstream by `urn:entity:*`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Artist,
    Movie,
    TvShow,
    Book,
    Place,
    Destination,
    Podcast,
    VideoGame,
    Brand,
    Person,
}

impl EntityType {
    pub const ALL: [EntityType; 10] = [
        EntityType::Artist,
        EntityType::Movie,
        EntityType::TvShow,
        EntityType::Book,
        EntityType::Place,
        EntityType::Destination,
        EntityType::Podcast,
        EntityType::VideoGame,
        EntityType::Brand,
        EntityType::Person,
    ];

    pub fn urn(&self) -> &'static str {
        match self {
            EntityType::Artist => "urn:entity:artist",
            EntityType::Movie => "urn:entity:movie",
            EntityType::TvShow => "urn:entity:tv_show",
            EntityType::Book => "urn:entity:book",
            EntityType::Place => "urn:entity:place",
            EntityType::Destination => "urn:entity:destination",
            EntityType::Podcast => "urn:entity:podcast",
            EntityType::VideoGame => "urn:entity:videogame",
            EntityType::Brand => "urn:entity:brand",
            EntityType::Person => "urn:entity:person",
        }
    }

    /// Parse either the urn form or the bare name (`artist`, `tv_show`)
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        let bare = s.strip_prefix("urn:entity:").unwrap_or(&s);
        Self::ALL.into_iter().find(|t| {
            let name = &t.urn()["urn:entity:".len()..];
            name == bare || name.replace('_', "") == bare.replace(['_', '-', ' '], "")
        })
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.urn())
    }
}

/// Wire forms a tag can take: a bare string or an object
#[derive(Deserialize)]
#[serde(untagged)]
enum TagRepr {
    Name(String),
    Object {
        #[serde(default, alias = "tag_id")]
        id: Option<String>,
        #[serde(default)]
        name: Option<String>,
        #[serde(default, alias = "affinity")]
        score: Option<f64>,
    },
}

/// A cultural descriptor attached to a persona or an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TagRepr")]
pub struct Tag {
    pub id: Option<String>,
    pub name: String,
    pub score: Option<f64>,
}

impl From<TagRepr> for Tag {
    fn from(repr: TagRepr) -> Self {
        match repr {
            TagRepr::Name(name) => Tag { id: None, name, score: None },
            TagRepr::Object { id, name, score } => Tag {
                id,
                name: name.unwrap_or_default(),
                score,
            },
        }
    }
}

impl Tag {
    pub fn named(name: impl Into<String>) -> Self {
        Tag { id: None, name: name.into(), score: None }
    }

    pub fn with_id(id: impl Into<String>, name: impl Into<String>) -> Self {
        Tag { id: Some(id.into()), name: name.into(), score: None }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    /// Deduplication key: the trimmed name, or the id when the name is blank
    pub fn identity(&self) -> &str {
        let name = self.name.trim();
        if name.is_empty() {
            self.id.as_deref().map(str::trim).unwrap_or("")
        } else {
            name
        }
    }
}

/// Wire form of an entity. Upstream records may carry both `id` and
/// `entity_id`, and both a generic `type` and a specific `subtype`.
#[derive(Deserialize)]
struct EntityRepr {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    entity_id: Option<String>,
    name: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    subtype: Option<String>,
    #[serde(default)]
    popularity: Option<f64>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    tags: Vec<Tag>,
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

impl TryFrom<EntityRepr> for Entity {
    type Error = String;

    fn try_from(repr: EntityRepr) -> Result<Self, Self::Error> {
        let id = non_blank(repr.entity_id)
            .or_else(|| non_blank(repr.id))
            .ok_or_else(|| format!("entity '{}' has no id", repr.name))?;
        Ok(Entity {
            id,
            name: repr.name,
            entity_type: non_blank(repr.subtype).or_else(|| non_blank(repr.kind)).unwrap_or_default(),
            popularity: repr.popularity,
            confidence: repr.confidence,
            tags: repr.tags,
        })
    }
}

/// An external cultural object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EntityRepr")]
pub struct Entity {
    pub id: String,
    pub name: String,
    /// The most specific type urn available (`subtype` wins over `type`)
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Entity {
    pub fn new(id: impl Into<String>, name: impl Into<String>, entity_type: EntityType) -> Self {
        Entity {
            id: id.into(),
            name: name.into(),
            entity_type: entity_type.urn().to_string(),
            popularity: None,
            confidence: None,
            tags: Vec::new(),
        }
    }

    /// `confidence ?? popularity ?? 0.5`
    pub fn weight(&self) -> f64 {
        self.confidence.or(self.popularity).unwrap_or(0.5)
    }

    pub fn kind(&self) -> Option<EntityType> {
        EntityType::parse(&self.entity_type)
    }

    pub fn is_type(&self, entity_type: EntityType) -> bool {
        self.kind() == Some(entity_type)
    }
}

/// `insights(...) -> {entities, tags}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// One tag of an analysis result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisTag {
    #[serde(default)]
    pub tag_id: String,
    pub name: String,
    #[serde(default)]
    pub affinity: f64,
}

/// `analysis(ids) -> {tags, entities}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    #[serde(default)]
    pub tags: Vec<AnalysisTag>,
    #[serde(default)]
    pub entities: Vec<Entity>,
}

/// A per-profile affinity value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SideAffinity {
    #[serde(default)]
    pub affinity: Option<f64>,
}

/// Query block of a comparison record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonQuery {
    #[serde(default)]
    pub affinity: Option<f64>,
    #[serde(default)]
    pub a: Option<SideAffinity>,
    #[serde(default)]
    pub b: Option<SideAffinity>,
    #[serde(default)]
    pub delta: Option<f64>,
}

/// One tag as returned by `compare(a, b)`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTagComparison {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tag_id: String,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub query: ComparisonQuery,
}

/// `compare(a, b) -> {tags}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    #[serde(default)]
    pub tags: Vec<RawTagComparison>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub geohash: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeatmapQuery {
    #[serde(default)]
    pub affinity: f64,
    #[serde(default)]
    pub affinity_rank: f64,
    #[serde(default)]
    pub popularity: f64,
}

/// A geo-located affinity sample
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeatmapPoint {
    pub location: GeoLocation,
    #[serde(default)]
    pub query: HeatmapQuery,
}

/// One week of an entity's popularity trend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: chrono::NaiveDate,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub rank: i64,
    #[serde(default)]
    pub rank_delta: i64,
    #[serde(default)]
    pub population_percent_delta: f64,
}
