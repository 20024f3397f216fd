//! Tastegraph
//!
//! Builds a cultural persona from entities a user likes (artists, films,
//! books, places, ...) and computes the data behind its views: a
//! cross-domain force graph of the persona, tag-affinity comparisons
//! between two sets of tastes, geographic heatmaps, popularity trends and
//! generated narrative content.
//!
//! # Layout
//!
//! - `graph`: persona → node/edge graph
//! - `layout`: force simulation adapter and background frame driver
//!   (the physics lives in the `tastegraph-layout` crate)
//! - `interaction`: viewport, click/double-click, hover and debounce
//! - `render`: renderer-agnostic frame snapshots
//! - `affinity`: comparison aggregation
//! - `culture` / `narrative`: upstream API clients
//! - `session`: key/value persona session
//! - `persona`: orchestration with explicit fallbacks
//!
//! ## Example Usage
//!
//! ```rust
//! use tastegraph::culture::{Entity, EntityType, Tag};
//! use tastegraph::graph::GraphBuilder;
//! use tastegraph::persona::PersonaRecord;
//!
//! let mut album = Entity::new("e1", "In Rainbows", EntityType::Artist);
//! album.tags = vec![Tag::named("indie"), Tag::named("art rock")];
//!
//! let persona = PersonaRecord::new(vec!["indie".to_string()], vec![album]);
//! let graph = GraphBuilder::new(42).build(&persona).unwrap();
//!
//! assert_eq!(graph.node_count(), 4);
//! graph.validate().unwrap();
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod affinity;
pub mod config;
pub mod culture;
pub mod graph;
pub mod interaction;
pub mod layout;
pub mod narrative;
pub mod persona;
pub mod render;
pub mod session;

// Re-export main types for convenience
pub use graph::{
    GraphBuilder, GraphEdge, GraphError, GraphNode, GraphResult, NodeId, NodeKind, PersonaGraph,
};

pub use affinity::{AffinityAggregator, AffinityTag, AffinityThresholds, ComparisonReport};

pub use config::{AppConfig, ConfigError, ConfigResult, LLMProvider};

pub use culture::{CultureApi, CultureClient, CultureError, CultureResult, Entity, EntityType, Tag};

pub use narrative::{ContentKind, GenerationClient, GenerationError, GenerationResult, TextGenerator};

pub use session::{
    KeyValueStore, MemoryStore, PersonaSession, RocksStore, Route, SessionError, SessionResult,
};

pub use persona::{Fetched, PersonaRecord, PersonaService};

pub use layout::{LayoutCommand, LayoutDriver, LayoutFrame};

pub use render::{display_label, RenderFrame};

pub use tastegraph_layout::{LayoutConfig, PinState, Simulation};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
