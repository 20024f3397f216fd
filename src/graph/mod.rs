//! Persona graph model
//!
//! This module implements the node-link graph behind the taste map:
//! - A singleton user node, tag nodes and entity nodes
//! - Weighted user-tag, user-entity and entity-tag edges
//! - Construction from a persona record with seeded cosmetic jitter
//! - Hash-indexed in-memory storage with referential-integrity checks

pub mod builder;
pub mod edge;
pub mod node;
pub mod store;
pub mod types;

// Re-export main types
pub use builder::{slugify, GraphBuilder, MAX_ENTITY_NODES, USER_NODE_ID};
pub use edge::GraphEdge;
pub use node::{GraphNode, NodeData};
pub use store::{GraphError, GraphResult, PersonaGraph};
pub use types::{EdgeKind, NodeId, NodeKind};
