//! Node implementation for the persona graph
//!
//! A node is the user at the centre, a cultural tag, or one of the selected
//! entities. Labels are kept in full; shortening for display is done by the
//! render layer.

use super::types::{NodeId, NodeKind};
use serde::{Deserialize, Serialize};

/// Variant-specific payload of a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeData {
    /// The persona owner; exactly one per graph
    User,
    /// A deduplicated cultural tag
    Tag {
        /// Upstream tag id when one was known
        tag_id: Option<String>,
    },
    /// A selected entity
    Entity {
        entity_id: String,
        entity_type: String,
        /// Confidence, falling back to popularity, falling back to 0.5
        weight: f64,
    },
}

/// A node in the persona graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Unique identifier for this node
    pub id: NodeId,

    /// Full display label
    pub label: String,

    /// Visual weight, also the collision radius in the layout
    pub radius: f64,

    #[serde(flatten)]
    pub data: NodeData,
}

impl GraphNode {
    pub fn user(id: impl Into<NodeId>, label: impl Into<String>, radius: f64) -> Self {
        GraphNode {
            id: id.into(),
            label: label.into(),
            radius,
            data: NodeData::User,
        }
    }

    pub fn tag(
        id: impl Into<NodeId>,
        label: impl Into<String>,
        radius: f64,
        tag_id: Option<String>,
    ) -> Self {
        GraphNode {
            id: id.into(),
            label: label.into(),
            radius,
            data: NodeData::Tag { tag_id },
        }
    }

    pub fn entity(
        id: impl Into<NodeId>,
        label: impl Into<String>,
        radius: f64,
        entity_id: impl Into<String>,
        entity_type: impl Into<String>,
        weight: f64,
    ) -> Self {
        GraphNode {
            id: id.into(),
            label: label.into(),
            radius,
            data: NodeData::Entity {
                entity_id: entity_id.into(),
                entity_type: entity_type.into(),
                weight,
            },
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self.data {
            NodeData::User => NodeKind::User,
            NodeData::Tag { .. } => NodeKind::Tag,
            NodeData::Entity { .. } => NodeKind::Entity,
        }
    }

    pub fn is_user(&self) -> bool {
        matches!(self.data, NodeData::User)
    }
}
