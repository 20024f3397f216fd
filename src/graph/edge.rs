//! Edge implementation for the persona graph

use super::types::{EdgeKind, NodeId};
use serde::{Deserialize, Serialize};

/// A weighted edge between two nodes
///
/// Strength is kept in [0, 1]; it drives both the rendered line width and
/// the attraction of the link force.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Edge goes FROM this node
    pub source: NodeId,

    /// Edge goes TO this node
    pub target: NodeId,

    /// Weight in [0, 1]
    pub strength: f64,

    pub kind: EdgeKind,
}

impl GraphEdge {
    /// Create an edge, clamping strength into [0, 1]
    pub fn new(
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
        strength: f64,
        kind: EdgeKind,
    ) -> Self {
        let strength = if strength.is_finite() { strength.clamp(0.0, 1.0) } else { 0.0 };
        GraphEdge {
            source: source.into(),
            target: target.into(),
            strength,
            kind,
        }
    }

    /// Check if this edge connects two specific nodes (in either direction)
    pub fn connects(&self, a: &NodeId, b: &NodeId) -> bool {
        (&self.source == a && &self.target == b) || (&self.source == b && &self.target == a)
    }

    /// Check if either endpoint is `node`
    pub fn touches(&self, node: &NodeId) -> bool {
        &self.source == node || &self.target == node
    }

    /// The endpoint opposite `node`, if `node` is an endpoint
    pub fn other_end(&self, node: &NodeId) -> Option<&NodeId> {
        if &self.source == node {
            Some(&self.target)
        } else if &self.target == node {
            Some(&self.source)
        } else {
            None
        }
    }
}
