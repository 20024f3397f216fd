//! Hover highlighting

use crate::graph::{NodeId, PersonaGraph};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

pub const HOVER_SCALE: f64 = 1.3;
pub const BASE_EDGE_OPACITY: f64 = 0.6;
pub const HIGHLIGHT_EDGE_OPACITY: f64 = 1.0;
pub const DIMMED_EDGE_OPACITY: f64 = 0.1;
pub const HIGHLIGHT_EDGE_WIDTH: f64 = 1.5;
pub const DIMMED_NODE_OPACITY: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeStyle {
    pub scale: f64,
    pub opacity: f64,
}

impl NodeStyle {
    pub const BASE: NodeStyle = NodeStyle { scale: 1.0, opacity: 1.0 };
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeStyle {
    pub opacity: f64,
    /// Multiplier on the edge's base width
    pub width: f64,
}

impl EdgeStyle {
    pub const BASE: EdgeStyle = EdgeStyle { opacity: BASE_EDGE_OPACITY, width: 1.0 };
}

/// Styles for every node and edge; `edges` follows `PersonaGraph::edges` order
#[derive(Debug, Clone, PartialEq)]
pub struct HoverStyles {
    pub nodes: FxHashMap<NodeId, NodeStyle>,
    pub edges: Vec<EdgeStyle>,
}

impl HoverStyles {
    pub fn node(&self, id: &NodeId) -> NodeStyle {
        self.nodes.get(id).copied().unwrap_or(NodeStyle::BASE)
    }
}

/// Styles with `hovered` highlighted, or the baseline when nothing is hovered
/// (or the hovered id is not in the graph)
pub fn hover_styles(graph: &PersonaGraph, hovered: Option<&NodeId>) -> HoverStyles {
    let hovered = hovered.filter(|id| graph.has_node(id.as_str()));

    let Some(hovered) = hovered else {
        return HoverStyles {
            nodes: graph.nodes().iter().map(|n| (n.id.clone(), NodeStyle::BASE)).collect(),
            edges: vec![EdgeStyle::BASE; graph.edge_count()],
        };
    };

    let neighbors = graph.neighbors(hovered);
    let nodes = graph
        .nodes()
        .iter()
        .map(|n| {
            let style = if &n.id == hovered {
                NodeStyle { scale: HOVER_SCALE, opacity: 1.0 }
            } else if neighbors.contains(&n.id) {
                NodeStyle::BASE
            } else {
                NodeStyle { scale: 1.0, opacity: DIMMED_NODE_OPACITY }
            };
            (n.id.clone(), style)
        })
        .collect();

    let edges = graph
        .edges()
        .iter()
        .map(|e| {
            if e.touches(hovered) {
                EdgeStyle { opacity: HIGHLIGHT_EDGE_OPACITY, width: HIGHLIGHT_EDGE_WIDTH }
            } else {
                EdgeStyle { opacity: DIMMED_EDGE_OPACITY, width: 1.0 }
            }
        })
        .collect();

    HoverStyles { nodes, edges }
}
