//! Renderer-agnostic frame snapshots
//!
//! A `RenderFrame` is everything a drawing surface needs for one frame:
//! positioned nodes with display labels, edge endpoints, hover styling and
//! the viewport transform. Nothing here draws.

use crate::graph::{EdgeKind, NodeKind, PersonaGraph};
use crate::interaction::{HoverStyles, Transform};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tastegraph_layout::{NodePosition, PinState};

/// Labels longer than this are cut and get an ellipsis
pub const LABEL_MAX_CHARS: usize = 12;

/// Label as drawn: at most `LABEL_MAX_CHARS` characters plus `…`
pub fn display_label(label: &str) -> String {
    let label = label.trim();
    match label.char_indices().nth(LABEL_MAX_CHARS) {
        Some((cut, _)) => format!("{}…", &label[..cut]),
        None => label.to_string(),
    }
}

/// Stroke width of an edge before hover scaling
pub fn base_edge_width(strength: f64) -> f64 {
    1.0 + 2.0 * strength.clamp(0.0, 1.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderNode {
    pub id: String,
    pub label: String,
    pub full_label: String,
    pub kind: NodeKind,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub scale: f64,
    pub opacity: f64,
    pub pinned: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderEdge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    pub from: (f64, f64),
    pub to: (f64, f64),
    pub width: f64,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderFrame {
    pub transform: Transform,
    pub nodes: Vec<RenderNode>,
    pub edges: Vec<RenderEdge>,
}

impl RenderFrame {
    /// Combine graph, positions and styles. Nodes without a position are
    /// skipped, along with their edges.
    pub fn compose(
        graph: &PersonaGraph,
        positions: &[NodePosition],
        styles: &HoverStyles,
        transform: Transform,
    ) -> Self {
        let placed: FxHashMap<&str, &NodePosition> =
            positions.iter().map(|p| (p.id.as_str(), p)).collect();

        let nodes = graph
            .nodes()
            .iter()
            .filter_map(|node| {
                let pos = placed.get(node.id.as_str())?;
                let style = styles.node(&node.id);
                Some(RenderNode {
                    id: node.id.to_string(),
                    label: display_label(&node.label),
                    full_label: node.label.clone(),
                    kind: node.kind(),
                    x: pos.x,
                    y: pos.y,
                    radius: node.radius,
                    scale: style.scale,
                    opacity: style.opacity,
                    pinned: pos.state.is_pinned() || matches!(pos.state, PinState::Dragging { was_pinned: true }),
                })
            })
            .collect();

        let edges = graph
            .edges()
            .iter()
            .enumerate()
            .filter_map(|(i, edge)| {
                let from = placed.get(edge.source.as_str())?;
                let to = placed.get(edge.target.as_str())?;
                let style = styles.edges.get(i).copied().unwrap_or(crate::interaction::EdgeStyle::BASE);
                Some(RenderEdge {
                    source: edge.source.to_string(),
                    target: edge.target.to_string(),
                    kind: edge.kind,
                    from: (from.x, from.y),
                    to: (to.x, to.y),
                    width: base_edge_width(edge.strength) * style.width,
                    opacity: style.opacity,
                })
            })
            .collect();

        Self { transform, nodes, edges }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::culture::{Entity, EntityType, Tag};
    use crate::graph::{GraphBuilder, NodeId};
    use crate::interaction::hover_styles;
    use crate::layout::settle;
    use crate::persona::PersonaRecord;
    use tastegraph_layout::LayoutConfig;

    #[test]
    fn test_display_label() {
        assert_eq!(display_label("Jazz"), "Jazz");
        assert_eq!(display_label("Twelve chars"), "Twelve chars");
        assert_eq!(display_label("Thirteen char"), "Thirteen cha…");
        assert_eq!(display_label("Sigur Rós Ágætis byrjun"), "Sigur Rós Ág…");
    }

    #[test]
    fn test_compose_frame() {
        let mut film = Entity::new("m1", "Eternal Sunshine of the Spotless Mind", EntityType::Movie);
        film.tags = vec![Tag::named("romance")];
        let persona = PersonaRecord::new(vec!["romance".to_string()], vec![film]);
        let graph = GraphBuilder::new(1).build(&persona).unwrap();
        let sim = settle(&graph, LayoutConfig::default(), 500).unwrap();

        let hovered = NodeId::from("center");
        let frame = RenderFrame::compose(
            &graph,
            &sim.positions(),
            &hover_styles(&graph, Some(&hovered)),
            Transform::IDENTITY,
        );

        assert_eq!(frame.nodes.len(), graph.node_count());
        assert_eq!(frame.edges.len(), graph.edge_count());
        let movie = frame.nodes.iter().find(|n| n.kind == NodeKind::Entity).unwrap();
        assert_eq!(movie.label, "Eternal Suns…");
        assert_eq!(movie.full_label, "Eternal Sunshine of the Spotless Mind");
        let center = frame.nodes.iter().find(|n| n.id == "center").unwrap();
        assert_eq!(center.scale, 1.3);
    }

    #[test]
    fn test_unplaced_nodes_are_skipped() {
        let persona = PersonaRecord::new(vec!["indie".to_string()], vec![]);
        let graph = GraphBuilder::new(1).build(&persona).unwrap();

        let frame = RenderFrame::compose(&graph, &[], &hover_styles(&graph, None), Transform::IDENTITY);
        assert!(frame.nodes.is_empty());
        assert!(frame.edges.is_empty());
    }
}
