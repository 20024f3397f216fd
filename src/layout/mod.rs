//! Persona graph layout
//!
//! Bridges the persona graph to the `tastegraph-layout` simulation and runs
//! it on a background task for interactive front-ends.

pub mod driver;

pub use driver::{LayoutCommand, LayoutDriver, LayoutFrame};

use crate::graph::PersonaGraph;
use tastegraph_layout::{LayoutConfig, LayoutResult, LayoutView, Simulation};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriverError {
    /// The driver task has stopped
    #[error("Layout driver is shut down")]
    Closed,
}

/// Dense layout view of a persona graph; edge strengths become link weights
pub fn layout_view(graph: &PersonaGraph) -> LayoutResult<LayoutView> {
    let mut view = LayoutView::new();
    for node in graph.nodes() {
        view.add_node(node.id.as_str(), node.radius);
    }
    for edge in graph.edges() {
        view.add_link(edge.source.as_str(), edge.target.as_str(), edge.strength)?;
    }
    Ok(view)
}

/// A fresh simulation over a persona graph
pub fn simulation_for(graph: &PersonaGraph, config: LayoutConfig) -> LayoutResult<Simulation> {
    Ok(Simulation::new(layout_view(graph)?, config))
}

/// Lay a graph out to rest and return the settled simulation
pub fn settle(graph: &PersonaGraph, config: LayoutConfig, max_ticks: usize) -> LayoutResult<Simulation> {
    let mut sim = simulation_for(graph, config)?;
    sim.run(max_ticks);
    Ok(sim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::culture::{Entity, EntityType, Tag};
    use crate::graph::{GraphBuilder, USER_NODE_ID};
    use crate::persona::PersonaRecord;

    fn graph() -> PersonaGraph {
        let mut artist = Entity::new("e1", "Radiohead", EntityType::Artist);
        artist.tags = vec![Tag::named("indie"), Tag::named("art rock")];
        let persona = PersonaRecord::new(vec!["indie".to_string()], vec![artist]);
        GraphBuilder::new(7).build(&persona).unwrap()
    }

    #[test]
    fn test_view_mirrors_graph() {
        let graph = graph();
        let view = layout_view(&graph).unwrap();

        assert_eq!(view.node_count, graph.node_count());
        assert_eq!(view.links.len(), graph.edge_count());
        let center = view.index_of(USER_NODE_ID).unwrap();
        assert_eq!(view.radii[center], 20.0);
    }

    #[test]
    fn test_settle() {
        let sim = settle(&graph(), LayoutConfig::default(), 1000).unwrap();
        assert!(sim.is_settled());
        assert_eq!(sim.positions().len(), 4);
    }
}
