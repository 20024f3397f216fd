//! In-memory persona graph
//!
//! Holds nodes and edges in insertion order with a hash index from node id
//! to position. Insertion enforces the two graph invariants: node ids are
//! unique and every edge endpoint exists.

use super::edge::GraphEdge;
use super::node::GraphNode;
use super::types::{NodeId, NodeKind};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during graph operations
#[derive(Error, Debug, PartialEq)]
pub enum GraphError {
    #[error("Node {0} not found")]
    NodeNotFound(NodeId),

    #[error("Node {0} already exists")]
    NodeAlreadyExists(NodeId),

    #[error("Invalid edge: source node {0} does not exist")]
    InvalidEdgeSource(NodeId),

    #[error("Invalid edge: target node {0} does not exist")]
    InvalidEdgeTarget(NodeId),

    #[error("Graph must contain exactly one user node, found {0}")]
    UserNodeCount(usize),
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Node and edge lists consumed by the layout engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "RawGraph")]
pub struct PersonaGraph {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    #[serde(skip)]
    index: FxHashMap<NodeId, usize>,
}

/// Serialized form; the id index is rebuilt on load
#[derive(Deserialize)]
struct RawGraph {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
}

impl From<RawGraph> for PersonaGraph {
    fn from(raw: RawGraph) -> Self {
        let mut graph = PersonaGraph {
            nodes: raw.nodes,
            edges: raw.edges,
            index: FxHashMap::default(),
        };
        graph.reindex();
        graph
    }
}

impl PersonaGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node; ids must be unique
    pub fn add_node(&mut self, node: GraphNode) -> GraphResult<()> {
        if self.index.contains_key(&node.id) {
            return Err(GraphError::NodeAlreadyExists(node.id));
        }
        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    /// Insert an edge; both endpoints must already exist
    pub fn add_edge(&mut self, edge: GraphEdge) -> GraphResult<()> {
        if !self.has_node(edge.source.as_str()) {
            return Err(GraphError::InvalidEdgeSource(edge.source));
        }
        if !self.has_node(edge.target.as_str()) {
            return Err(GraphError::InvalidEdgeTarget(edge.target));
        }
        self.edges.push(edge);
        Ok(())
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn get_node(&self, id: &str) -> Option<&GraphNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// True if some edge joins `a` and `b` in either direction
    pub fn has_edge_between(&self, a: &NodeId, b: &NodeId) -> bool {
        self.edges.iter().any(|e| e.connects(a, b))
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of nodes of a given kind
    pub fn count_kind(&self, kind: NodeKind) -> usize {
        self.nodes.iter().filter(|n| n.kind() == kind).count()
    }

    /// The user node, if present
    pub fn user_node(&self) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.is_user())
    }

    /// Edges with `id` as an endpoint
    pub fn edges_touching<'a>(&'a self, id: &'a NodeId) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.edges.iter().filter(move |e| e.touches(id))
    }

    /// Ids of every node sharing an edge with `id`
    pub fn neighbors(&self, id: &NodeId) -> FxHashSet<NodeId> {
        self.edges_touching(id)
            .filter_map(|e| e.other_end(id))
            .cloned()
            .collect()
    }

    /// Check the graph invariants: unique ids, one user node, and
    /// referential integrity of every edge.
    pub fn validate(&self) -> GraphResult<()> {
        let mut seen = FxHashSet::default();
        for node in &self.nodes {
            if !seen.insert(&node.id) {
                return Err(GraphError::NodeAlreadyExists(node.id.clone()));
            }
        }

        let users = self.count_kind(NodeKind::User);
        if users != 1 {
            return Err(GraphError::UserNodeCount(users));
        }

        for edge in &self.edges {
            if !seen.contains(&edge.source) {
                return Err(GraphError::InvalidEdgeSource(edge.source.clone()));
            }
            if !seen.contains(&edge.target) {
                return Err(GraphError::InvalidEdgeTarget(edge.target.clone()));
            }
        }
        Ok(())
    }

    fn reindex(&mut self) {
        self.index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();
    }
}
