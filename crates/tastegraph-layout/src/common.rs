//! Shared structures for layout execution
//!
//! Provides a dense, integer-indexed view of the graph topology that the
//! simulation iterates over, plus the layout configuration.

use std::collections::HashMap;
use thiserror::Error;

/// Layout errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("Node {0} not found in layout")]
    NodeNotFound(String),

    #[error("Invalid link: endpoint {0} does not exist")]
    InvalidLinkEndpoint(String),
}

pub type LayoutResult<T> = Result<T, LayoutError>;

/// A weighted link between two dense node indices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutLink {
    pub source: usize,
    pub target: usize,
    /// Edge weight in [0, 1]
    pub weight: f64,
}

/// A dense view of the graph the simulation runs on.
#[derive(Debug, Clone, Default)]
pub struct LayoutView {
    /// Number of nodes
    pub node_count: usize,
    /// Mapping from dense index (0..N) back to the node id
    pub index_to_node: Vec<String>,
    /// Mapping from node id to dense index
    pub node_to_index: HashMap<String, usize>,
    /// Collision radius per node (without padding)
    pub radii: Vec<f64>,
    /// Links between dense indices
    pub links: Vec<LayoutLink>,
    /// Number of links touching each node
    pub degree: Vec<usize>,
}

impl LayoutView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, returning its dense index. Re-adding an id keeps the
    /// first index and updates the radius.
    pub fn add_node(&mut self, id: impl Into<String>, radius: f64) -> usize {
        let id = id.into();
        if let Some(&idx) = self.node_to_index.get(&id) {
            self.radii[idx] = radius;
            return idx;
        }

        let idx = self.node_count;
        self.node_to_index.insert(id.clone(), idx);
        self.index_to_node.push(id);
        self.radii.push(radius);
        self.degree.push(0);
        self.node_count += 1;
        idx
    }

    /// Add a link between two existing nodes. Weights are clamped to [0, 1].
    pub fn add_link(&mut self, source: &str, target: &str, weight: f64) -> LayoutResult<()> {
        let s = self
            .index_of(source)
            .ok_or_else(|| LayoutError::InvalidLinkEndpoint(source.to_string()))?;
        let t = self
            .index_of(target)
            .ok_or_else(|| LayoutError::InvalidLinkEndpoint(target.to_string()))?;

        // NaN survives clamp
        let weight = if weight.is_nan() { 0.0 } else { weight.clamp(0.0, 1.0) };
        self.links.push(LayoutLink {
            source: s,
            target: t,
            weight,
        });
        self.degree[s] += 1;
        self.degree[t] += 1;
        Ok(())
    }

    /// Dense index of a node id
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.node_to_index.get(id).copied()
    }

    /// Indices of every node sharing a link with `idx`
    pub fn neighbors(&self, idx: usize) -> Vec<usize> {
        self.links
            .iter()
            .filter_map(|l| {
                if l.source == idx {
                    Some(l.target)
                } else if l.target == idx {
                    Some(l.source)
                } else {
                    None
                }
            })
            .collect()
    }
}

/// Simulation parameters
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LayoutConfig {
    /// Canvas width; the centering force pulls toward width / 2
    pub width: f64,
    /// Canvas height; the centering force pulls toward height / 2
    pub height: f64,
    /// Many-body charge (negative repels)
    pub charge: f64,
    /// Minimum distance used by the many-body force
    pub distance_min: f64,
    /// Resting length of every link
    pub link_distance: f64,
    /// Link strength is `weight * link_strength_scale`
    pub link_strength_scale: f64,
    /// Extra spacing added to each radius by the collision force
    pub collision_padding: f64,
    /// Collision passes per tick
    pub collision_iterations: usize,
    /// The simulation is settled once alpha drops below this
    pub alpha_min: f64,
    /// Per-tick decay of alpha toward its target
    pub alpha_decay: f64,
    /// Fraction of velocity lost per tick
    pub velocity_decay: f64,
    /// Alpha target while a drag is in progress
    pub reheat_alpha: f64,
    /// Node count from which repulsion is computed in parallel
    pub parallel_threshold: usize,
    /// Seed for coincident-node jiggle
    pub seed: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let alpha_min: f64 = 0.001;
        Self {
            width: 800.0,
            height: 600.0,
            charge: -300.0,
            distance_min: 1.0,
            link_distance: 80.0,
            link_strength_scale: 0.8,
            collision_padding: 4.0,
            collision_iterations: 1,
            alpha_min,
            // ~300 ticks from 1.0 down to alpha_min
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            velocity_decay: 0.4,
            reheat_alpha: 0.3,
            parallel_threshold: 256,
            seed: 0x7a57e,
        }
    }
}

impl LayoutConfig {
    /// Canvas centre
    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }
}
