//! Iterative force simulation
//!
//! The simulation owns one `Body` per node of a `LayoutView` and advances
//! them one tick at a time. Alpha controls how much each tick may move the
//! nodes; it decays toward `alpha_target` and the simulation is settled
//! once both are below `alpha_min`.

use super::common::{LayoutConfig, LayoutError, LayoutResult, LayoutView};
use super::forces::{self, Body};
use super::pin::PinState;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::f64::consts::PI;
use tracing::debug;

/// Radius of the first ring of the initial spiral
const INITIAL_RADIUS: f64 = 10.0;

/// Snapshot of one node's position
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodePosition {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub state: PinState,
}

/// Force-directed layout over a `LayoutView`
pub struct Simulation {
    view: LayoutView,
    config: LayoutConfig,
    bodies: Vec<Body>,
    states: Vec<PinState>,
    alpha: f64,
    alpha_target: f64,
    active_drags: usize,
    ticks: u64,
    rng: StdRng,
}

impl Simulation {
    /// Create a simulation with nodes placed on a phyllotaxis spiral around
    /// the canvas centre.
    pub fn new(view: LayoutView, config: LayoutConfig) -> Self {
        let (cx, cy) = config.center();
        let angle_step = PI * (3.0 - 5f64.sqrt());
        let bodies = (0..view.node_count)
            .map(|i| {
                let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
                let angle = i as f64 * angle_step;
                Body::at(cx + radius * angle.cos(), cy + radius * angle.sin())
            })
            .collect();

        Simulation {
            states: vec![PinState::Free; view.node_count],
            rng: StdRng::seed_from_u64(config.seed),
            view,
            config,
            bodies,
            alpha: 1.0,
            alpha_target: 0.0,
            active_drags: 0,
            ticks: 0,
        }
    }

    pub fn view(&self) -> &LayoutView {
        &self.view
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// True once the simulation has cooled and nothing is reheating it
    pub fn is_settled(&self) -> bool {
        self.alpha < self.config.alpha_min && self.alpha_target < self.config.alpha_min
    }

    /// Advance one tick regardless of alpha
    pub fn tick(&mut self) {
        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;

        let (cx, cy) = self.config.center();
        forces::apply_links(&mut self.bodies, &self.view, &self.config, self.alpha, &mut self.rng);
        forces::apply_many_body(&mut self.bodies, &self.config, self.alpha);
        forces::apply_center(&mut self.bodies, cx, cy);
        forces::apply_collision(&mut self.bodies, &self.view.radii, &self.config, &mut self.rng);

        let retain = 1.0 - self.config.velocity_decay;
        for body in &mut self.bodies {
            match body.fixed {
                Some((fx, fy)) => {
                    body.x = fx;
                    body.y = fy;
                    body.vx = 0.0;
                    body.vy = 0.0;
                }
                None => {
                    body.vx *= retain;
                    body.vy *= retain;
                    body.x += body.vx;
                    body.y += body.vy;
                }
            }
        }

        self.ticks += 1;
    }

    /// Tick only if the simulation is still moving. Returns whether it ticked.
    pub fn step(&mut self) -> bool {
        if self.is_settled() {
            return false;
        }
        self.tick();
        true
    }

    /// Tick until settled or `max_ticks` is reached; returns ticks taken
    pub fn run(&mut self, max_ticks: usize) -> usize {
        let mut taken = 0;
        while taken < max_ticks && self.step() {
            taken += 1;
        }
        debug!(
            "Layout ran {} ticks over {} nodes (alpha {:.4})",
            taken, self.view.node_count, self.alpha
        );
        taken
    }

    /// Raise alpha so a settled layout starts moving again
    pub fn reheat(&mut self, alpha: f64) {
        self.alpha = self.alpha.max(alpha);
    }

    /// Current position of a node
    pub fn position(&self, id: &str) -> Option<(f64, f64)> {
        self.view.index_of(id).map(|i| (self.bodies[i].x, self.bodies[i].y))
    }

    /// Interaction state of a node
    pub fn state(&self, id: &str) -> Option<PinState> {
        self.view.index_of(id).map(|i| self.states[i])
    }

    /// Positions of every node in dense-index order
    pub fn positions(&self) -> Vec<NodePosition> {
        self.view
            .index_to_node
            .iter()
            .zip(self.bodies.iter().zip(&self.states))
            .map(|(id, (body, state))| NodePosition {
                id: id.clone(),
                x: body.x,
                y: body.y,
                state: *state,
            })
            .collect()
    }

    fn index(&self, id: &str) -> LayoutResult<usize> {
        self.view
            .index_of(id)
            .ok_or_else(|| LayoutError::NodeNotFound(id.to_string()))
    }

    fn sync_fixed(&mut self, idx: usize) {
        let body = &mut self.bodies[idx];
        body.fixed = if self.states[idx].is_fixed() {
            Some(body.fixed.unwrap_or((body.x, body.y)))
        } else {
            None
        };
    }

    /// Double-click: pin a free node where it stands, or release a pinned one
    pub fn toggle_pin(&mut self, id: &str) -> LayoutResult<PinState> {
        let idx = self.index(id)?;
        self.states[idx] = self.states[idx].toggled();
        self.sync_fixed(idx);
        debug!("Node {} is now {:?}", id, self.states[idx]);
        Ok(self.states[idx])
    }

    /// Pointer down on a node: hold it in place and reheat the layout
    pub fn drag_start(&mut self, id: &str) -> LayoutResult<()> {
        let idx = self.index(id)?;
        if matches!(self.states[idx], PinState::Dragging { .. }) {
            return Ok(());
        }

        if self.active_drags == 0 {
            self.alpha_target = self.config.reheat_alpha;
        }
        self.active_drags += 1;

        self.states[idx] = self.states[idx].drag_started();
        let body = &mut self.bodies[idx];
        body.fixed = Some((body.x, body.y));
        Ok(())
    }

    /// Pointer move while dragging
    pub fn drag_to(&mut self, id: &str, x: f64, y: f64) -> LayoutResult<()> {
        let idx = self.index(id)?;
        if matches!(self.states[idx], PinState::Dragging { .. }) {
            self.bodies[idx].fixed = Some((x, y));
        }
        Ok(())
    }

    /// Pointer up: release the node unless it was pinned before the drag
    pub fn drag_end(&mut self, id: &str) -> LayoutResult<()> {
        let idx = self.index(id)?;
        if !matches!(self.states[idx], PinState::Dragging { .. }) {
            return Ok(());
        }

        self.active_drags = self.active_drags.saturating_sub(1);
        if self.active_drags == 0 {
            self.alpha_target = 0.0;
        }

        self.states[idx] = self.states[idx].drag_ended();
        self.sync_fixed(idx);
        Ok(())
    }
}
