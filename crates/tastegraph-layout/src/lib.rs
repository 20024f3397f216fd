//! Force-directed layout for Tastegraph
//!
//! A pure simulation: nodes, weighted links and forces in, positions out.
//! Nothing here knows about rendering; callers drive `Simulation::tick`
//! from whatever frame loop they have and read back `positions()`.

pub mod common;
pub mod forces;
pub mod pin;
pub mod simulation;

pub use common::{LayoutConfig, LayoutError, LayoutLink, LayoutResult, LayoutView};
pub use forces::Body;
pub use pin::PinState;
pub use simulation::{NodePosition, Simulation};
