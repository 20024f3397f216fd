//! Background frame loop for a simulation
//!
//! The task ticks once per frame while the layout is moving and goes idle
//! once it settles; any command (drag, pin, reheat) wakes it again. Every
//! change is published as a `LayoutFrame` on a watch channel.

use super::DriverError;
use std::time::Duration;
use tastegraph_layout::{NodePosition, Simulation};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// About 60 frames per second
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

const COMMAND_BUFFER: usize = 64;

/// Pointer and keyboard input forwarded to the simulation
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutCommand {
    DragStart(String),
    DragTo { id: String, x: f64, y: f64 },
    DragEnd(String),
    TogglePin(String),
    Reheat(f64),
}

/// Positions published after a tick or command
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutFrame {
    pub tick: u64,
    pub alpha: f64,
    pub settled: bool,
    pub positions: Vec<NodePosition>,
}

impl LayoutFrame {
    fn capture(sim: &Simulation) -> Self {
        Self {
            tick: sim.ticks(),
            alpha: sim.alpha(),
            settled: sim.is_settled(),
            positions: sim.positions(),
        }
    }
}

/// Owns the frame-loop task; dropping the driver stops it
pub struct LayoutDriver {
    commands: mpsc::Sender<LayoutCommand>,
    frames: watch::Receiver<LayoutFrame>,
    task: Option<JoinHandle<()>>,
}

impl LayoutDriver {
    /// Start driving `sim` on the current tokio runtime
    pub fn spawn(sim: Simulation, frame_interval: Duration) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_BUFFER);
        let (frame_tx, frame_rx) = watch::channel(LayoutFrame::capture(&sim));

        info!("Starting layout driver ({} nodes)", sim.view().node_count);
        let task = tokio::spawn(run(sim, frame_interval, cmd_rx, frame_tx));

        Self {
            commands: cmd_tx,
            frames: frame_rx,
            task: Some(task),
        }
    }

    /// Receiver that sees every published frame
    pub fn subscribe(&self) -> watch::Receiver<LayoutFrame> {
        self.frames.clone()
    }

    /// Most recent frame
    pub fn latest(&self) -> LayoutFrame {
        self.frames.borrow().clone()
    }

    pub async fn send(&self, command: LayoutCommand) -> Result<(), DriverError> {
        self.commands.send(command).await.map_err(|_| DriverError::Closed)
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop the task and wait for it to finish
    pub async fn shutdown(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
            info!("Layout driver stopped");
        }
    }
}

impl Drop for LayoutDriver {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

fn apply(sim: &mut Simulation, command: LayoutCommand) {
    let result = match &command {
        LayoutCommand::DragStart(id) => sim.drag_start(id),
        LayoutCommand::DragTo { id, x, y } => sim.drag_to(id, *x, *y),
        LayoutCommand::DragEnd(id) => sim.drag_end(id),
        LayoutCommand::TogglePin(id) => sim.toggle_pin(id).map(|_| ()),
        LayoutCommand::Reheat(alpha) => {
            sim.reheat(*alpha);
            Ok(())
        }
    };
    if let Err(e) = result {
        warn!("Ignoring {:?}: {}", command, e);
    }
}

async fn run(
    mut sim: Simulation,
    frame_interval: Duration,
    mut commands: mpsc::Receiver<LayoutCommand>,
    frames: watch::Sender<LayoutFrame>,
) {
    let mut interval = tokio::time::interval(frame_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut was_settled = sim.is_settled();

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(command) => apply(&mut sim, command),
                None => break,
            },
            _ = interval.tick(), if !sim.is_settled() => sim.tick(),
        }

        let settled = sim.is_settled();
        if settled && !was_settled {
            debug!("Layout settled after {} ticks", sim.ticks());
        }
        was_settled = settled;

        if frames.send(LayoutFrame::capture(&sim)).is_err() {
            break;
        }
    }
}
