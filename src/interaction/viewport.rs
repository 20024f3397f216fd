//! Zoom and pan of the graph canvas

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 3.0;
/// Length of the animated return to the identity transform
pub const RESET_DURATION: Duration = Duration::from_millis(750);

/// Uniform scale followed by a translation: `screen = world * k + (x, y)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub k: f64,
    pub x: f64,
    pub y: f64,
}

impl Transform {
    pub const IDENTITY: Transform = Transform { k: 1.0, x: 0.0, y: 0.0 };

    pub fn apply(&self, (wx, wy): (f64, f64)) -> (f64, f64) {
        (wx * self.k + self.x, wy * self.k + self.y)
    }

    pub fn invert(&self, (sx, sy): (f64, f64)) -> (f64, f64) {
        ((sx - self.x) / self.k, (sy - self.y) / self.k)
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    fn lerp(from: Transform, to: Transform, t: f64) -> Transform {
        Transform {
            k: from.k + (to.k - from.k) * t,
            x: from.x + (to.x - from.x) * t,
            y: from.y + (to.y - from.y) * t,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Cubic ease-in-out on [0, 1]
pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0) * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

/// What a pointer event landed on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerTarget {
    Node(String),
    Canvas,
}

/// Result of a double-click event reaching the viewport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DoubleClickOutcome {
    /// Landed on a node. Pin toggles belong to the node's `ClickResolver`,
    /// so the viewport does nothing.
    Ignored,
    /// Empty canvas: the view animates back to identity
    ResetView,
}

#[derive(Debug, Clone, Copy)]
struct ResetAnimation {
    from: Transform,
    started: Instant,
}

/// Canvas transform with clamped zoom and an animated reset
#[derive(Debug, Clone, Default)]
pub struct Viewport {
    transform: Transform,
    reset: Option<ResetAnimation>,
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn is_animating(&self) -> bool {
        self.reset.is_some()
    }

    /// Multiply the zoom by `factor`, keeping the screen point `anchor`
    /// over the same world point
    pub fn zoom_by(&mut self, factor: f64, anchor: (f64, f64)) {
        if factor.is_finite() && factor > 0.0 {
            self.zoom_to(self.transform.k * factor, anchor);
        }
    }

    pub fn zoom_to(&mut self, k: f64, anchor: (f64, f64)) {
        self.reset = None;
        let k = k.clamp(MIN_ZOOM, MAX_ZOOM);
        let (wx, wy) = self.transform.invert(anchor);
        self.transform = Transform {
            k,
            x: anchor.0 - wx * k,
            y: anchor.1 - wy * k,
        };
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.reset = None;
        self.transform.x += dx;
        self.transform.y += dy;
    }

    /// Handle a native double-click event. Only the empty canvas resets
    /// the view; a node under the pointer swallows the event.
    pub fn double_click(&mut self, target: PointerTarget, now: Instant) -> DoubleClickOutcome {
        match target {
            PointerTarget::Node(_) => DoubleClickOutcome::Ignored,
            PointerTarget::Canvas => {
                self.start_reset(now);
                DoubleClickOutcome::ResetView
            }
        }
    }

    /// Begin the animated return to identity
    pub fn start_reset(&mut self, now: Instant) {
        debug!("Resetting viewport from {:?}", self.transform);
        self.reset = Some(ResetAnimation {
            from: self.transform,
            started: now,
        });
    }

    /// Advance the reset animation and return the current transform
    pub fn update(&mut self, now: Instant) -> Transform {
        if let Some(anim) = self.reset {
            let elapsed = now.saturating_duration_since(anim.started);
            if elapsed >= RESET_DURATION {
                self.transform = Transform::IDENTITY;
                self.reset = None;
            } else {
                let t = elapsed.as_secs_f64() / RESET_DURATION.as_secs_f64();
                self.transform = Transform::lerp(anim.from, Transform::IDENTITY, ease_cubic_in_out(t));
            }
        }
        self.transform
    }
}
