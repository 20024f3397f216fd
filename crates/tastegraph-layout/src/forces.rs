//! Force implementations
//!
//! Each force nudges node velocities (centering moves positions directly).
//! Fixed nodes take part in every computation; the integrator is what keeps
//! them in place.

use super::common::{LayoutConfig, LayoutView};
use rand::rngs::StdRng;
use rand::Rng;
use rayon::prelude::*;

/// Mutable physics state of one node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    /// Position the node is held at while pinned or dragged
    pub fixed: Option<(f64, f64)>,
}

impl Body {
    pub fn at(x: f64, y: f64) -> Self {
        Body { x, y, vx: 0.0, vy: 0.0, fixed: None }
    }
}

/// Tiny random offset used to separate coincident nodes
fn jiggle(rng: &mut StdRng) -> f64 {
    (rng.gen::<f64>() - 0.5) * 1e-6
}

/// Spring force along every link toward `link_distance`.
///
/// Strength is the link weight scaled by `link_strength_scale`; the
/// displacement is split between endpoints by relative degree so that hubs
/// move less than leaves.
pub fn apply_links(
    bodies: &mut [Body],
    view: &LayoutView,
    config: &LayoutConfig,
    alpha: f64,
    rng: &mut StdRng,
) {
    for link in &view.links {
        let (s, t) = (link.source, link.target);
        if s == t {
            continue;
        }

        let mut x = bodies[t].x + bodies[t].vx - bodies[s].x - bodies[s].vx;
        let mut y = bodies[t].y + bodies[t].vy - bodies[s].y - bodies[s].vy;
        if x == 0.0 {
            x = jiggle(rng);
        }
        if y == 0.0 {
            y = jiggle(rng);
        }

        let distance = (x * x + y * y).sqrt();
        let strength = link.weight * config.link_strength_scale;
        let l = (distance - config.link_distance) / distance * alpha * strength;
        x *= l;
        y *= l;

        let (ds, dt) = (view.degree[s] as f64, view.degree[t] as f64);
        let bias = ds / (ds + dt);

        bodies[t].vx -= x * bias;
        bodies[t].vy -= y * bias;
        bodies[s].vx += x * (1.0 - bias);
        bodies[s].vy += y * (1.0 - bias);
    }
}

/// Pairwise repulsion with a constant charge, falling off with distance.
///
/// Computed against a snapshot of positions; above `parallel_threshold`
/// nodes the per-node sums run on rayon.
pub fn apply_many_body(bodies: &mut [Body], config: &LayoutConfig, alpha: f64) {
    let n = bodies.len();
    if n < 2 || config.charge == 0.0 {
        return;
    }

    let positions: Vec<(f64, f64)> = bodies.iter().map(|b| (b.x, b.y)).collect();
    let min2 = config.distance_min * config.distance_min;
    let charge = config.charge;

    let push = |i: usize| -> (f64, f64) {
        let (xi, yi) = positions[i];
        let (mut dvx, mut dvy) = (0.0, 0.0);
        for (j, &(xj, yj)) in positions.iter().enumerate() {
            if i == j {
                continue;
            }
            let mut dx = xj - xi;
            let mut dy = yj - yi;
            if dx == 0.0 && dy == 0.0 {
                // Deterministic split so the parallel path needs no rng
                dx = (j as f64 - i as f64) * 1e-6;
                dy = dx;
            }
            let mut l = dx * dx + dy * dy;
            if l < min2 {
                l = (min2 * l).sqrt();
            }
            let w = charge * alpha / l;
            dvx += dx * w;
            dvy += dy * w;
        }
        (dvx, dvy)
    };

    let deltas: Vec<(f64, f64)> = if n >= config.parallel_threshold {
        (0..n).into_par_iter().map(push).collect()
    } else {
        (0..n).map(push).collect()
    };

    for (body, (dvx, dvy)) in bodies.iter_mut().zip(deltas) {
        body.vx += dvx;
        body.vy += dvy;
    }
}

/// Translate every node so the centroid sits on `(cx, cy)`.
pub fn apply_center(bodies: &mut [Body], cx: f64, cy: f64) {
    if bodies.is_empty() {
        return;
    }

    let n = bodies.len() as f64;
    let (sx, sy) = bodies
        .iter()
        .fold((0.0, 0.0), |(sx, sy), b| (sx + b.x, sy + b.y));
    let dx = sx / n - cx;
    let dy = sy / n - cy;

    for body in bodies.iter_mut() {
        body.x -= dx;
        body.y -= dy;
    }
}

/// Push apart any pair closer than the sum of their padded radii.
///
/// Overlap is resolved in proportion to the other node's area so smaller
/// nodes get pushed further.
pub fn apply_collision(
    bodies: &mut [Body],
    radii: &[f64],
    config: &LayoutConfig,
    rng: &mut StdRng,
) {
    let n = bodies.len();
    for _ in 0..config.collision_iterations {
        for i in 0..n {
            let ri = radii[i] + config.collision_padding;
            let ri2 = ri * ri;
            let xi = bodies[i].x + bodies[i].vx;
            let yi = bodies[i].y + bodies[i].vy;

            for j in (i + 1)..n {
                let rj = radii[j] + config.collision_padding;
                let r = ri + rj;
                let mut x = xi - bodies[j].x - bodies[j].vx;
                let mut y = yi - bodies[j].y - bodies[j].vy;
                let mut l = x * x + y * y;
                if l >= r * r {
                    continue;
                }

                if x == 0.0 {
                    x = jiggle(rng);
                }
                if y == 0.0 {
                    y = jiggle(rng);
                }
                l = (x * x + y * y).sqrt();
                let overlap = (r - l) / l;
                x *= overlap;
                y *= overlap;

                let rj2 = rj * rj;
                let share = rj2 / (ri2 + rj2);
                bodies[i].vx += x * share;
                bodies[i].vy += y * share;
                bodies[j].vx -= x * (1.0 - share);
                bodies[j].vy -= y * (1.0 - share);
            }
        }
    }
}
