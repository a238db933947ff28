//! Boundary clamp.
//!
//! Every stack node's disc stays inside the container inset by
//! `boundary_padding`. A node that hits a wall loses its outward velocity on
//! that axis, and the inward part is halved so it doesn't bounce.

use super::ForceContext;
use crate::graph::NodeStore;

#[derive(Debug, Default)]
pub struct Boundary;

impl Boundary {
    /// Clamp every active node into bounds.
    ///
    /// Returns the largest distance a node was outside before clamping.
    pub fn apply(&self, nodes: &mut NodeStore, ctx: &ForceContext<'_>) -> f32 {
        let padding = ctx.constants.boundary_padding;
        let mut worst = 0.0f32;

        for i in 0..nodes.len() {
            if !nodes.is_active(i) {
                continue;
            }
            let r = nodes.effective_radius(i);
            let (px, vx) = clamp_axis(nodes.pos_x[i], nodes.vel_x[i], padding + r, ctx.width - padding - r);
            let (py, vy) = clamp_axis(nodes.pos_y[i], nodes.vel_y[i], padding + r, ctx.height - padding - r);

            worst = worst.max((px - nodes.pos_x[i]).abs()).max((py - nodes.pos_y[i]).abs());
            nodes.pos_x[i] = px;
            nodes.pos_y[i] = py;
            nodes.vel_x[i] = vx;
            nodes.vel_y[i] = vy;
        }

        worst
    }
}

/// Clamp one coordinate into `[lo, hi]`, adjusting velocity on contact.
///
/// When the disc is wider than the container the node is centered on the
/// axis and stopped.
fn clamp_axis(p: f32, v: f32, lo: f32, hi: f32) -> (f32, f32) {
    if lo > hi {
        return ((lo + hi) / 2.0, 0.0);
    }
    if p < lo {
        (lo, if v < 0.0 { 0.0 } else { v * 0.5 })
    } else if p > hi {
        (hi, if v > 0.0 { 0.0 } else { v * 0.5 })
    } else {
        (p, v)
    }
}
