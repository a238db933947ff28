//! Root exclusion.
//!
//! Keeps every stack node's disc fully outside a circular zone around the
//! root, `root_radius × exclusion_factor` wide. Penetration is corrected
//! directly on positions, and velocity heading into the zone is dropped.

use super::{ForceContext, jiggle};
use crate::graph::NodeStore;

#[derive(Debug, Default)]
pub struct RootExclusion;

impl RootExclusion {
    /// Push intruding nodes out by `strength` of their penetration.
    ///
    /// Returns the deepest penetration found before correction.
    pub fn apply(&self, nodes: &mut NodeStore, ctx: &ForceContext<'_>, strength: f32) -> f32 {
        if nodes.is_empty() {
            return 0.0;
        }
        let (rx, ry) = (nodes.pos_x[0], nodes.pos_y[0]);
        let zone = ctx.exclusion_radius();
        if !(rx.is_finite() && ry.is_finite() && zone.is_finite()) || zone <= 0.0 {
            return 0.0;
        }

        let mut worst = 0.0f32;
        for i in 1..nodes.len() {
            if !nodes.is_active(i) {
                continue;
            }

            let min_distance = zone + nodes.effective_radius(i);
            let dx = nodes.pos_x[i] - rx;
            let dy = nodes.pos_y[i] - ry;
            let distance = (dx * dx + dy * dy).sqrt();
            if distance >= min_distance {
                continue;
            }

            let (ux, uy) = if distance < 1e-6 {
                let (jx, jy) = jiggle(i);
                let len = (jx * jx + jy * jy).sqrt();
                (jx / len, jy / len)
            } else {
                (dx / distance, dy / distance)
            };

            let penetration = min_distance - distance;
            worst = worst.max(penetration);

            nodes.pos_x[i] += ux * penetration * strength;
            nodes.pos_y[i] += uy * penetration * strength;

            let inward = nodes.vel_x[i] * ux + nodes.vel_y[i] * uy;
            if inward < 0.0 {
                nodes.vel_x[i] -= ux * inward;
                nodes.vel_y[i] -= uy * inward;
            }
        }

        worst
    }
}
