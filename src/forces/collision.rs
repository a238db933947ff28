//! Collision force.
//!
//! Iterative relaxation that separates overlapping discs. Each node's disc is
//! its effective radius plus half the collision padding, so two discs that
//! just touch are exactly `r_a + r_b + padding` apart. The root takes part
//! only as an immovable obstacle.
//!
//! Disc reaches are cached and only refreshed after [`Collision::invalidate`],
//! which the driver calls on every radius or scale change.

use super::{ForceContext, jiggle};
use crate::graph::NodeStore;
use crate::spatial::{Body, CollisionIndex};

#[derive(Default)]
pub struct Collision {
    index: CollisionIndex,
    /// Cached disc reach per slot; NaN for slots that don't collide.
    reach: Vec<f32>,
    /// Padding the cache was built with.
    padding: f32,
    dirty: bool,
}

impl Collision {
    /// Mark the reach cache stale.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    fn refresh(&mut self, nodes: &NodeStore, padding: f32) {
        if !self.dirty && self.reach.len() == nodes.len() && self.padding == padding {
            return;
        }

        self.reach.clear();
        self.reach.extend((0..nodes.len()).map(|i| {
            let r = nodes.effective_radius(i);
            if r.is_finite() && r > 0.0 {
                r + padding / 2.0
            } else {
                f32::NAN
            }
        }));
        self.padding = padding;
        self.dirty = false;
    }

    /// Cached reach for a slot, if it collides.
    pub fn reach(&self, i: usize) -> Option<f32> {
        self.reach.get(i).copied().filter(|r| r.is_finite())
    }

    /// Run the configured number of relaxation passes.
    pub fn apply(&mut self, nodes: &mut NodeStore, ctx: &ForceContext<'_>) {
        for _ in 0..ctx.constants.collision_iterations {
            self.relax(nodes, ctx, ctx.constants.collision_strength);
        }
    }

    /// One relaxation pass resolving `strength` of every overlap.
    ///
    /// Returns the largest overlap found before correction.
    pub fn relax(&mut self, nodes: &mut NodeStore, ctx: &ForceContext<'_>, strength: f32) -> f32 {
        self.refresh(nodes, ctx.params.collision_padding);

        let bodies: Vec<Body> = (0..nodes.len())
            .filter_map(|i| {
                let reach = self.reach(i)?;
                let (x, y) = (nodes.pos_x[i], nodes.pos_y[i]);
                (x.is_finite() && y.is_finite()).then(|| Body::new(i, x, y, reach))
            })
            .collect();
        if bodies.len() < 2 {
            return 0.0;
        }
        self.index.rebuild(bodies);

        let mut worst = 0.0f32;
        let mut neighbors: Vec<usize> = Vec::new();

        for i in 0..nodes.len() {
            if !nodes.is_active(i) {
                continue;
            }
            let Some(reach_i) = self.reach(i) else {
                continue;
            };

            neighbors.clear();
            neighbors.extend(
                self.index
                    .candidates(nodes.pos_x[i], nodes.pos_y[i], reach_i)
                    .map(|b| b.index)
                    .filter(|&j| j != i && !(nodes.is_active(j) && j < i)),
            );

            for &j in &neighbors {
                let Some(reach_j) = self.reach(j) else {
                    continue;
                };
                let overlap = separate(nodes, i, j, reach_i + reach_j, strength);
                worst = worst.max(overlap);
            }
        }

        worst
    }
}

/// Push `i` (and `j`, unless it is fixed) apart until they are `min_distance`
/// apart, scaled by `strength`. Returns the overlap before correction.
fn separate(nodes: &mut NodeStore, i: usize, j: usize, min_distance: f32, strength: f32) -> f32 {
    let dx = nodes.pos_x[j] - nodes.pos_x[i];
    let dy = nodes.pos_y[j] - nodes.pos_y[i];
    let distance = (dx * dx + dy * dy).sqrt();

    if distance >= min_distance {
        return 0.0;
    }

    let (ux, uy) = if distance < 1e-6 {
        let (jx, jy) = jiggle(i);
        let len = (jx * jx + jy * jy).sqrt();
        (jx / len, jy / len)
    } else {
        (dx / distance, dy / distance)
    };
    let overlap = min_distance - distance;
    let push = overlap * strength;

    if nodes.is_active(j) {
        // Larger discs give way less
        let ri = nodes.effective_radius(i);
        let rj = nodes.effective_radius(j);
        let share_i = rj * rj / (ri * ri + rj * rj);

        nodes.pos_x[i] -= ux * push * share_i;
        nodes.pos_y[i] -= uy * push * share_i;
        nodes.pos_x[j] += ux * push * (1.0 - share_i);
        nodes.pos_y[j] += uy * push * (1.0 - share_i);

        // Cancel the closing component of the relative velocity
        let closing = (nodes.vel_x[j] - nodes.vel_x[i]) * ux + (nodes.vel_y[j] - nodes.vel_y[i]) * uy;
        if closing < 0.0 {
            nodes.vel_x[i] += ux * closing * share_i;
            nodes.vel_y[i] += uy * closing * share_i;
            nodes.vel_x[j] -= ux * closing * (1.0 - share_i);
            nodes.vel_y[j] -= uy * closing * (1.0 - share_i);
        }
    } else {
        nodes.pos_x[i] -= ux * push;
        nodes.pos_y[i] -= uy * push;

        let toward = nodes.vel_x[i] * ux + nodes.vel_y[i] * uy;
        if toward > 0.0 {
            nodes.vel_x[i] -= ux * toward;
            nodes.vel_y[i] -= uy * toward;
        }
    }

    overlap
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhysicsConstants;
    use crate::forces::test_support::store_with;
    use crate::layout::PhysicsParams;

    fn ctx<'a>(params: &'a PhysicsParams, constants: &'a PhysicsConstants) -> ForceContext<'a> {
        ForceContext {
            params,
            constants,
            width: 400.0,
            height: 400.0,
            root_radius: 10.0,
            avg_radius: 10.0,
            alpha: 1.0,
        }
    }

    fn distance(nodes: &NodeStore, a: usize, b: usize) -> f32 {
        ((nodes.pos_x[a] - nodes.pos_x[b]).powi(2) + (nodes.pos_y[a] - nodes.pos_y[b]).powi(2)).sqrt()
    }

    fn padded() -> PhysicsParams {
        PhysicsParams {
            collision_padding: 4.0,
            ..PhysicsParams::inert()
        }
    }

    #[test]
    fn test_full_strength_pass_separates_pair() {
        let constants = PhysicsConstants::default();
        let params = padded();
        let mut nodes = store_with((350.0, 350.0, 10.0), &[(100.0, 100.0), (110.0, 100.0)], 10.0);

        let mut collision = Collision::default();
        let overlap = collision.relax(&mut nodes, &ctx(&params, &constants), 1.0);

        assert!((overlap - 14.0).abs() < 1e-4);
        assert!((distance(&nodes, 1, 2) - 24.0).abs() < 1e-3);
        // Equal radii split the correction evenly
        assert!((nodes.pos_x[1] - 93.0).abs() < 1e-3);
        assert!((nodes.pos_x[2] - 117.0).abs() < 1e-3);
    }

    #[test]
    fn test_root_is_immovable() {
        let constants = PhysicsConstants::default();
        let params = padded();
        let mut nodes = store_with((200.0, 200.0, 30.0), &[(220.0, 200.0)], 10.0);

        let mut collision = Collision::default();
        collision.relax(&mut nodes, &ctx(&params, &constants), 1.0);

        assert_eq!((nodes.pos_x[0], nodes.pos_y[0]), (200.0, 200.0));
        assert!((nodes.pos_x[1] - 244.0).abs() < 1e-3);
    }

    #[test]
    fn test_scale_changes_need_invalidate() {
        let constants = PhysicsConstants::default();
        let params = padded();
        let mut nodes = store_with((350.0, 350.0, 10.0), &[(100.0, 100.0), (130.0, 100.0)], 10.0);

        let mut collision = Collision::default();
        assert_eq!(collision.relax(&mut nodes, &ctx(&params, &constants), 1.0), 0.0);

        nodes.scale[1] = 2.0;
        // Stale cache: still sees 24px of required spacing
        assert_eq!(collision.relax(&mut nodes, &ctx(&params, &constants), 1.0), 0.0);

        collision.invalidate();
        let overlap = collision.relax(&mut nodes, &ctx(&params, &constants), 1.0);
        assert!((overlap - 4.0).abs() < 1e-3);
        assert!(distance(&nodes, 1, 2) >= 34.0 - 1e-3);
    }

    #[test]
    fn test_coincident_pair_separates() {
        let constants = PhysicsConstants::default();
        let params = padded();
        let mut nodes = store_with((350.0, 350.0, 10.0), &[(100.0, 100.0), (100.0, 100.0)], 10.0);

        let mut collision = Collision::default();
        collision.relax(&mut nodes, &ctx(&params, &constants), 1.0);

        assert!(distance(&nodes, 1, 2) >= 24.0 - 1e-3);
    }

    #[test]
    fn test_malformed_radius_skipped() {
        let constants = PhysicsConstants::default();
        let params = padded();
        let mut nodes = store_with((350.0, 350.0, 10.0), &[(100.0, 100.0), (105.0, 100.0)], 10.0);
        nodes.radius[2] = -3.0;

        let mut collision = Collision::default();
        collision.relax(&mut nodes, &ctx(&params, &constants), 1.0);

        assert_eq!(nodes.pos_x[1], 100.0);
        assert_eq!(nodes.pos_x[2], 105.0);
    }
}
