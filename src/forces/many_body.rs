//! Many-body repulsion, approximated with a Barnes-Hut quadtree.
//!
//! Each stack node is a body whose mass is its mass factor; the root is left
//! to the root-exclusion force. The distance floor keeps coincident or nearly
//! coincident nodes from producing unbounded velocities.

use super::{ForceContext, jiggle, mass_factor};
use crate::graph::NodeStore;
use crate::spatial::{MassPoint, Quadtree};

#[derive(Default)]
pub struct ManyBody {
    /// Reused body buffer.
    bodies: Vec<MassPoint>,
}

impl ManyBody {
    pub fn apply(&mut self, nodes: &mut NodeStore, ctx: &ForceContext<'_>) {
        let strength = ctx.params.charge_strength * ctx.alpha;
        if strength == 0.0 || !strength.is_finite() {
            return;
        }

        self.bodies.clear();
        for i in 0..nodes.len() {
            if !nodes.is_active(i) {
                continue;
            }
            self.bodies.push(MassPoint {
                index: i,
                x: nodes.pos_x[i],
                y: nodes.pos_y[i],
                mass: mass_factor(nodes.radius[i], ctx.avg_radius, ctx.constants),
            });
        }
        if self.bodies.len() < 2 {
            return;
        }

        let tree = Quadtree::build(&self.bodies, ctx.params.theta);
        let min_distance = ctx.params.many_body_distance_min.max(1.0);

        for body in &self.bodies {
            let (dvx, dvy) = tree.accumulate(body.index, body.x, body.y, strength, min_distance, jiggle);
            if dvx.is_finite() && dvy.is_finite() {
                nodes.vel_x[body.index] += dvx;
                nodes.vel_y[body.index] += dvy;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhysicsConstants;
    use crate::forces::test_support::store_with;
    use crate::layout::PhysicsParams;

    fn run(nodes: &mut NodeStore, charge: f32) {
        let constants = PhysicsConstants::default();
        let params = PhysicsParams {
            charge_strength: charge,
            many_body_distance_min: 5.0,
            theta: 0.9,
            ..PhysicsParams::inert()
        };
        let ctx = ForceContext {
            params: &params,
            constants: &constants,
            width: 400.0,
            height: 400.0,
            root_radius: 10.0,
            avg_radius: 10.0,
            alpha: 1.0,
        };
        ManyBody::default().apply(nodes, &ctx);
    }

    #[test]
    fn test_pair_repels_symmetrically() {
        let mut nodes = store_with((200.0, 200.0, 10.0), &[(100.0, 100.0), (140.0, 100.0)], 10.0);
        run(&mut nodes, -30.0);

        assert!(nodes.vel_x[1] < 0.0);
        assert!(nodes.vel_x[2] > 0.0);
        assert!((nodes.vel_x[1] + nodes.vel_x[2]).abs() < 1e-5);
        // Root is not a body
        assert_eq!(nodes.vel_x[0], 0.0);
    }

    #[test]
    fn test_coincident_nodes_separate_finitely() {
        let mut nodes = store_with((200.0, 200.0, 10.0), &[(50.0, 50.0), (50.0, 50.0)], 10.0);
        run(&mut nodes, -30.0);

        for i in 1..3 {
            assert!(nodes.vel_x[i].is_finite() && nodes.vel_y[i].is_finite());
        }
        assert!(nodes.vel_x[1] != 0.0 || nodes.vel_y[1] != 0.0);
    }

    #[test]
    fn test_malformed_node_skipped() {
        let mut nodes = store_with((200.0, 200.0, 10.0), &[(100.0, 100.0), (f32::INFINITY, 0.0)], 10.0);
        run(&mut nodes, -30.0);

        assert_eq!(nodes.vel_x[1], 0.0);
        assert_eq!(nodes.vel_x[2], 0.0);
    }
}
