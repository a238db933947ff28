//! Centering force.
//!
//! Pulls every stack node toward the container center. Heavier nodes feel a
//! stronger pull so large nodes don't drift to the extremes.

use super::{ForceContext, mass_factor};
use crate::graph::NodeStore;

#[derive(Debug, Default)]
pub struct Centering;

impl Centering {
    pub fn apply(&self, nodes: &mut NodeStore, ctx: &ForceContext<'_>) {
        let base = ctx.params.positioning_strength * ctx.alpha;
        if base <= 0.0 || !base.is_finite() {
            return;
        }

        let (cx, cy) = ctx.center();
        for i in 0..nodes.len() {
            if !nodes.is_active(i) {
                continue;
            }
            let mass = mass_factor(nodes.radius[i], ctx.avg_radius, ctx.constants);
            let k = (base * mass).min(1.0);
            nodes.vel_x[i] += (cx - nodes.pos_x[i]) * k;
            nodes.vel_y[i] += (cy - nodes.pos_y[i]) * k;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhysicsConstants;
    use crate::forces::test_support::store_with;
    use crate::layout::PhysicsParams;

    fn params() -> PhysicsParams {
        PhysicsParams {
            positioning_strength: 0.1,
            ..PhysicsParams::inert()
        }
    }

    fn ctx<'a>(params: &'a PhysicsParams, constants: &'a PhysicsConstants, alpha: f32) -> ForceContext<'a> {
        ForceContext {
            params,
            constants,
            width: 200.0,
            height: 200.0,
            root_radius: 10.0,
            avg_radius: 10.0,
            alpha,
        }
    }

    #[test]
    fn test_pulls_toward_center() {
        let constants = PhysicsConstants::default();
        let params = params();
        let mut nodes = store_with((100.0, 100.0, 10.0), &[(150.0, 100.0), (100.0, 20.0)], 10.0);

        Centering.apply(&mut nodes, &ctx(&params, &constants, 1.0));

        assert!((nodes.vel_x[1] + 5.0).abs() < 1e-5);
        assert_eq!(nodes.vel_y[1], 0.0);
        assert!((nodes.vel_y[2] - 8.0).abs() < 1e-5);
    }

    #[test]
    fn test_root_and_malformed_untouched() {
        let constants = PhysicsConstants::default();
        let params = params();
        let mut nodes = store_with((10.0, 10.0, 10.0), &[(f32::NAN, 0.0)], 10.0);

        Centering.apply(&mut nodes, &ctx(&params, &constants, 1.0));

        assert_eq!(nodes.vel_x[0], 0.0);
        assert_eq!(nodes.vel_x[1], 0.0);
    }

    #[test]
    fn test_heavier_node_pulled_harder() {
        let constants = PhysicsConstants::default();
        let params = params();
        let mut nodes = store_with((100.0, 100.0, 10.0), &[(150.0, 100.0), (150.0, 100.0)], 10.0);
        nodes.radius[2] = 20.0;

        Centering.apply(&mut nodes, &ctx(&params, &constants, 1.0));
        assert!(nodes.vel_x[2] < nodes.vel_x[1]);
    }

    #[test]
    fn test_zero_alpha_is_noop() {
        let constants = PhysicsConstants::default();
        let params = params();
        let mut nodes = store_with((100.0, 100.0, 10.0), &[(150.0, 100.0)], 10.0);

        Centering.apply(&mut nodes, &ctx(&params, &constants, 0.0));
        assert_eq!(nodes.vel_x[1], 0.0);
    }
}
