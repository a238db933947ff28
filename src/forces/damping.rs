//! Mass damping: heavier nodes lose extra velocity each tick so they settle
//! instead of carrying momentum through lighter neighbors.

use super::{ForceContext, mass_factor};
use crate::graph::NodeStore;

#[derive(Debug, Default)]
pub struct MassDamping;

impl MassDamping {
    pub fn apply(&self, nodes: &mut NodeStore, ctx: &ForceContext<'_>) {
        let c = ctx.constants;
        if c.mass_damping <= 0.0 {
            return;
        }

        for i in 0..nodes.len() {
            if !nodes.is_active(i) {
                continue;
            }
            let mass = mass_factor(nodes.radius[i], ctx.avg_radius, c);
            let extra = (c.mass_damping * (mass - 1.0)).clamp(0.0, c.max_extra_damping);
            if extra > 0.0 {
                nodes.vel_x[i] *= 1.0 - extra;
                nodes.vel_y[i] *= 1.0 - extra;
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

    #[test]
    fn test_only_heavy_nodes_slowed() {
        let constants = PhysicsConstants::default();
        let params = PhysicsParams::inert();
        let ctx = ForceContext {
            params: &params,
            constants: &constants,
            width: 400.0,
            height: 400.0,
            root_radius: 10.0,
            avg_radius: 10.0,
            alpha: 1.0,
        };
        let mut nodes = store_with((200.0, 200.0, 10.0), &[(50.0, 50.0), (100.0, 100.0), (150.0, 150.0)], 10.0);
        nodes.radius[2] = 20.0;
        nodes.radius[3] = 5.0;
        for i in 1..4 {
            nodes.vel_x[i] = 10.0;
        }

        MassDamping.apply(&mut nodes, &ctx);

        assert_eq!(nodes.vel_x[1], 10.0);
        assert!(nodes.vel_x[2] < 10.0);
        assert!(nodes.vel_x[2] >= 10.0 * (1.0 - constants.max_extra_damping));
        assert_eq!(nodes.vel_x[3], 10.0);
    }
}
