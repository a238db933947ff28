//! The force set.
//!
//! Six forces applied in a fixed order each tick over the owned node array:
//!
//! 1. `Centering` - pull toward the container center (velocity)
//! 2. `ManyBody` - Barnes-Hut repulsion (velocity)
//! 3. `Collision` - iterative no-overlap relaxation (position + velocity)
//! 4. `RootExclusion` - keep stack nodes out of the root's zone
//! 5. `Boundary` - hard clamp into the padded container
//! 6. `MassDamping` - extra friction for heavy nodes
//!
//! The set is closed: forces are plain named fields, not a registry.
//! Every force skips pinned nodes and nodes with a non-finite position or a
//! non-positive radius, so a malformed node can never stall the loop.

mod boundary;
mod centering;
mod collision;
mod damping;
mod many_body;
mod root_exclusion;

pub use boundary::Boundary;
pub use centering::Centering;
pub use collision::Collision;
pub use damping::MassDamping;
pub use many_body::ManyBody;
pub use root_exclusion::RootExclusion;

use crate::config::PhysicsConstants;
use crate::graph::NodeStore;
use crate::layout::PhysicsParams;

/// Per-tick inputs shared by every force.
#[derive(Debug, Clone, Copy)]
pub struct ForceContext<'a> {
    pub params: &'a PhysicsParams,
    pub constants: &'a PhysicsConstants,
    pub width: f32,
    pub height: f32,
    /// Base radius of the root.
    pub root_radius: f32,
    /// Mean stack radius, the reference for mass factors.
    pub avg_radius: f32,
    /// Current simulation energy.
    pub alpha: f32,
}

impl ForceContext<'_> {
    /// Container center, where the root lives.
    #[inline]
    pub fn center(&self) -> (f32, f32) {
        (self.width / 2.0, self.height / 2.0)
    }

    /// Radius of the root's no-go zone.
    #[inline]
    pub fn exclusion_radius(&self) -> f32 {
        self.root_radius * self.constants.exclusion_factor
    }
}

/// Weighting from a node's radius relative to the average.
///
/// Grows with `radius² / avg²`; `1.0` when either input is unusable.
pub fn mass_factor(radius: f32, avg_radius: f32, constants: &PhysicsConstants) -> f32 {
    if !(radius.is_finite() && avg_radius.is_finite()) || radius <= 0.0 || avg_radius <= 0.0 {
        return 1.0;
    }
    let ratio = (radius * radius) / (avg_radius * avg_radius);
    (1.0 + constants.mass_weight * (ratio - 1.0))
        .clamp(constants.min_mass_factor, constants.max_mass_factor)
}

/// Tiny deterministic offset used to separate coincident nodes.
///
/// Stands in for a random jiggle so runs stay reproducible.
pub fn jiggle(index: usize) -> (f32, f32) {
    const GOLDEN_ANGLE: f32 = 2.399_963;
    let angle = index as f32 * GOLDEN_ANGLE;
    (angle.cos() * 1e-3, angle.sin() * 1e-3)
}

/// Outcome of a polish run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolishReport {
    /// Constraint passes performed.
    pub passes: u32,
    /// Largest violation measured by the last pass, in px.
    pub residual: f32,
}

/// The fixed, ordered set of forces.
#[derive(Default)]
pub struct ForceSet {
    pub centering: Centering,
    pub many_body: ManyBody,
    pub collision: Collision,
    pub root_exclusion: RootExclusion,
    pub boundary: Boundary,
    pub mass_damping: MassDamping,
}

impl ForceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply every force once, in order.
    pub fn apply(&mut self, nodes: &mut NodeStore, ctx: &ForceContext<'_>) {
        self.centering.apply(nodes, ctx);
        self.many_body.apply(nodes, ctx);
        self.collision.apply(nodes, ctx);
        self.root_exclusion.apply(nodes, ctx, ctx.constants.exclusion_strength);
        self.boundary.apply(nodes, ctx);
        self.mass_damping.apply(nodes, ctx);
    }

    /// Run the corrective constraints at full strength until the layout
    /// satisfies them within `polish_tolerance`, or `polish_passes` runs out.
    pub fn polish(&mut self, nodes: &mut NodeStore, ctx: &ForceContext<'_>) -> PolishReport {
        let tolerance = ctx.constants.polish_tolerance;
        let mut report = PolishReport {
            passes: 0,
            residual: 0.0,
        };

        while report.passes < ctx.constants.polish_passes {
            report.passes += 1;
            let overlap = self.collision.relax(nodes, ctx, 1.0);
            let intrusion = self.root_exclusion.apply(nodes, ctx, 1.0);
            let escape = self.boundary.apply(nodes, ctx);
            report.residual = overlap.max(intrusion).max(escape);
            if report.residual <= tolerance {
                break;
            }
        }

        report
    }

    /// Drop cached collision radii; call after any radius or scale change.
    pub fn invalidate_collision(&mut self) {
        self.collision.invalidate();
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::graph::{CloudDataset, NodeStore, StackEntry};

    /// A store with the root at `(cx, cy)` and stack nodes at `positions`,
    /// all with `radius`.
    pub fn store_with(root: (f32, f32, f32), positions: &[(f32, f32)], radius: f32) -> NodeStore {
        let dataset = CloudDataset {
            stacks: positions
                .iter()
                .enumerate()
                .map(|(i, _)| StackEntry {
                    id: format!("n{i}"),
                    domain: "d".to_string(),
                    base_radius: radius,
                    icon_key: None,
                    color_key: None,
                })
                .collect(),
            ..Default::default()
        };
        let mut store = NodeStore::from_dataset(&dataset).unwrap();
        store.pos_x[0] = root.0;
        store.pos_y[0] = root.1;
        store.radius[0] = root.2;
        for (i, &(x, y)) in positions.iter().enumerate() {
            store.pos_x[i + 1] = x;
            store.pos_y[i + 1] = y;
            store.radius[i + 1] = radius;
        }
        store
    }
}
