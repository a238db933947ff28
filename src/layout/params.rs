//! Adaptive physics parameters.
//!
//! Maps viewport/node statistics to force tuning so the cloud behaves the
//! same on a phone and on a desktop monitor. Larger and denser layouts get
//! more friction, faster cooldown and weaker per-node repulsion.
//!
//! The mapping is one continuous formula over two ramps:
//!
//! - `size_t`: 0 at `small_vmin`, 1 at `large_vmin`
//! - `density_t`: 0 when empty, 1 at `dense_fill` coverage
//!
//! It is a pure function: identical inputs always produce identical output.

use super::stats::ViewportStats;
use crate::config::PhysicsConstants;

/// Force tuning for one viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsParams {
    /// Many-body strength; negative repels.
    pub charge_strength: f32,
    /// Fraction of velocity removed per tick.
    pub velocity_decay: f32,
    /// Rate at which alpha eases toward its target.
    pub alpha_decay: f32,
    /// Gap kept between colliding node edges.
    pub collision_padding: f32,
    /// Distance floor for the many-body force.
    pub many_body_distance_min: f32,
    /// Centering strength.
    pub positioning_strength: f32,
    /// Barnes-Hut accuracy.
    pub theta: f32,
}

impl PhysicsParams {
    /// Parameters under which no force moves anything.
    pub fn inert() -> Self {
        Self {
            charge_strength: 0.0,
            velocity_decay: 1.0,
            alpha_decay: 1.0,
            collision_padding: 0.0,
            many_body_distance_min: 1.0,
            positioning_strength: 0.0,
            theta: 0.0,
        }
    }
}

/// Derive the parameter bundle for `stats`.
pub fn adapt_params(stats: &ViewportStats, constants: &PhysicsConstants) -> PhysicsParams {
    if stats.is_degenerate() {
        return PhysicsParams::inert();
    }

    let size_span = (constants.large_vmin - constants.small_vmin).max(1.0);
    let size_t = ((stats.vmin - constants.small_vmin) / size_span).clamp(0.0, 1.0);
    let density_t = if constants.dense_fill > 0.0 {
        (stats.node_density / constants.dense_fill).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let charge_scale = (constants.reference_vmin / stats.vmin).sqrt().clamp(0.5, 1.5);
    let charge_strength = constants.base_charge * charge_scale;

    let velocity_decay = (constants.base_velocity_decay + 0.15 * size_t + 0.15 * density_t)
        .min(constants.max_velocity_decay);

    let alpha_decay = constants.base_alpha_decay * (1.0 + 0.5 * size_t + 0.5 * density_t);

    let collision_padding = (constants.min_collision_padding + stats.vmin * 0.004)
        .clamp(constants.min_collision_padding, constants.max_collision_padding);

    let positioning_strength =
        constants.base_positioning * (1.0 - 0.4 * size_t) * (1.0 + 0.5 * density_t);

    PhysicsParams {
        charge_strength,
        velocity_decay,
        alpha_decay,
        collision_padding,
        many_body_distance_min: stats.avg_radius.max(1.0),
        positioning_strength,
        theta: constants.theta,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::stats::compute_stats;

    fn params_for(width: f32, height: f32, radii: &[f32]) -> PhysicsParams {
        adapt_params(&compute_stats(width, height, radii), &PhysicsConstants::default())
    }

    #[test]
    fn test_deterministic() {
        let radii = [20.0, 24.0, 18.0, 30.0];
        assert_eq!(params_for(800.0, 600.0, &radii), params_for(800.0, 600.0, &radii));
    }

    #[test]
    fn test_larger_viewport_damps_more_and_repels_less() {
        let radii = [20.0; 8];
        let phone = params_for(375.0, 667.0, &radii);
        let desktop = params_for(1920.0, 1080.0, &radii);

        assert!(desktop.velocity_decay > phone.velocity_decay);
        assert!(desktop.charge_strength.abs() < phone.charge_strength.abs());
        assert!(phone.charge_strength < 0.0);
        assert!(desktop.charge_strength < 0.0);
    }

    #[test]
    fn test_denser_set_cools_faster() {
        let sparse = params_for(800.0, 600.0, &[10.0; 4]);
        let dense = params_for(800.0, 600.0, &[40.0; 40]);

        assert!(dense.alpha_decay > sparse.alpha_decay);
        assert!(dense.velocity_decay > sparse.velocity_decay);
    }

    #[test]
    fn test_bounds_respected() {
        let constants = PhysicsConstants::default();
        let huge = params_for(10_000.0, 10_000.0, &[500.0; 200]);

        assert!(huge.velocity_decay <= constants.max_velocity_decay);
        assert!(huge.collision_padding <= constants.max_collision_padding);
        assert!(huge.collision_padding >= constants.min_collision_padding);
        assert_eq!(huge.theta, constants.theta);
    }

    #[test]
    fn test_degenerate_is_inert() {
        let params = params_for(0.0, 0.0, &[10.0]);
        assert_eq!(params, PhysicsParams::inert());
    }

    #[test]
    fn test_distance_min_tracks_avg_radius() {
        assert_eq!(params_for(800.0, 600.0, &[12.0, 28.0]).many_body_distance_min, 20.0);
        assert_eq!(params_for(800.0, 600.0, &[]).many_body_distance_min, 1.0);
    }
}
