//! Fixed physics constants.
//!
//! None of these are runtime-configurable from the host: the JS facade always
//! builds the engine with [`PhysicsConstants::default()`]. Tests construct
//! variants directly to probe edge cases.

/// Every tuning constant the engine reads, gathered in one place.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsConstants {
    /// Base many-body strength (negative = repulsive) at the reference viewport.
    pub base_charge: f32,
    /// Barnes-Hut accuracy: cell_size / distance threshold for approximation.
    pub theta: f32,
    /// Viewport min-dimension at which `base_charge` and base radii apply as-is.
    pub reference_vmin: f32,
    /// Min-dimension treated as "phone" by the continuous size ramp.
    pub small_vmin: f32,
    /// Min-dimension treated as "desktop" by the continuous size ramp.
    pub large_vmin: f32,
    /// Node density (covered area fraction) treated as fully dense.
    pub dense_fill: f32,
    /// Velocity decay (friction) for a small, sparse viewport.
    pub base_velocity_decay: f32,
    /// Ceiling for the adapted velocity decay.
    pub max_velocity_decay: f32,
    /// Alpha decay for a small, sparse viewport (~300 ticks to settle).
    pub base_alpha_decay: f32,
    /// Alpha below which the simulation counts as settled.
    pub alpha_min: f32,
    /// Collision padding floor.
    pub min_collision_padding: f32,
    /// Collision padding ceiling.
    pub max_collision_padding: f32,
    /// Centering strength before size/density adaptation.
    pub base_positioning: f32,
    /// Gap kept between node edges and the container walls.
    pub boundary_padding: f32,
    /// Root radius as a fraction of the viewport min-dimension.
    pub root_radius_fraction: f32,
    /// Root radius floor.
    pub root_radius_min: f32,
    /// Root radius ceiling.
    pub root_radius_max: f32,
    /// Lower clamp on the stack radius scale relative to `reference_vmin`.
    pub min_radius_scale: f32,
    /// Upper clamp on the stack radius scale relative to `reference_vmin`.
    pub max_radius_scale: f32,
    /// Multiplier on the root radius defining the no-go zone.
    pub exclusion_factor: f32,
    /// Fraction of root-zone penetration corrected per tick.
    pub exclusion_strength: f32,
    /// How strongly radius differences translate into mass.
    pub mass_weight: f32,
    /// Mass factor floor.
    pub min_mass_factor: f32,
    /// Mass factor ceiling.
    pub max_mass_factor: f32,
    /// Extra damping per unit of mass above 1.
    pub mass_damping: f32,
    /// Ceiling on the extra damping applied to heavy nodes.
    pub max_extra_damping: f32,
    /// Relaxation passes per tick for the collision force.
    pub collision_iterations: u32,
    /// Fraction of overlap resolved per relaxation pass.
    pub collision_strength: f32,
    /// Fraction of a sector's width reserved at each end when seeding.
    pub seed_angular_padding: f32,
    /// Extra radial gap between the root zone and the first seed ring.
    pub seed_gap: f32,
    /// Number of staggered seed rings used to keep siblings apart.
    pub seed_rings: u32,
    /// Per-tick step cap as a fraction of the viewport min-dimension.
    pub max_step_fraction: f32,
    /// Alpha target used while re-settling after a resize.
    pub resize_alpha_target: f32,
    /// Alpha target used while re-settling after an emphasis change.
    pub emphasis_alpha_target: f32,
    /// Shortest resize reheat.
    pub min_reheat_ms: f64,
    /// Longest resize reheat.
    pub max_reheat_ms: f64,
    /// Reheat duration after an emphasis change.
    pub emphasis_reheat_ms: f64,
    /// Synchronous ticks run per settle in reduced-motion mode.
    pub reduced_motion_ticks: u32,
    /// Minimum spacing between accepted host frames.
    pub frame_interval_ms: f64,
    /// Upper bound on constraint passes when polishing a settled layout.
    pub polish_passes: u32,
    /// Largest violation (in px) tolerated by the polish loop.
    pub polish_tolerance: f32,
}

impl Default for PhysicsConstants {
    fn default() -> Self {
        Self {
            base_charge: -60.0,
            theta: 0.9,
            reference_vmin: 600.0,
            small_vmin: 320.0,
            large_vmin: 1440.0,
            dense_fill: 0.35,
            base_velocity_decay: 0.4,
            max_velocity_decay: 0.85,
            base_alpha_decay: 1.0 - 0.001_f32.powf(1.0 / 300.0),
            alpha_min: 0.001,
            min_collision_padding: 2.0,
            max_collision_padding: 8.0,
            base_positioning: 0.06,
            boundary_padding: 8.0,
            root_radius_fraction: 0.07,
            root_radius_min: 18.0,
            root_radius_max: 56.0,
            min_radius_scale: 0.55,
            max_radius_scale: 1.25,
            exclusion_factor: 1.6,
            exclusion_strength: 0.8,
            mass_weight: 0.5,
            min_mass_factor: 0.5,
            max_mass_factor: 3.0,
            mass_damping: 0.08,
            max_extra_damping: 0.3,
            collision_iterations: 3,
            collision_strength: 0.8,
            seed_angular_padding: 0.1,
            seed_gap: 6.0,
            seed_rings: 3,
            max_step_fraction: 0.04,
            resize_alpha_target: 0.3,
            emphasis_alpha_target: 0.05,
            min_reheat_ms: 300.0,
            max_reheat_ms: 1500.0,
            emphasis_reheat_ms: 250.0,
            reduced_motion_ticks: 36,
            frame_interval_ms: 16.0,
            polish_passes: 200,
            polish_tolerance: 0.01,
        }
    }
}
