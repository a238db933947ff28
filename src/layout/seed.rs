//! Node seeding.
//!
//! Computes the starting position of each stack node along an angle inside
//! its domain's sector, just outside the root's no-go zone and inside the
//! container's boundary padding. Also derives viewport-scaled radii, which
//! are recomputed whenever the viewport changes.

use super::sectors::Sector;
use crate::config::PhysicsConstants;

/// Screen direction for a sector angle (clockwise from 12 o'clock).
#[inline]
pub fn direction(angle: f32) -> (f32, f32) {
    (angle.sin(), -angle.cos())
}

/// Angle for the `index`-th of `count` nodes sharing `sector`.
///
/// One node sits on the sector midpoint. More nodes are spread evenly
/// between `start + pad` and `end - pad`, where `pad = span × padding_fraction`,
/// so no node lands exactly on a sector boundary.
pub fn seed_angle(sector: &Sector, index: usize, count: usize, padding_fraction: f32) -> f32 {
    if count <= 1 {
        return sector.mid_angle;
    }

    let span = sector.span();
    let pad = span * padding_fraction.clamp(0.0, 0.5);
    let usable = span - 2.0 * pad;
    let t = index.min(count - 1) as f32 / (count - 1) as f32;
    sector.start_angle + pad + usable * t
}

/// Farthest distance from the center along `angle` that keeps a node of
/// `radius` inside the padded container.
pub fn max_reach(angle: f32, width: f32, height: f32, radius: f32, padding: f32) -> f32 {
    let half_w = width / 2.0 - padding - radius;
    let half_h = height / 2.0 - padding - radius;
    if half_w <= 0.0 || half_h <= 0.0 {
        return 0.0;
    }

    let (dx, dy) = direction(angle);
    let reach_x = if dx.abs() > 1e-6 { half_w / dx.abs() } else { f32::INFINITY };
    let reach_y = if dy.abs() > 1e-6 { half_h / dy.abs() } else { f32::INFINITY };
    reach_x.min(reach_y)
}

/// Everything needed to seed one stack node.
#[derive(Debug, Clone, Copy)]
pub struct SeedRequest<'a> {
    pub sector: &'a Sector,
    /// Position among the domain's nodes.
    pub index: usize,
    /// Number of nodes in the domain.
    pub count: usize,
    /// Target base radius of the node.
    pub radius: f32,
    /// Root radius × exclusion factor.
    pub exclusion_radius: f32,
    pub boundary_padding: f32,
    pub width: f32,
    pub height: f32,
}

/// A seeded position and the angle it was seeded along.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeedPoint {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
}

/// Seed position for one node.
///
/// The radial distance starts just outside the root zone, staggered outward
/// across `seed_rings` rings so neighbouring siblings don't start stacked,
/// and is capped by [`max_reach`]. When the root zone and the boundary
/// conflict, the midpoint of the two is used.
pub fn seed_position(request: &SeedRequest<'_>, constants: &PhysicsConstants) -> SeedPoint {
    let angle = seed_angle(
        request.sector,
        request.index,
        request.count,
        constants.seed_angular_padding,
    );
    let distance = seed_distance(request, angle, constants);
    let (dx, dy) = direction(angle);

    SeedPoint {
        x: request.width / 2.0 + distance * dx,
        y: request.height / 2.0 + distance * dy,
        angle,
    }
}

/// Radial seed distance along `angle`.
pub fn seed_distance(request: &SeedRequest<'_>, angle: f32, constants: &PhysicsConstants) -> f32 {
    let radius = if request.radius.is_finite() { request.radius.max(0.0) } else { 0.0 };
    let min_distance = request.exclusion_radius + radius + constants.seed_gap;
    let cap = max_reach(
        angle,
        request.width,
        request.height,
        radius,
        request.boundary_padding,
    );

    if min_distance > cap {
        return (min_distance + cap) / 2.0;
    }

    let ring = (request.index % constants.seed_rings.max(1) as usize) as f32;
    (min_distance + ring * (radius + constants.seed_gap)).min(cap)
}

/// Root radius for a viewport min-dimension.
pub fn root_radius(vmin: f32, constants: &PhysicsConstants) -> f32 {
    (vmin * constants.root_radius_fraction).clamp(constants.root_radius_min, constants.root_radius_max)
}

/// Stack radius for a viewport min-dimension, relative to the reference size.
pub fn scaled_radius(base_radius: f32, vmin: f32, constants: &PhysicsConstants) -> f32 {
    let scale = (vmin / constants.reference_vmin)
        .clamp(constants.min_radius_scale, constants.max_radius_scale);
    base_radius * scale
}
