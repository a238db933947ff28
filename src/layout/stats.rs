//! Viewport and node statistics.
//!
//! Scalar metrics derived from the container size and current node radii.
//! They feed the adaptive parameter mapping and carry no state.

use std::f32::consts::PI;

/// Metrics of one viewport/node-set combination.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewportStats {
    /// Container area in px².
    pub viewport_area: f32,
    /// Smaller container dimension.
    pub vmin: f32,
    /// Mean radius of well-formed nodes.
    pub avg_radius: f32,
    /// Fraction of the container covered by node discs.
    pub node_density: f32,
}

impl ViewportStats {
    /// All-zero stats mean "nothing to lay out": the driver no-ops.
    pub fn is_degenerate(&self) -> bool {
        self.viewport_area <= 0.0 || self.vmin <= 0.0
    }
}

/// Compute stats for a `width × height` container.
///
/// Radii that are non-finite or non-positive are ignored. A non-finite or
/// non-positive dimension yields all-zero stats.
pub fn compute_stats(width: f32, height: f32, radii: &[f32]) -> ViewportStats {
    if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
        return ViewportStats::default();
    }

    let viewport_area = width * height;
    let vmin = width.min(height);

    let mut count = 0usize;
    let mut radius_sum = 0.0f32;
    let mut disc_area = 0.0f32;
    for &r in radii {
        if !r.is_finite() || r <= 0.0 {
            continue;
        }
        count += 1;
        radius_sum += r;
        disc_area += PI * r * r;
    }

    let avg_radius = if count == 0 { 0.0 } else { radius_sum / count as f32 };

    ViewportStats {
        viewport_area,
        vmin,
        avg_radius,
        node_density: disc_area / viewport_area,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_stats() {
        let stats = compute_stats(800.0, 600.0, &[10.0, 20.0, 30.0]);

        assert_eq!(stats.viewport_area, 480_000.0);
        assert_eq!(stats.vmin, 600.0);
        assert!((stats.avg_radius - 20.0).abs() < 1e-5);

        let expected_density = PI * (100.0 + 400.0 + 900.0) / 480_000.0;
        assert!((stats.node_density - expected_density).abs() < 1e-6);
        assert!(!stats.is_degenerate());
    }

    #[test]
    fn test_degenerate_viewport() {
        for (w, h) in [(0.0, 0.0), (0.0, 500.0), (-10.0, 300.0), (f32::NAN, 300.0)] {
            let stats = compute_stats(w, h, &[10.0]);
            assert_eq!(stats, ViewportStats::default());
            assert!(stats.is_degenerate());
        }
    }

    #[test]
    fn test_invalid_radii_ignored() {
        let stats = compute_stats(100.0, 100.0, &[10.0, f32::NAN, -3.0, 0.0, f32::INFINITY]);
        assert_eq!(stats.avg_radius, 10.0);
    }

    #[test]
    fn test_no_nodes() {
        let stats = compute_stats(100.0, 100.0, &[]);
        assert_eq!(stats.avg_radius, 0.0);
        assert_eq!(stats.node_density, 0.0);
        assert!(!stats.is_degenerate());
    }
}
