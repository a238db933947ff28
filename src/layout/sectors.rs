//! Domain sector allocation.
//!
//! Partitions the full circle into one angular sector per domain, sized by
//! experience weight, exactly like a pie chart: the first sector starts at
//! 12 o'clock and sectors proceed clockwise. Angles are radians in that
//! convention, so a sector angle `a` points along screen direction
//! `(sin a, -cos a)`.

use std::f32::consts::TAU;

use serde::Serialize;

use crate::graph::DomainWeight;

/// One domain's angular range.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sector {
    pub domain: String,
    pub start_angle: f32,
    pub end_angle: f32,
    pub mid_angle: f32,
}

impl Sector {
    /// Angular width of the sector.
    pub fn span(&self) -> f32 {
        self.end_angle - self.start_angle
    }
}

/// Ordered sectors with lookup by domain.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SectorMap {
    sectors: Vec<Sector>,
}

impl SectorMap {
    pub fn get(&self, domain: &str) -> Option<&Sector> {
        self.sectors.iter().find(|s| s.domain == domain)
    }

    /// Sectors in allocation (clockwise) order.
    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }
}

/// Allocate sectors for `weights`, in the given order.
///
/// Negative and non-finite weights count as zero and get a zero-width
/// sector. When every weight is zero the circle is split evenly so the
/// sectors still cover `[0, 2π)`. The last sector always ends at exactly 2π.
pub fn allocate_sectors(weights: &[DomainWeight]) -> SectorMap {
    if weights.is_empty() {
        return SectorMap::default();
    }

    let sanitized: Vec<f32> = weights
        .iter()
        .map(|w| if w.weight.is_finite() && w.weight > 0.0 { w.weight } else { 0.0 })
        .collect();
    let total: f32 = sanitized.iter().sum();

    let fractions: Vec<f32> = if total > 0.0 {
        sanitized.iter().map(|w| w / total).collect()
    } else {
        vec![1.0 / weights.len() as f32; weights.len()]
    };

    // Trailing zero-width sectors collapse onto 2π instead of absorbing drift.
    let closing = fractions
        .iter()
        .rposition(|&f| f > 0.0)
        .unwrap_or(weights.len() - 1);
    let mut sectors = Vec::with_capacity(weights.len());
    let mut cursor = 0.0f32;

    for (i, (weight, fraction)) in weights.iter().zip(&fractions).enumerate() {
        let start_angle = cursor;
        let end_angle = if i >= closing {
            TAU
        } else {
            (start_angle + TAU * fraction).min(TAU)
        };

        sectors.push(Sector {
            domain: weight.domain.clone(),
            start_angle,
            end_angle,
            mid_angle: (start_angle + end_angle) / 2.0,
        });
        cursor = end_angle;
    }

    SectorMap { sectors }
}
