//! Synthetic dental arch used by the demo commands.
//!
//! The arch is a half circle in the `(x, z)` plane opening toward `-z`. The
//! scanned mesh stand-in is a polar grid (rings by spokes one degree apart)
//! centred on the arch, so segment walks from gingival points, which sit on
//! spokes, have vertices to step along.

use std::f64::consts::PI;

use nalgebra::Point3;

/// Radius of the boundary point cloud.
pub const BOUNDARY_RADIUS: f64 = 20.0;

/// Radius of the gingival margin.
pub const GINGIVAL_RADIUS: f64 = 17.0;

const RING_SPACING: f64 = 0.25;
const INNER_RING: f64 = 10.0;
const OUTER_RING: f64 = 30.0;
const SPOKES: usize = 180;

/// Inputs of a reconstruction pass over a synthetic arch.
pub struct SyntheticArch {
    pub boundary: Vec<Point3<f64>>,
    pub gingival: Vec<Point3<f64>>,
    pub heights: Vec<f64>,
    pub vertices: Vec<Point3<f64>>,
}

fn on_circle(radius: f64, degrees: f64) -> Point3<f64> {
    let a = degrees.to_radians();
    Point3::new(-radius * a.cos(), 0.0, radius * a.sin())
}

/// Build an arch with `gingival_count` margin points.
///
/// Margin heights cycle between `min_height` and `max_height` to mimic the
/// scalloped gum line between teeth.
pub fn generate(gingival_count: usize, min_height: f64, max_height: f64) -> SyntheticArch {
    let boundary: Vec<Point3<f64>> = (0..=SPOKES)
        .map(|i| on_circle(BOUNDARY_RADIUS, i as f64))
        .collect();

    // Keep margin points on whole-degree spokes, away from the arch ends
    let step = (SPOKES - 20) as f64 / gingival_count.max(1) as f64;
    let gingival: Vec<Point3<f64>> = (0..gingival_count)
        .map(|i| on_circle(GINGIVAL_RADIUS, (10.0 + step * (i as f64 + 0.5)).round()))
        .collect();

    let heights = (0..gingival_count)
        .map(|i| {
            let phase = (i as f64 * PI / 2.0).sin().abs();
            min_height + (max_height - min_height) * phase
        })
        .collect();

    let rings = ((OUTER_RING - INNER_RING) / RING_SPACING).round() as usize;
    let mut vertices = Vec::with_capacity((rings + 1) * (SPOKES + 1));
    for spoke in 0..=SPOKES {
        for ring in 0..=rings {
            let radius = INNER_RING + ring as f64 * RING_SPACING;
            vertices.push(on_circle(radius, spoke as f64));
        }
    }

    SyntheticArch {
        boundary,
        gingival,
        heights,
        vertices,
    }
}
