//! # Gumline
//!
//! Reconstruction of a smooth gum ("gingival") surface around a digitized
//! dental arch.
//!
//! Gumline takes a boundary point cloud, the gingival margin points with
//! their heights, and the vertices of a scanned mesh, and derives:
//!
//! - **Control points**: five landmarks summarizing the arch boundary
//! - **Guiding curve**: a Catmull-Rom spline through the landmarks, plus a
//!   laterally offset outer curve
//! - **Deformed profile**: mesh vertices along each gingival segment, with
//!   their height remapped by a quartic falloff
//! - **Meshes**: a closed gum cap (3D convex hull) and a flat base (planar
//!   Delaunay triangulation)
//!
//! Coordinates follow the scanned data: `y` is vertical and the arch lies in
//! the `(x, z)` plane.
//!
//! ## Quick Start
//!
//! ```
//! use gumline::prelude::*;
//! use nalgebra::Point3;
//!
//! // Boundary samples on a half ellipse
//! let boundary: Vec<Point3<f64>> = (0..=40)
//!     .map(|i| {
//!         let a = std::f64::consts::PI * i as f64 / 40.0;
//!         Point3::new(-20.0 * a.cos(), 0.0, 15.0 * a.sin())
//!     })
//!     .collect();
//!
//! let control = find_control_points(&boundary).unwrap();
//! let curve = CatmullRomCurve::new(control.as_slice(), 0.0).unwrap();
//!
//! let samples = curve.points(100);
//! let outer = create_offset_curve(&samples, 5.0);
//! assert_eq!(outer.len(), 101);
//! ```
//!
//! ## Full Reconstruction
//!
//! [`pipeline::reconstruct`] runs every stage in one pass; see the
//! [`pipeline`] module.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod mesh;
pub mod pipeline;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use gumline::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::anchors::{find_control_points, ControlPointSet};
    pub use crate::algo::curve::{create_offset_curve, CatmullRomCurve};
    pub use crate::algo::profile::{AnchorPair, ProfileOptions};
    pub use crate::algo::triangulate::{convex_hull_mesh, delaunay_mesh};
    pub use crate::algo::Progress;
    pub use crate::error::{GumError, Result};
    pub use crate::mesh::{Triangle, TriMesh};
    pub use crate::pipeline::{reconstruct, ReconstructionInput, ReconstructionOptions};
}

// Re-export nalgebra types for convenience
pub use nalgebra;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use nalgebra::Point3;

    #[test]
    fn test_curve_through_control_points() {
        let boundary: Vec<Point3<f64>> = (0..=40)
            .map(|i| {
                let a = std::f64::consts::PI * i as f64 / 40.0;
                Point3::new(-20.0 * a.cos(), 1.0, 15.0 * a.sin())
            })
            .collect();

        let control = find_control_points(&boundary).unwrap();
        let curve = CatmullRomCurve::new(control.as_slice(), 0.0).unwrap();
        let samples = curve.points(100);

        assert_eq!(samples.first(), control.as_slice().first());
        assert_eq!(samples.last(), control.as_slice().last());

        // Curve passes through the middle landmark at t = 0.5
        let apex = curve.point_at(0.5);
        assert!((apex - control.top_centroid()).norm() < 1e-9);
    }
}
