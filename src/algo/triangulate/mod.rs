//! Surface meshing of point sets.
//!
//! Two ways of turning a point set back into a triangle mesh:
//!
//! - [`delaunay_mesh`]: planar Delaunay triangulation of the points' `(x, z)`
//!   projection, for flat or boundary surfaces. The `y` coordinate is carried
//!   through unchanged.
//! - [`convex_hull_mesh`]: closed 3D convex hull, for the densified deformed
//!   gum cap.
//!
//! Both attach per-vertex normals to the returned [`TriMesh`](crate::mesh::TriMesh).
//!
//! # Example
//!
//! ```
//! use gumline::algo::triangulate::{convex_hull_mesh, delaunay_mesh};
//! use nalgebra::Point3;
//!
//! let square = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 1.0),
//!     Point3::new(0.0, 0.0, 1.0),
//!     Point3::new(0.5, 0.0, 0.5),
//! ];
//! let flat = delaunay_mesh(&square);
//! assert_eq!(flat.num_faces(), 4);
//!
//! let tetrahedron = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(0.0, 0.0, 1.0),
//! ];
//! let hull = convex_hull_mesh(&tetrahedron).unwrap();
//! assert_eq!(hull.num_faces(), 4);
//! ```

mod delaunay;
mod hull;

pub use delaunay::{
    delaunay_mesh, delaunay_mesh_with_progress, triangulate_xz, triangulate_xz_with_progress,
    DEGENERATE_EPSILON,
};
pub use hull::{convex_hull_mesh, MIN_HULL_POINTS};
