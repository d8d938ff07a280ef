//! Reconstruction algorithms.
//!
//! This module contains the stages of the gum surface reconstruction, leaves
//! first:
//!
//! - **Anchors**: control points summarizing the arch boundary
//! - **Curve**: Catmull-Rom guiding curve and its lateral offset
//! - **Profile**: segment walks and quartic profile deformation
//! - **Inner**: flat band of points between the curve and its offset
//! - **Triangulate**: planar Delaunay triangulation, 3D convex hull
//!
//! Each stage is a set of free functions over point slices; the
//! [`pipeline`](crate::pipeline) module chains them.

pub mod anchors;
pub mod curve;
pub mod inner;
pub mod profile;
pub mod progress;
pub mod triangulate;

pub use progress::Progress;
