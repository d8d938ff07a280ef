//! Core mesh data structures.
//!
//! This module provides the indexed triangle mesh returned by the surface
//! meshers.
//!
//! # Overview
//!
//! The primary type is [`TriMesh`], a vertex buffer plus an ordered list of
//! triangles. Per-vertex normals are derived from the faces at construction
//! time and kept alongside for shading; they are not part of the mesh's
//! identity.
//!
//! ```
//! use gumline::mesh::TriMesh;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let mesh = TriMesh::new(vertices, vec![[0, 1, 2]]).unwrap();
//! assert_eq!(mesh.num_faces(), 1);
//! ```

mod trimesh;

pub use trimesh::{Triangle, TriMesh};

pub(crate) use trimesh::bounding_box;
