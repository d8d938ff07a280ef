//! Indexed triangle mesh.

use std::collections::HashMap;

use nalgebra::{Point3, Vector3};

use crate::error::{GumError, Result};

/// A triangle as three indices into a mesh vertex buffer.
pub type Triangle = [usize; 3];

/// An indexed triangle mesh with derived per-vertex normals.
#[derive(Debug, Clone, Default)]
pub struct TriMesh {
    vertices: Vec<Point3<f64>>,
    triangles: Vec<Triangle>,
    normals: Vec<Vector3<f64>>,
}

impl TriMesh {
    /// Build a mesh from a vertex buffer and a triangle list.
    ///
    /// Vertex normals are computed immediately by averaging the
    /// (area-weighted) normals of the faces around each vertex.
    ///
    /// # Errors
    ///
    /// Returns [`GumError::InvalidVertexIndex`] if a triangle references a
    /// vertex outside `vertices`.
    pub fn new(vertices: Vec<Point3<f64>>, triangles: Vec<Triangle>) -> Result<Self> {
        for (ti, tri) in triangles.iter().enumerate() {
            for &vi in tri {
                if vi >= vertices.len() {
                    return Err(GumError::InvalidVertexIndex {
                        triangle: ti,
                        vertex: vi,
                    });
                }
            }
        }

        let normals = compute_vertex_normals(&vertices, &triangles);
        Ok(Self {
            vertices,
            triangles,
            normals,
        })
    }

    /// Build a mesh from buffers whose indices are known to be in range.
    pub(crate) fn from_valid_parts(vertices: Vec<Point3<f64>>, triangles: Vec<Triangle>) -> Self {
        debug_assert!(triangles.iter().flatten().all(|&v| v < vertices.len()));
        let normals = compute_vertex_normals(&vertices, &triangles);
        Self {
            vertices,
            triangles,
            normals,
        }
    }

    /// Create a mesh with no vertices and no faces.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.triangles.len()
    }

    /// Check whether the mesh has no faces.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// The vertex buffer.
    #[inline]
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    /// The triangle index buffer.
    #[inline]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Per-vertex normals, parallel to [`vertices`](Self::vertices).
    ///
    /// Vertices not referenced by any face get a zero normal.
    #[inline]
    pub fn normals(&self) -> &[Vector3<f64>] {
        &self.normals
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: usize) -> &Point3<f64> {
        &self.vertices[v]
    }

    /// Get the positions of the three corners of a face.
    pub fn face_positions(&self, f: usize) -> [Point3<f64>; 3] {
        let [a, b, c] = self.triangles[f];
        [self.vertices[a], self.vertices[b], self.vertices[c]]
    }

    // ==================== Geometry ====================

    /// Compute the unit normal of a face.
    ///
    /// Zero-area faces return the zero vector.
    pub fn face_normal(&self, f: usize) -> Vector3<f64> {
        let [p0, p1, p2] = self.face_positions(f);
        (p1 - p0)
            .cross(&(p2 - p0))
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }

    /// Compute the area of a face.
    pub fn face_area(&self, f: usize) -> f64 {
        let [p0, p1, p2] = self.face_positions(f);
        0.5 * (p1 - p0).cross(&(p2 - p0)).norm()
    }

    /// Compute the centroid of a face.
    pub fn face_centroid(&self, f: usize) -> Point3<f64> {
        let [p0, p1, p2] = self.face_positions(f);
        Point3::from((p0.coords + p1.coords + p2.coords) / 3.0)
    }

    /// Compute the total surface area of the mesh.
    pub fn surface_area(&self) -> f64 {
        (0..self.num_faces()).map(|f| self.face_area(f)).sum()
    }

    /// Compute the axis-aligned bounding box of the vertex buffer.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        bounding_box(&self.vertices)
    }

    /// Check whether every edge is shared by exactly two faces.
    pub fn is_closed(&self) -> bool {
        if self.triangles.is_empty() {
            return false;
        }

        let mut edge_faces: HashMap<(usize, usize), usize> = HashMap::new();
        for &[a, b, c] in &self.triangles {
            for (u, v) in [(a, b), (b, c), (c, a)] {
                *edge_faces.entry((u.min(v), u.max(v))).or_insert(0) += 1;
            }
        }
        edge_faces.values().all(|&count| count == 2)
    }

    /// Consume the mesh and return its vertex and triangle buffers.
    pub fn into_parts(self) -> (Vec<Point3<f64>>, Vec<Triangle>) {
        (self.vertices, self.triangles)
    }
}

/// Compute the axis-aligned bounding box of a point set.
pub(crate) fn bounding_box(points: &[Point3<f64>]) -> Option<(Point3<f64>, Point3<f64>)> {
    let first = points.first()?;
    let mut min = *first;
    let mut max = *first;

    for p in points {
        for i in 0..3 {
            min[i] = min[i].min(p[i]);
            max[i] = max[i].max(p[i]);
        }
    }

    Some((min, max))
}

/// Average the face normals around each vertex.
///
/// Face normals are accumulated unnormalized, so larger faces weigh more.
fn compute_vertex_normals(vertices: &[Point3<f64>], triangles: &[Triangle]) -> Vec<Vector3<f64>> {
    let mut normals = vec![Vector3::zeros(); vertices.len()];

    for &[a, b, c] in triangles {
        let n = (vertices[b] - vertices[a]).cross(&(vertices[c] - vertices[a]));
        normals[a] += n;
        normals[b] += n;
        normals[c] += n;
    }

    for n in &mut normals {
        *n = n.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::zeros);
    }

    normals
}
