//! 3D convex hull meshing.
//!
//! Incremental hull: an initial tetrahedron is grown point by point. For each
//! point outside the current hull, the faces it can see are removed and the
//! horizon (the boundary of the visible region) is connected to the point.
//! Faces are kept wound counter-clockwise seen from outside, so face normals
//! point away from the hull interior.

use std::collections::HashSet;

use nalgebra::{Point3, Vector3};

use crate::error::{GumError, Result};
use crate::mesh::{bounding_box, Triangle, TriMesh};

/// Minimum number of points for a hull with volume.
pub const MIN_HULL_POINTS: usize = 4;

/// Relative tolerance for visibility and degeneracy tests.
const RELATIVE_EPSILON: f64 = 1e-10;

#[derive(Debug, Clone)]
struct Face {
    vertices: [usize; 3],
    normal: Vector3<f64>,
    offset: f64,
    alive: bool,
}

impl Face {
    fn new(vertices: [usize; 3], points: &[Point3<f64>]) -> Self {
        let [a, b, c] = vertices.map(|i| points[i]);
        let normal = (b - a)
            .cross(&(c - a))
            .try_normalize(0.0)
            .unwrap_or_else(Vector3::zeros);
        Self {
            vertices,
            normal,
            offset: normal.dot(&a.coords),
            alive: true,
        }
    }

    /// Signed distance of `p` above the face plane.
    #[inline]
    fn height(&self, p: &Point3<f64>) -> f64 {
        self.normal.dot(&p.coords) - self.offset
    }

    #[inline]
    fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.vertices;
        [(a, b), (b, c), (c, a)]
    }
}

/// Index and score of the highest-scoring point (earliest on ties).
fn farthest_by<F>(points: &[Point3<f64>], score: F) -> (usize, f64)
where
    F: Fn(&Point3<f64>) -> f64,
{
    points
        .iter()
        .enumerate()
        .map(|(i, p)| (i, score(p)))
        .fold((0, f64::NEG_INFINITY), |best, cur| if cur.1 > best.1 { cur } else { best })
}

/// Pick four points spanning a tetrahedron with volume.
fn initial_simplex(points: &[Point3<f64>], eps: f64) -> Result<[usize; 4]> {
    let (i0, _) = farthest_by(points, |p| -p.x);
    let p0 = points[i0];

    let (i1, d1) = farthest_by(points, |p| (p - p0).norm());
    if d1 <= eps {
        return Err(GumError::DegenerateHull);
    }
    let axis = (points[i1] - p0) / d1;

    let (i2, d2) = farthest_by(points, |p| {
        let v = p - p0;
        (v - axis * v.dot(&axis)).norm()
    });
    if d2 <= eps {
        return Err(GumError::DegenerateHull);
    }

    let plane = axis.cross(&(points[i2] - p0)).normalize();
    let (i3, d3) = farthest_by(points, |p| plane.dot(&(p - p0)).abs());
    if d3 <= eps {
        return Err(GumError::DegenerateHull);
    }

    Ok([i0, i1, i2, i3])
}

/// Compute the convex hull of `points` as a closed triangle mesh.
///
/// The mesh contains only the hull's corner points, in input order. Points on
/// or inside the hull (within a tolerance relative to the point set's size)
/// are dropped.
///
/// # Errors
///
/// Returns [`GumError::InsufficientPointsForHull`] for fewer than four
/// points, and [`GumError::DegenerateHull`] when all points are coplanar.
pub fn convex_hull_mesh(points: &[Point3<f64>]) -> Result<TriMesh> {
    if points.len() < MIN_HULL_POINTS {
        return Err(GumError::InsufficientPointsForHull {
            found: points.len(),
        });
    }

    let scale = bounding_box(points)
        .map(|(min, max)| (max - min).norm())
        .unwrap_or(0.0)
        .max(1.0);
    let eps = RELATIVE_EPSILON * scale;

    let simplex = initial_simplex(points, eps)?;
    let interior = Point3::from(
        simplex
            .iter()
            .fold(Vector3::zeros(), |acc, &i| acc + points[i].coords)
            / 4.0,
    );

    let [a, b, c, d] = simplex;
    let mut faces: Vec<Face> = Vec::new();
    for tri in [[a, b, c], [a, b, d], [a, c, d], [b, c, d]] {
        faces.push(outward_face(tri, points, &interior));
    }

    for (pid, p) in points.iter().enumerate() {
        if simplex.contains(&pid) {
            continue;
        }

        let visible: Vec<usize> = (0..faces.len())
            .filter(|&f| faces[f].alive && faces[f].height(p) > eps)
            .collect();
        if visible.is_empty() {
            continue;
        }

        let mut directed: HashSet<(usize, usize)> = HashSet::new();
        for &f in &visible {
            directed.extend(faces[f].edges());
            faces[f].alive = false;
        }

        // Horizon edges have no reversed twin among the visible faces
        let mut horizon: Vec<(usize, usize)> = directed
            .iter()
            .filter(|&&(u, v)| !directed.contains(&(v, u)))
            .copied()
            .collect();
        horizon.sort_unstable();

        for (u, v) in horizon {
            faces.push(outward_face([u, v, pid], points, &interior));
        }
    }

    let hull: Vec<[usize; 3]> = faces
        .iter()
        .filter(|f| f.alive)
        .map(|f| f.vertices)
        .collect();

    // Compact to the points actually on the hull, keeping input order
    let mut used = vec![false; points.len()];
    for &v in hull.iter().flatten() {
        used[v] = true;
    }
    let mut remap = vec![usize::MAX; points.len()];
    let mut vertices = Vec::new();
    for (i, p) in points.iter().enumerate() {
        if used[i] {
            remap[i] = vertices.len();
            vertices.push(*p);
        }
    }
    let triangles: Vec<Triangle> = hull.iter().map(|tri| tri.map(|v| remap[v])).collect();

    log::debug!(
        "convex hull: {} points -> {} vertices, {} faces",
        points.len(),
        vertices.len(),
        triangles.len()
    );

    Ok(TriMesh::from_valid_parts(vertices, triangles))
}

/// Build a face, flipping it if its normal points toward `interior`.
fn outward_face(tri: [usize; 3], points: &[Point3<f64>], interior: &Point3<f64>) -> Face {
    let face = Face::new(tri, points);
    if face.height(interior) > 0.0 {
        Face::new([tri[0], tri[2], tri[1]], points)
    } else {
        face
    }
}
