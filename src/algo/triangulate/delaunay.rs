//! Planar Delaunay triangulation by incremental insertion (Bowyer-Watson).
//!
//! Points are projected onto the horizontal `(x, z)` plane. Triangulation
//! starts from a synthetic super-triangle enclosing every point; each point
//! is then inserted by
//!
//! 1. removing every triangle whose circumcircle contains the point,
//! 2. collecting the boundary of the removed region through a toggling edge
//!    set (an edge seen twice is interior and cancels out),
//! 3. connecting the point to every boundary edge.
//!
//! Finally every triangle touching a super-triangle corner is dropped.
//!
//! Triangles whose corners are collinear (twice the signed area below
//! [`DEGENERATE_EPSILON`]) never report a containing circumcircle and are not
//! created during re-triangulation. Duplicate points therefore leave the
//! result slightly sparser instead of failing.

use std::collections::BTreeSet;

use nalgebra::{Point2, Point3};

use crate::algo::Progress;
use crate::mesh::{bounding_box, Triangle, TriMesh};

/// Determinant magnitude below which three points count as collinear.
pub const DEGENERATE_EPSILON: f64 = 1e-10;

/// Super-triangle size relative to the larger bounding box extent.
const SUPER_TRIANGLE_SCALE: f64 = 20.0;

/// Insertions between two progress reports.
const PROGRESS_INTERVAL: usize = 256;

/// A triangulation vertex: an input point or a super-triangle corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum VertexRef {
    Point(usize),
    Super(u8),
}

impl VertexRef {
    #[inline]
    fn point_index(self) -> Option<usize> {
        match self {
            VertexRef::Point(i) => Some(i),
            VertexRef::Super(_) => None,
        }
    }
}

/// An undirected edge with its endpoints in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct Edge(VertexRef, VertexRef);

impl Edge {
    #[inline]
    fn new(a: VertexRef, b: VertexRef) -> Self {
        if a <= b {
            Edge(a, b)
        } else {
            Edge(b, a)
        }
    }
}

/// Insertion state: projected points plus the triangle arena.
struct Triangulation {
    points: Vec<Point2<f64>>,
    corners: [Point2<f64>; 3],
    triangles: Vec<[VertexRef; 3]>,
}

impl Triangulation {
    fn new(points: Vec<Point2<f64>>, corners: [Point2<f64>; 3]) -> Self {
        Self {
            points,
            corners,
            triangles: vec![[VertexRef::Super(0), VertexRef::Super(1), VertexRef::Super(2)]],
        }
    }

    #[inline]
    fn position(&self, v: VertexRef) -> Point2<f64> {
        match v {
            VertexRef::Point(i) => self.points[i],
            VertexRef::Super(k) => self.corners[k as usize],
        }
    }

    /// Insert point `pid`; returns the number of degenerate triangles skipped.
    fn insert(&mut self, pid: usize) -> usize {
        let p = self.points[pid];
        let mut boundary: BTreeSet<Edge> = BTreeSet::new();

        let mut kept = Vec::with_capacity(self.triangles.len() + 2);
        for tri in std::mem::take(&mut self.triangles) {
            let [a, b, c] = tri.map(|v| self.position(v));
            if circumcircle_contains(&p, &a, &b, &c) {
                for (u, v) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                    toggle_edge(&mut boundary, Edge::new(u, v));
                }
            } else {
                kept.push(tri);
            }
        }
        self.triangles = kept;

        let new_vertex = VertexRef::Point(pid);
        let mut skipped = 0;
        for Edge(u, v) in boundary {
            let (pu, pv) = (self.position(u), self.position(v));
            if orient2d(&pu, &pv, &p).abs() < DEGENERATE_EPSILON {
                skipped += 1;
                continue;
            }
            self.triangles.push([u, v, new_vertex]);
        }
        skipped
    }
}

#[inline]
fn toggle_edge(edges: &mut BTreeSet<Edge>, edge: Edge) {
    if !edges.remove(&edge) {
        edges.insert(edge);
    }
}

/// Twice the signed area of triangle `abc` (positive when counter-clockwise).
#[inline]
fn orient2d(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Whether `p` lies inside or on the circumcircle of `abc`.
///
/// Collinear triangles have no finite circumcircle and contain nothing.
fn circumcircle_contains(p: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> bool {
    let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
    if d.abs() < DEGENERATE_EPSILON {
        return false;
    }

    let a2 = a.x * a.x + a.y * a.y;
    let b2 = b.x * b.x + b.y * b.y;
    let c2 = c.x * c.x + c.y * c.y;
    let center = Point2::new(
        (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d,
        (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d,
    );

    let radius = (a - center).norm();
    (p - center).norm() <= radius
}

/// Super-triangle corners enclosing the bounding box `min..max`.
fn super_triangle(min: Point2<f64>, max: Point2<f64>) -> [Point2<f64>; 3] {
    let extent = (max.x - min.x).max(max.y - min.y).max(f64::MIN_POSITIVE);
    let mid = Point2::new((min.x + max.x) * 0.5, (min.y + max.y) * 0.5);
    let s = SUPER_TRIANGLE_SCALE * extent;

    [
        Point2::new(mid.x - s, mid.y - extent),
        Point2::new(mid.x, mid.y + s),
        Point2::new(mid.x + s, mid.y - extent),
    ]
}

/// Triangulate the `(x, z)` projection of `points`.
///
/// Returned triangles index into `points` and are wound so their 3D normals
/// point up (`+y`) when the points are flat. Fewer than three points produce
/// no triangles.
///
/// # Example
///
/// ```
/// use gumline::algo::triangulate::triangulate_xz;
/// use nalgebra::Point3;
///
/// let points = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 0.0, 1.0),
/// ];
/// assert_eq!(triangulate_xz(&points).len(), 1);
/// ```
pub fn triangulate_xz(points: &[Point3<f64>]) -> Vec<Triangle> {
    triangulate_xz_with_progress(points, &Progress::none())
}

/// Like [`triangulate_xz`], reporting insertion progress.
pub fn triangulate_xz_with_progress(points: &[Point3<f64>], progress: &Progress) -> Vec<Triangle> {
    if points.len() < 3 {
        return Vec::new();
    }
    let Some((min, max)) = bounding_box(points) else {
        return Vec::new();
    };

    let projected: Vec<Point2<f64>> = points.iter().map(|p| Point2::new(p.x, p.z)).collect();
    let corners = super_triangle(Point2::new(min.x, min.z), Point2::new(max.x, max.z));
    let mut triangulation = Triangulation::new(projected, corners);

    let n = points.len();
    let mut skipped = 0;
    for pid in 0..n {
        skipped += triangulation.insert(pid);
        if pid % PROGRESS_INTERVAL == 0 {
            progress.report(pid, n, "Inserting points");
        }
    }
    progress.report(n, n, "Inserting points");

    let triangles: Vec<Triangle> = triangulation
        .triangles
        .iter()
        .filter_map(|tri| {
            let a = tri[0].point_index()?;
            let b = tri[1].point_index()?;
            let c = tri[2].point_index()?;
            let (pa, pb, pc) = (
                triangulation.points[a],
                triangulation.points[b],
                triangulation.points[c],
            );
            // Clockwise in (x, z) gives a +y normal in 3D
            Some(if orient2d(&pa, &pb, &pc) > 0.0 {
                [a, c, b]
            } else {
                [a, b, c]
            })
        })
        .collect();

    if skipped > 0 {
        log::warn!("skipped {} degenerate triangles during triangulation", skipped);
    }
    log::debug!(
        "delaunay: {} points -> {} triangles",
        points.len(),
        triangles.len()
    );
    triangles
}

/// Triangulate the `(x, z)` projection of `points` into a mesh.
///
/// The mesh keeps every input point as a vertex, in input order, so triangle
/// indices refer to the caller's ordering.
pub fn delaunay_mesh(points: &[Point3<f64>]) -> TriMesh {
    delaunay_mesh_with_progress(points, &Progress::none())
}

/// Like [`delaunay_mesh`], reporting insertion progress.
pub fn delaunay_mesh_with_progress(points: &[Point3<f64>], progress: &Progress) -> TriMesh {
    let triangles = triangulate_xz_with_progress(points, progress);
    TriMesh::from_valid_parts(points.to_vec(), triangles)
}
