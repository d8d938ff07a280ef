//! Control point extraction from a sampled arch boundary.
//!
//! The guiding curve of the reconstruction passes through five landmarks of
//! the boundary point cloud, ordered across the arch from `-x` to `+x`:
//!
//! 1. `min_x` - the leftmost sample, dropped to the lowest `z` of the cloud
//! 2. `max_dist_minus` - the sample on the `-x` side farthest from the line
//!    `top_centroid`-`min_x`
//! 3. `top_centroid` - the mean of the 10 samples with the largest `z`
//! 4. `max_dist_plus` - the sample on the `+x` side farthest from the line
//!    `top_centroid`-`max_x`
//! 5. `max_x` - the rightmost sample, dropped to the lowest `z` of the cloud
//!
//! Lowering both ends to the global minimum `z` keeps the guiding curve below
//! every cloud point, so the reconstructed surface envelops the anatomy.
//!
//! # Example
//!
//! ```
//! use gumline::algo::anchors::find_control_points;
//! use nalgebra::Point3;
//!
//! // A coarse horseshoe in the xz-plane
//! let cloud: Vec<Point3<f64>> = (0..=20)
//!     .map(|i| {
//!         let theta = std::f64::consts::PI * i as f64 / 20.0;
//!         Point3::new(-10.0 * theta.cos(), 0.0, 10.0 * theta.sin())
//!     })
//!     .collect();
//!
//! let anchors = find_control_points(&cloud).unwrap();
//! assert_eq!(anchors.as_slice().len(), 5);
//! assert_eq!(anchors.min_x().z, anchors.max_x().z);
//! ```

use nalgebra::{Point3, Vector3};

use crate::error::{GumError, Result};

/// Number of landmarks in a [`ControlPointSet`].
pub const CONTROL_POINT_COUNT: usize = 5;

/// Number of highest-`z` samples averaged into the top centroid.
pub const TOP_SAMPLE_COUNT: usize = 10;

/// The five ordered landmarks summarizing an arch boundary.
///
/// Order is significant: it defines the traversal direction of the curve
/// fitted through the points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlPointSet {
    points: [Point3<f64>; CONTROL_POINT_COUNT],
}

impl ControlPointSet {
    /// Build a control point set from an ordered list.
    ///
    /// # Errors
    ///
    /// Returns [`GumError::InvalidControlPointCount`] unless exactly five
    /// points are given.
    pub fn new(points: &[Point3<f64>]) -> Result<Self> {
        let points: [Point3<f64>; CONTROL_POINT_COUNT] = points
            .try_into()
            .map_err(|_| GumError::InvalidControlPointCount {
                found: points.len(),
            })?;
        Ok(Self { points })
    }

    /// The leftmost landmark.
    #[inline]
    pub fn min_x(&self) -> Point3<f64> {
        self.points[0]
    }

    /// The farthest sample from the left flank line.
    #[inline]
    pub fn max_dist_minus(&self) -> Point3<f64> {
        self.points[1]
    }

    /// The averaged top of the ridge.
    #[inline]
    pub fn top_centroid(&self) -> Point3<f64> {
        self.points[2]
    }

    /// The farthest sample from the right flank line.
    #[inline]
    pub fn max_dist_plus(&self) -> Point3<f64> {
        self.points[3]
    }

    /// The rightmost landmark.
    #[inline]
    pub fn max_x(&self) -> Point3<f64> {
        self.points[4]
    }

    /// All five landmarks in curve order.
    #[inline]
    pub fn as_slice(&self) -> &[Point3<f64>] {
        &self.points
    }
}

/// Find the five control points of a boundary point cloud.
///
/// # Errors
///
/// Returns [`GumError::InsufficientSamplePoints`] if the cloud has fewer than
/// [`TOP_SAMPLE_COUNT`] points (this includes the empty cloud).
pub fn find_control_points(cloud: &[Point3<f64>]) -> Result<ControlPointSet> {
    if cloud.len() < TOP_SAMPLE_COUNT {
        return Err(GumError::InsufficientSamplePoints {
            required: TOP_SAMPLE_COUNT,
            found: cloud.len(),
        });
    }

    let min_z = cloud.iter().map(|p| p.z).fold(f64::INFINITY, f64::min);

    let leftmost = first_extreme(cloud, |candidate, best| candidate.x < best.x);
    let rightmost = first_extreme(cloud, |candidate, best| candidate.x > best.x);
    let min_x = Point3::new(leftmost.x, leftmost.y, min_z);
    let max_x = Point3::new(rightmost.x, rightmost.y, min_z);

    let top_centroid = top_centroid(cloud, TOP_SAMPLE_COUNT)?;

    let max_dist_minus = find_max_distance_point(&top_centroid, &min_x, cloud);
    let max_dist_plus = find_max_distance_point(&top_centroid, &max_x, cloud);

    log::debug!(
        "control points: min_x={:?} minus={:?} top={:?} plus={:?} max_x={:?}",
        min_x,
        max_dist_minus,
        top_centroid,
        max_dist_plus,
        max_x
    );

    ControlPointSet::new(&[min_x, max_dist_minus, top_centroid, max_dist_plus, max_x])
}

/// Mean of the `count` points with the largest `z`.
///
/// # Errors
///
/// Returns [`GumError::InsufficientSamplePoints`] if the cloud has fewer than
/// `count` points or `count` is zero.
pub fn top_centroid(cloud: &[Point3<f64>], count: usize) -> Result<Point3<f64>> {
    if count == 0 || cloud.len() < count {
        return Err(GumError::InsufficientSamplePoints {
            required: count.max(1),
            found: cloud.len(),
        });
    }

    let mut by_height: Vec<&Point3<f64>> = cloud.iter().collect();
    by_height.sort_by(|a, b| b.z.total_cmp(&a.z));

    let sum: Vector3<f64> = by_height[..count].iter().map(|p| p.coords).sum();
    Ok(Point3::from(sum / count as f64))
}

/// Find the cloud point farthest from the line through `top` and `side`.
///
/// Only points on the same side of `x = 0` as `side` are considered: those
/// with negative `x` when `side.x < 0`, otherwise those with positive `x`.
/// If no point qualifies, the first cloud point is returned.
///
/// # Panics
///
/// Panics if `cloud` is empty.
pub fn find_max_distance_point(
    top: &Point3<f64>,
    side: &Point3<f64>,
    cloud: &[Point3<f64>],
) -> Point3<f64> {
    let direction = (top - side).try_normalize(f64::EPSILON);
    let left = side.x < 0.0;

    let mut max_distance = 0.0;
    let mut best = cloud[0];

    for p in cloud.iter().filter(|p| if left { p.x < 0.0 } else { p.x > 0.0 }) {
        let distance = distance_to_line(p, side, direction.as_ref());
        if distance > max_distance {
            max_distance = distance;
            best = *p;
        }
    }

    best
}

/// Distance from `p` to its projection on the line `origin + s * direction`.
///
/// A missing direction (coincident line points) degenerates to the distance
/// to `origin`.
fn distance_to_line(
    p: &Point3<f64>,
    origin: &Point3<f64>,
    direction: Option<&Vector3<f64>>,
) -> f64 {
    let v = p - origin;
    match direction {
        Some(d) => {
            let projection = origin + d * v.dot(d);
            (p - projection).norm()
        }
        None => v.norm(),
    }
}

/// The first point for which no later point is strictly `better`.
fn first_extreme<F>(cloud: &[Point3<f64>], better: F) -> Point3<f64>
where
    F: Fn(&Point3<f64>, &Point3<f64>) -> bool,
{
    cloud
        .iter()
        .skip(1)
        .fold(cloud[0], |best, p| if better(p, &best) { *p } else { best })
}
