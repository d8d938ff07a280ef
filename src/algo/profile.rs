//! Gingival profile deformation.
//!
//! For every gingival boundary point `p` paired with a guiding-curve anchor
//! `b`, the deformer collects the mesh vertices lying roughly along the
//! segment `p → b` and rewrites their vertical coordinate with a quartic
//! falloff profile:
//!
//! ```text
//! t = |P - p| / D
//! R = t * |b - p|
//! h = -|k - height(p)|
//! y(P) = h * (R^(2α) - 1)^2 + k
//! ```
//!
//! where `D` is the search/falloff distance, `α` the falloff sharpness and
//! `k` the baseline height of the reconstructed surface. `y(P) = k` exactly
//! where `R = 1`; elsewhere the surface dips below the baseline by up to
//! `|k - height(p)|`, so deeper gum points produce deeper dips.
//!
//! # Segment walk
//!
//! Vertices "along the segment" are found without mesh connectivity, by a
//! greedy walk: from the current point, step to the unvisited vertex within
//! the search radius whose direction deviates least from the fixed `p → b`
//! direction (and by less than the angle threshold), as long as it stays
//! within `D` of `p`. The walk is a heuristic, not a geodesic; on noisy
//! meshes it may stop early or wander slightly.
//!
//! # Example
//!
//! ```
//! use gumline::algo::profile::{deform, interpolate_points, AnchorPair, ProfileOptions};
//! use nalgebra::Point3;
//!
//! // A row of vertices along +x
//! let vertices: Vec<Point3<f64>> =
//!     (1..=10).map(|i| Point3::new(i as f64 * 0.25, 0.0, 0.0)).collect();
//!
//! let pair = AnchorPair::new(Point3::origin(), Point3::new(5.0, 0.0, 0.0), 0.0);
//! let options = ProfileOptions::default().with_distance(2.0).with_alpha(1.0);
//!
//! let deformed = deform(&[pair], &vertices, &options).unwrap();
//! let dense = interpolate_points(&deformed, options.subdivisions);
//! assert!(dense.len() > deformed.len());
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};

use nalgebra::Point3;
use rayon::prelude::*;

use crate::error::{GumError, Result};

use super::inner::nearest_point;
use super::Progress;

/// Radius within which the segment walk looks for its next vertex.
pub const DEFAULT_SEARCH_RADIUS: f64 = 0.5;

/// Maximum angular deviation (radians) of a walk step from the segment.
pub const DEFAULT_ANGLE_THRESHOLD: f64 = 0.1;

/// Baseline height `k` of the reconstructed surface.
pub const BASELINE_HEIGHT: f64 = 20.0;

/// Intermediate points inserted between consecutive deformed points.
pub const DEFAULT_SUBDIVISIONS: usize = 5;

/// A gingival point, its guiding-curve anchor and the boundary height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorPair {
    /// The gum-margin sample where the walk starts.
    pub gingival: Point3<f64>,
    /// The point on the guiding curve the walk heads for.
    pub anchor: Point3<f64>,
    /// Vertical coordinate of the boundary sample.
    pub height: f64,
}

impl AnchorPair {
    /// Create a new anchor pair.
    pub fn new(gingival: Point3<f64>, anchor: Point3<f64>, height: f64) -> Self {
        Self {
            gingival,
            anchor,
            height,
        }
    }

    /// Length of the segment from the gingival point to its anchor.
    #[inline]
    pub fn span(&self) -> f64 {
        (self.anchor - self.gingival).norm()
    }
}

/// Options for the profile deformation.
#[derive(Debug, Clone)]
pub struct ProfileOptions {
    /// Search and falloff distance `D`. Must be strictly positive.
    pub distance: f64,

    /// Falloff sharpness `α`. Must be strictly positive.
    pub alpha: f64,

    /// Neighbourhood radius for each walk step.
    pub search_radius: f64,

    /// Maximum angle (radians) between a walk step and the segment direction.
    pub angle_threshold: f64,

    /// Baseline height `k`.
    pub vertical_offset: f64,

    /// Points inserted between consecutive deformed points when densifying.
    pub subdivisions: usize,

    /// Whether to walk the anchor pairs in parallel (default: true).
    pub parallel: bool,
}

impl Default for ProfileOptions {
    fn default() -> Self {
        Self {
            distance: 2.0,
            alpha: 1.0,
            search_radius: DEFAULT_SEARCH_RADIUS,
            angle_threshold: DEFAULT_ANGLE_THRESHOLD,
            vertical_offset: BASELINE_HEIGHT,
            subdivisions: DEFAULT_SUBDIVISIONS,
            parallel: true,
        }
    }
}

impl ProfileOptions {
    /// Set the search and falloff distance `D`.
    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = distance;
        self
    }

    /// Set the falloff sharpness `α`.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set the walk step radius.
    pub fn with_search_radius(mut self, radius: f64) -> Self {
        self.search_radius = radius;
        self
    }

    /// Set the walk angle threshold in radians.
    pub fn with_angle_threshold(mut self, threshold: f64) -> Self {
        self.angle_threshold = threshold;
        self
    }

    /// Set the baseline height `k`.
    pub fn with_vertical_offset(mut self, k: f64) -> Self {
        self.vertical_offset = k;
        self
    }

    /// Set the densification count.
    pub fn with_subdivisions(mut self, subdivisions: usize) -> Self {
        self.subdivisions = subdivisions;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Check that the parameters are usable.
    ///
    /// # Errors
    ///
    /// Returns [`GumError::InvalidProfileParameter`] if `distance`, `alpha`
    /// or `search_radius` is not a strictly positive finite number, or if
    /// `angle_threshold` is negative or not finite.
    pub fn validate(&self) -> Result<()> {
        positive("distance", self.distance)?;
        positive("alpha", self.alpha)?;
        positive("search_radius", self.search_radius)?;
        if !(self.angle_threshold.is_finite() && self.angle_threshold >= 0.0) {
            return Err(GumError::invalid_param(
                "angle_threshold",
                self.angle_threshold,
                "must be a non-negative angle in radians",
            ));
        }
        if !self.vertical_offset.is_finite() {
            return Err(GumError::invalid_param(
                "vertical_offset",
                self.vertical_offset,
                "must be finite",
            ));
        }
        Ok(())
    }
}

fn positive(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GumError::invalid_param(name, value, "must be strictly positive"))
    }
}

/// Evaluate the profile height at `point` for one anchor pair.
///
/// Assumes `options` has been validated. `R` is a product of lengths and
/// therefore never negative, so fractional `alpha` is well defined.
pub fn profile_height(point: &Point3<f64>, pair: &AnchorPair, options: &ProfileOptions) -> f64 {
    let k = options.vertical_offset;
    let t = (point - pair.gingival).norm() / options.distance;
    let r = t * pair.span();
    let h = -(k - pair.height).abs();

    let bump = r.powf(2.0 * options.alpha) - 1.0;
    h * bump * bump + k
}

/// Walk from `start` toward `end` and return the indices of the visited
/// vertices, in walk order.
///
/// The walk stops when no unvisited vertex qualifies for the next step, or
/// once the current point is within the search radius of `end`. Each vertex
/// is visited at most once, so the walk takes at most `vertices.len()` steps.
/// A zero-length segment has no direction and yields an empty walk.
pub fn find_vertices_on_line(
    start: &Point3<f64>,
    end: &Point3<f64>,
    vertices: &[Point3<f64>],
    options: &ProfileOptions,
) -> Vec<usize> {
    let Some(direction) = (end - start).try_normalize(f64::EPSILON) else {
        return Vec::new();
    };

    let radius = options.search_radius;
    let mut visited = vec![false; vertices.len()];
    let mut path = Vec::new();
    let mut current = *start;

    while (end - current).norm() > radius {
        let mut best: Option<(usize, f64)> = None;

        for (i, v) in vertices.iter().enumerate() {
            if visited[i] {
                continue;
            }

            let step = v - current;
            let dist = step.norm();
            if dist <= 0.0 || dist > radius {
                continue;
            }
            if (v - start).norm() > options.distance {
                continue;
            }

            let angle = step.angle(&direction);
            if angle < options.angle_threshold && best.map_or(true, |(_, a)| angle < a) {
                best = Some((i, angle));
            }
        }

        let Some((next, _)) = best else {
            break;
        };
        visited[next] = true;
        path.push(next);
        current = vertices[next];
    }

    log::trace!(
        "segment walk from {:?} toward {:?}: {} vertices",
        start,
        end,
        path.len()
    );
    path
}

/// Walk from `start` toward `end` and return the start point followed by the
/// visited vertex positions.
///
/// With no vertex near `start`, the result is just `[start]`.
pub fn find_points_on_line(
    start: &Point3<f64>,
    end: &Point3<f64>,
    vertices: &[Point3<f64>],
    options: &ProfileOptions,
) -> Vec<Point3<f64>> {
    std::iter::once(*start)
        .chain(
            find_vertices_on_line(start, end, vertices, options)
                .into_iter()
                .map(|i| vertices[i]),
        )
        .collect()
}

/// Deform the points along every anchor pair's segment.
///
/// Returns, pair after pair, the gingival point and the walked vertices with
/// their `y` replaced by [`profile_height`]. The order is the same whether or
/// not the walks run in parallel.
///
/// # Errors
///
/// Returns [`GumError::InvalidProfileParameter`] if `options` fail
/// [`ProfileOptions::validate`]; nothing is computed in that case.
pub fn deform(
    pairs: &[AnchorPair],
    vertices: &[Point3<f64>],
    options: &ProfileOptions,
) -> Result<Vec<Point3<f64>>> {
    deform_with_progress(pairs, vertices, options, &Progress::none())
}

/// Like [`deform`], reporting one step per finished anchor pair.
///
/// With parallel walks the steps arrive in completion order, but `current`
/// still counts up monotonically.
///
/// # Errors
///
/// See [`deform`].
pub fn deform_with_progress(
    pairs: &[AnchorPair],
    vertices: &[Point3<f64>],
    options: &ProfileOptions,
    progress: &Progress,
) -> Result<Vec<Point3<f64>>> {
    options.validate()?;

    let total = pairs.len();
    let done = AtomicUsize::new(0);
    let deform_pair = |pair: &AnchorPair| -> Vec<Point3<f64>> {
        let points: Vec<Point3<f64>> =
            find_points_on_line(&pair.gingival, &pair.anchor, vertices, options)
                .into_iter()
                .map(|p| Point3::new(p.x, profile_height(&p, pair, options), p.z))
                .collect();
        let current = done.fetch_add(1, Ordering::Relaxed) + 1;
        progress.report(current, total, "Deforming profiles");
        points
    };

    let per_pair: Vec<Vec<Point3<f64>>> = if options.parallel {
        pairs.par_iter().map(deform_pair).collect()
    } else {
        pairs.iter().map(deform_pair).collect()
    };

    let deformed: Vec<Point3<f64>> = per_pair.into_iter().flatten().collect();
    log::debug!(
        "deformed {} points from {} anchor pairs (D={}, alpha={})",
        deformed.len(),
        pairs.len(),
        options.distance,
        options.alpha
    );
    Ok(deformed)
}

/// Apply the profile to a copy of the whole vertex buffer.
///
/// Vertices reached by a segment walk get the profile height of that walk's
/// pair (a later pair wins when walks overlap); all other vertices are
/// returned unchanged.
///
/// # Errors
///
/// Returns [`GumError::InvalidProfileParameter`] if `options` fail
/// [`ProfileOptions::validate`].
pub fn deform_vertices(
    pairs: &[AnchorPair],
    vertices: &[Point3<f64>],
    options: &ProfileOptions,
) -> Result<Vec<Point3<f64>>> {
    options.validate()?;

    let walk = |pair: &AnchorPair| find_vertices_on_line(&pair.gingival, &pair.anchor, vertices, options);
    let walks: Vec<Vec<usize>> = if options.parallel {
        pairs.par_iter().map(walk).collect()
    } else {
        pairs.iter().map(walk).collect()
    };

    let mut result = vertices.to_vec();
    for (pair, path) in pairs.iter().zip(&walks) {
        for &i in path {
            result[i].y = profile_height(&vertices[i], pair, options);
        }
    }
    Ok(result)
}

/// Sort points by `x` and insert `subdivisions` evenly spaced points between
/// each consecutive pair.
///
/// All input points are kept, so the result has
/// `n + (n - 1) * subdivisions` points and stays ordered by `x`. This is an
/// ordering along `x` only; points whose `x` coincide but differ in `y`/`z`
/// are not ordered along the true surface.
pub fn interpolate_points(points: &[Point3<f64>], subdivisions: usize) -> Vec<Point3<f64>> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x));

    let steps = (subdivisions + 1) as f64;
    let mut dense = Vec::with_capacity(sorted.len() + sorted.len().saturating_sub(1) * subdivisions);

    for pair in sorted.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        dense.push(a);
        for j in 1..=subdivisions {
            dense.push(a + (b - a) * (j as f64 / steps));
        }
    }
    if let Some(&last) = sorted.last() {
        dense.push(last);
    }

    dense
}

/// Deform the anchor pairs' segments and densify the result.
///
/// # Errors
///
/// See [`deform`].
pub fn deform_and_densify(
    pairs: &[AnchorPair],
    vertices: &[Point3<f64>],
    options: &ProfileOptions,
) -> Result<Vec<Point3<f64>>> {
    let deformed = deform(pairs, vertices, options)?;
    Ok(interpolate_points(&deformed, options.subdivisions))
}

/// Pair each gingival point with the nearest sample of a guiding curve.
///
/// `heights` runs parallel to `gingival`.
///
/// # Errors
///
/// Returns [`GumError::MismatchedLengths`] if the two lists differ in length,
/// or [`GumError::InsufficientSamplePoints`] if `curve` is empty.
pub fn pair_with_curve(
    gingival: &[Point3<f64>],
    heights: &[f64],
    curve: &[Point3<f64>],
) -> Result<Vec<AnchorPair>> {
    if gingival.len() != heights.len() {
        return Err(GumError::MismatchedLengths {
            points: gingival.len(),
            heights: heights.len(),
        });
    }

    gingival
        .iter()
        .zip(heights)
        .map(|(p, &height)| {
            let anchor = nearest_point(p, curve).ok_or(GumError::InsufficientSamplePoints {
                required: 1,
                found: 0,
            })?;
            Ok(AnchorPair::new(*p, anchor, height))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Flat `n x n` grid in the xz-plane at height `y`.
    fn create_grid(n: usize, spacing: f64, y: f64) -> Vec<Point3<f64>> {
        let mut vertices = Vec::with_capacity(n * n);
        for j in 0..n {
            for i in 0..n {
                vertices.push(Point3::new(i as f64 * spacing, y, j as f64 * spacing));
            }
        }
        vertices
    }

    #[test]
    fn test_validate_rejects_non_positive() {
        assert!(ProfileOptions::default().validate().is_ok());

        for options in [
            ProfileOptions::default().with_distance(0.0),
            ProfileOptions::default().with_distance(-1.0),
            ProfileOptions::default().with_alpha(0.0),
            ProfileOptions::default().with_alpha(f64::NAN),
        ] {
            let err = options.validate().unwrap_err();
            assert!(matches!(err, GumError::InvalidProfileParameter { .. }));
        }
    }

    #[test]
    fn test_deform_aborts_on_invalid_parameters() {
        let pair = AnchorPair::new(Point3::origin(), Point3::new(1.0, 0.0, 0.0), 0.0);
        let options = ProfileOptions::default().with_alpha(-2.0);

        assert!(deform(&[pair], &[], &options).is_err());
        assert!(deform_vertices(&[pair], &[], &options).is_err());
    }

    #[test]
    fn test_profile_equals_baseline_at_unit_radius() {
        // |b - p| = 4 and D = 2, so R = 1 at distance 0.5 from p
        let pair = AnchorPair::new(Point3::origin(), Point3::new(4.0, 0.0, 0.0), 7.0);
        let options = ProfileOptions::default().with_distance(2.0).with_alpha(1.5);

        let y = profile_height(&Point3::new(0.5, 0.0, 0.0), &pair, &options);
        assert_eq!(y, BASELINE_HEIGHT);
    }

    #[test]
    fn test_profile_depth_at_gingival_point() {
        let pair = AnchorPair::new(Point3::origin(), Point3::new(4.0, 0.0, 0.0), 12.0);
        let options = ProfileOptions::default();

        // R = 0 gives the full dip h = -|20 - 12|
        let y = profile_height(&Point3::origin(), &pair, &options);
        assert!((y - 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_profile_symmetric_in_bump_sign() {
        let pair = AnchorPair::new(Point3::origin(), Point3::new(1.0, 0.0, 0.0), 0.0);
        let options = ProfileOptions::default().with_distance(1.0).with_alpha(0.5);

        // alpha = 0.5 makes R^(2 alpha) = R, so R = 0.5 and R = 1.5 mirror around 1
        let below = profile_height(&Point3::new(0.5, 0.0, 0.0), &pair, &options);
        let above = profile_height(&Point3::new(1.5, 0.0, 0.0), &pair, &options);
        assert!((below - above).abs() < 1e-12);
        assert!(below < BASELINE_HEIGHT);
    }

    #[test]
    fn test_walk_follows_segment_within_distance() {
        let vertices = create_grid(10, 0.25, 0.0);
        let options = ProfileOptions::default().with_distance(1.0);

        let start = Point3::new(0.0, 0.0, 0.5);
        let end = Point3::new(5.0, 0.0, 0.5);
        let path = find_vertices_on_line(&start, &end, &vertices, &options);

        let xs: Vec<f64> = path.iter().map(|&i| vertices[i].x).collect();
        assert_eq!(xs, vec![0.25, 0.5, 0.75, 1.0]);
        for &i in &path {
            assert_eq!(vertices[i].z, 0.5);
        }
    }

    #[test]
    fn test_walk_without_neighbours_returns_start() {
        let vertices = vec![Point3::new(100.0, 0.0, 0.0)];
        let start = Point3::new(0.0, 0.0, 0.0);
        let end = Point3::new(3.0, 0.0, 0.0);

        let points = find_points_on_line(&start, &end, &vertices, &ProfileOptions::default());
        assert_eq!(points, vec![start]);
    }

    #[test]
    fn test_walk_stops_near_end() {
        let vertices: Vec<Point3<f64>> =
            (1..=20).map(|i| Point3::new(i as f64 * 0.2, 0.0, 0.0)).collect();
        let options = ProfileOptions::default().with_distance(100.0);

        let end = Point3::new(1.0, 0.0, 0.0);
        let path = find_vertices_on_line(&Point3::origin(), &end, &vertices, &options);

        let last = vertices[*path.last().unwrap()];
        assert!((end - last).norm() <= options.search_radius);
        assert!(path.len() < vertices.len());
    }

    #[test]
    fn test_walk_bounded_by_vertex_count() {
        // Dense noisy cloud around the segment
        let mut vertices = Vec::new();
        for i in 0..200 {
            let x = i as f64 * 0.05;
            let jitter = ((i * 7919) % 13) as f64 * 0.001;
            vertices.push(Point3::new(x, 0.0, jitter));
            vertices.push(Point3::new(x, 0.0, -jitter));
        }
        let options = ProfileOptions::default().with_distance(50.0);

        let path = find_vertices_on_line(
            &Point3::origin(),
            &Point3::new(20.0, 0.0, 0.0),
            &vertices,
            &options,
        );
        assert!(path.len() <= vertices.len());

        let mut unique = path.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), path.len());
    }

    #[test]
    fn test_degenerate_segment_walks_nowhere() {
        let vertices = create_grid(4, 0.25, 0.0);
        let p = Point3::new(0.25, 0.0, 0.25);
        assert!(find_vertices_on_line(&p, &p, &vertices, &ProfileOptions::default()).is_empty());
    }

    #[test]
    fn test_deform_vertices_leaves_far_points_untouched() {
        let vertices = create_grid(10, 0.25, 0.0);
        let pair = AnchorPair::new(Point3::new(0.0, 0.0, 1.0), Point3::new(5.0, 0.0, 1.0), 0.0);
        let options = ProfileOptions::default().with_distance(1.0).with_alpha(1.0);

        let deformed = deform_vertices(&[pair], &vertices, &options).unwrap();
        assert_eq!(deformed.len(), vertices.len());

        let mut touched = 0;
        for (before, after) in vertices.iter().zip(&deformed) {
            assert_eq!((before.x, before.z), (after.x, after.z));
            if (before - pair.gingival).norm() > options.distance || before.z != 1.0 {
                assert_eq!(before.y, after.y);
            } else if before.x > 0.0 {
                touched += 1;
                assert!(after.y < BASELINE_HEIGHT);
                assert_ne!(after.y, before.y);
            }
        }
        assert_eq!(touched, 4);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let vertices = create_grid(12, 0.25, 0.0);
        let pairs: Vec<AnchorPair> = (0..12)
            .map(|j| {
                let z = j as f64 * 0.25;
                AnchorPair::new(Point3::new(0.0, 0.0, z), Point3::new(6.0, 0.0, z), j as f64)
            })
            .collect();
        let options = ProfileOptions::default().with_distance(1.5);

        let parallel = deform(&pairs, &vertices, &options).unwrap();
        let sequential = deform(&pairs, &vertices, &options.clone().sequential()).unwrap();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_interpolate_points_counts_and_order() {
        let points = vec![
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
        ];
        let dense = interpolate_points(&points, 5);

        assert_eq!(dense.len(), 3 + 2 * 5);
        assert_eq!(dense[0], Point3::new(0.0, 1.0, 0.0));
        assert_eq!(dense[6], Point3::new(1.0, 2.0, 0.0));
        assert_eq!(dense[12], Point3::new(2.0, 0.0, 0.0));
        assert!(dense.windows(2).all(|w| w[0].x <= w[1].x));

        // Midpoint of the first interval
        assert!((dense[3] - Point3::new(0.5, 1.5, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_interpolate_points_small_inputs() {
        assert!(interpolate_points(&[], 5).is_empty());
        let single = vec![Point3::new(1.0, 2.0, 3.0)];
        assert_eq!(interpolate_points(&single, 5), single);
        let two = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        assert_eq!(interpolate_points(&two, 0), two);
    }

    #[test]
    fn test_pair_with_curve() {
        let curve = vec![
            Point3::new(0.0, 5.0, 0.0),
            Point3::new(10.0, 5.0, 0.0),
        ];
        let gingival = vec![Point3::new(1.0, 0.0, 0.0), Point3::new(9.0, 0.0, 0.0)];

        let pairs = pair_with_curve(&gingival, &[3.0, 4.0], &curve).unwrap();
        assert_eq!(pairs[0].anchor, curve[0]);
        assert_eq!(pairs[1].anchor, curve[1]);
        assert_eq!(pairs[1].height, 4.0);

        assert_eq!(
            pair_with_curve(&gingival, &[1.0], &curve).unwrap_err(),
            GumError::MismatchedLengths {
                points: 2,
                heights: 1
            }
        );
        assert!(pair_with_curve(&gingival, &[1.0, 2.0], &[]).is_err());
    }
}
