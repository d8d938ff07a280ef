//! Inner surface point generation.
//!
//! The flat band between the guiding curve and its outer offset is filled
//! with evenly spaced points at the baseline height, ready for planar
//! triangulation.

use nalgebra::Point3;

use super::profile::BASELINE_HEIGHT;

/// Points generated on each inner-to-outer segment.
pub const DEFAULT_POINTS_PER_LINE: usize = 30;

/// Find the point of `candidates` closest to `p`.
///
/// Ties keep the earliest candidate. Returns `None` if `candidates` is empty.
pub fn nearest_point(p: &Point3<f64>, candidates: &[Point3<f64>]) -> Option<Point3<f64>> {
    let mut best: Option<(Point3<f64>, f64)> = None;
    for c in candidates {
        let d = (c - p).norm_squared();
        if best.map_or(true, |(_, bd)| d < bd) {
            best = Some((*c, d));
        }
    }
    best.map(|(c, _)| c)
}

/// Fill the band between two curves with points at the baseline height.
///
/// For every inner curve sample, the nearest outer curve sample is found and
/// `points_per_line - 1` points are placed at fractions `i / points_per_line`
/// (`i = 1 .. points_per_line`) of the way between them. Both samples
/// themselves are excluded. Every generated point has `y = 20`.
///
/// Returns an empty list if either curve is empty or `points_per_line < 2`.
pub fn generate_inner_points(
    inner: &[Point3<f64>],
    outer: &[Point3<f64>],
    points_per_line: usize,
) -> Vec<Point3<f64>> {
    generate_inner_points_at(inner, outer, points_per_line, BASELINE_HEIGHT)
}

/// Like [`generate_inner_points`] with an explicit height.
pub fn generate_inner_points_at(
    inner: &[Point3<f64>],
    outer: &[Point3<f64>],
    points_per_line: usize,
    height: f64,
) -> Vec<Point3<f64>> {
    if points_per_line < 2 {
        return Vec::new();
    }

    let mut points = Vec::with_capacity(inner.len() * (points_per_line - 1));
    for p in inner {
        let Some(target) = nearest_point(p, outer) else {
            break;
        };

        let span = target - p;
        for i in 1..points_per_line {
            let ratio = i as f64 / points_per_line as f64;
            let mut q = p + span * ratio;
            q.y = height;
            points.push(q);
        }
    }

    log::debug!(
        "generated {} inner surface points from {} curve samples",
        points.len(),
        inner.len()
    );
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_point() {
        let candidates = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        assert_eq!(
            nearest_point(&Point3::new(1.9, 1.0, 0.0), &candidates),
            Some(Point3::new(2.0, 0.0, 0.0))
        );
        assert_eq!(nearest_point(&Point3::origin(), &[]), None);
    }

    #[test]
    fn test_inner_points_between_parallel_lines() {
        let inner: Vec<Point3<f64>> = (0..5).map(|i| Point3::new(i as f64, 3.0, 0.0)).collect();
        let outer: Vec<Point3<f64>> = (0..5).map(|i| Point3::new(i as f64, 3.0, 3.0)).collect();

        let points = generate_inner_points(&inner, &outer, DEFAULT_POINTS_PER_LINE);
        assert_eq!(points.len(), 5 * 29);

        for (k, p) in points.iter().enumerate() {
            let line = k / 29;
            let i = k % 29 + 1;
            assert_eq!(p.y, BASELINE_HEIGHT);
            assert!((p.x - line as f64).abs() < 1e-12);
            assert!((p.z - 3.0 * i as f64 / 30.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_inner_points_degenerate_inputs() {
        let line = vec![Point3::new(0.0, 0.0, 0.0)];
        assert!(generate_inner_points(&line, &[], 30).is_empty());
        assert!(generate_inner_points(&[], &line, 30).is_empty());
        assert!(generate_inner_points(&line, &line, 1).is_empty());
    }
}
