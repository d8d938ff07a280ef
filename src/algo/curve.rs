//! Guiding curve construction.
//!
//! This module fits an open Catmull-Rom spline through ordered anchor points
//! and derives laterally offset curves from its samples.
//!
//! # Parameterization
//!
//! The curve parameter `t ∈ [0, 1]` is spread uniformly over the segments:
//! with `n` anchors, segment `i` covers `[i / (n - 1), (i + 1) / (n - 1)]`.
//! This is *not* an arc-length parameterization, so samples are denser where
//! anchors are close together.
//!
//! The end segments use phantom anchors mirrored through the first and last
//! anchor (`2 * p0 - p1` and `2 * pn - pn-1`), so the curve passes through
//! every anchor including both ends.
//!
//! # Example
//!
//! ```
//! use gumline::algo::curve::{create_offset_curve, CatmullRomCurve};
//! use nalgebra::Point3;
//!
//! let anchors = vec![
//!     Point3::new(-10.0, 0.0, 0.0),
//!     Point3::new(0.0, 0.0, 8.0),
//!     Point3::new(10.0, 0.0, 0.0),
//! ];
//! let curve = CatmullRomCurve::new(&anchors, 0.0).unwrap();
//!
//! let samples = curve.points(100);
//! assert_eq!(samples.len(), 101);
//! assert_eq!(samples[0], anchors[0]);
//!
//! let outer = create_offset_curve(&samples, 2.0);
//! assert_eq!(outer.len(), samples.len());
//! ```

use nalgebra::{Point3, Vector3};

use crate::error::{GumError, Result};

/// Tension of the Catmull-Rom tangents.
pub const TENSION: f64 = 0.5;

/// Sample count used when deriving the offset curve.
pub const OFFSET_SAMPLES: usize = 500;

/// Sample count used when previewing a curve.
pub const DISPLAY_SAMPLES: usize = 100;

/// An open Catmull-Rom spline through ordered anchors.
#[derive(Debug, Clone, PartialEq)]
pub struct CatmullRomCurve {
    anchors: Vec<Point3<f64>>,
    tension: f64,
}

impl CatmullRomCurve {
    /// Fit a curve through `anchors`, lifting every anchor by `y_offset`.
    ///
    /// The offset lets a caller preview the curve at a different elevation
    /// without touching the anchors themselves.
    ///
    /// # Errors
    ///
    /// Returns [`GumError::InsufficientSamplePoints`] if fewer than two anchors
    /// are given.
    pub fn new(anchors: &[Point3<f64>], y_offset: f64) -> Result<Self> {
        if anchors.len() < 2 {
            return Err(GumError::InsufficientSamplePoints {
                required: 2,
                found: anchors.len(),
            });
        }

        let anchors = anchors
            .iter()
            .map(|p| Point3::new(p.x, p.y + y_offset, p.z))
            .collect();

        Ok(Self {
            anchors,
            tension: TENSION,
        })
    }

    /// The (lifted) anchors the curve interpolates, in order.
    #[inline]
    pub fn anchors(&self) -> &[Point3<f64>] {
        &self.anchors
    }

    /// Number of cubic segments.
    #[inline]
    pub fn num_segments(&self) -> usize {
        self.anchors.len() - 1
    }

    /// Evaluate the curve at parameter `t`, clamped to `[0, 1]`.
    pub fn point_at(&self, t: f64) -> Point3<f64> {
        let t = t.clamp(0.0, 1.0);
        let last = self.anchors.len() - 1;

        if t <= 0.0 {
            return self.anchors[0];
        }
        if t >= 1.0 {
            return self.anchors[last];
        }

        let scaled = last as f64 * t;
        let segment = (scaled.floor() as usize).min(last - 1);
        let weight = scaled - segment as f64;

        let p1 = self.anchors[segment];
        let p2 = self.anchors[segment + 1];
        let p0 = if segment == 0 {
            p1 + (p1 - p2)
        } else {
            self.anchors[segment - 1]
        };
        let p3 = if segment + 2 > last {
            p2 + (p2 - p1)
        } else {
            self.anchors[segment + 2]
        };

        Point3::new(
            self.cubic(p0.x, p1.x, p2.x, p3.x, weight),
            self.cubic(p0.y, p1.y, p2.y, p3.y, weight),
            self.cubic(p0.z, p1.z, p2.z, p3.z, weight),
        )
    }

    /// Sample the curve at `divisions + 1` evenly spaced parameters.
    ///
    /// The first and last sample are exactly the first and last anchor.
    /// A request for zero divisions yields just the first anchor.
    pub fn points(&self, divisions: usize) -> Vec<Point3<f64>> {
        if divisions == 0 {
            return vec![self.anchors[0]];
        }

        (0..=divisions)
            .map(|d| self.point_at(d as f64 / divisions as f64))
            .collect()
    }

    /// Hermite form of one coordinate of a Catmull-Rom segment.
    #[inline]
    fn cubic(&self, x0: f64, x1: f64, x2: f64, x3: f64, t: f64) -> f64 {
        let t0 = self.tension * (x2 - x0);
        let t1 = self.tension * (x3 - x1);

        let c0 = x1;
        let c1 = t0;
        let c2 = -3.0 * x1 + 3.0 * x2 - 2.0 * t0 - t1;
        let c3 = 2.0 * x1 - 2.0 * x2 + t0 + t1;

        let t2 = t * t;
        c0 + c1 * t + c2 * t2 + c3 * t2 * t
    }
}

/// Displace every sample sideways by `offset` in the horizontal plane.
///
/// The tangent at sample `i` is the difference of its neighbours `i + 1` and
/// `i - 1`, where a missing neighbour at either end is replaced by the sample
/// itself. The tangent is projected onto the `xz`-plane and rotated by 90°,
/// giving the normal `(-t.z, 0, t.x)`. Positive offsets move to the left of
/// the walking direction when looking down the `y` axis.
///
/// A sample whose horizontal tangent vanishes is passed through unchanged.
pub fn create_offset_curve(points: &[Point3<f64>], offset: f64) -> Vec<Point3<f64>> {
    (0..points.len())
        .map(|i| {
            let current = points[i];
            let next = points.get(i + 1).copied().unwrap_or(current);
            let prev = if i > 0 { points[i - 1] } else { current };

            let delta = next - prev;
            match Vector3::new(delta.x, 0.0, delta.z).try_normalize(f64::EPSILON) {
                Some(tangent) => {
                    let normal = Vector3::new(-tangent.z, 0.0, tangent.x);
                    current + normal * offset
                }
                None => current,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_arch_anchors() -> Vec<Point3<f64>> {
        vec![
            Point3::new(-12.0, 1.0, 0.0),
            Point3::new(-9.0, 1.5, 6.0),
            Point3::new(0.0, 2.0, 9.0),
            Point3::new(9.0, 1.5, 6.0),
            Point3::new(12.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_requires_two_anchors() {
        let err = CatmullRomCurve::new(&[Point3::origin()], 0.0).unwrap_err();
        assert_eq!(
            err,
            GumError::InsufficientSamplePoints {
                required: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_endpoints_interpolated_exactly() {
        let anchors = create_arch_anchors();
        let curve = CatmullRomCurve::new(&anchors, 0.0).unwrap();

        for n in [7, 14, 100, 200] {
            let samples = curve.points(n);
            assert_eq!(samples.len(), n + 1);
            assert_eq!(samples[0], anchors[0]);
            assert_eq!(samples[n], anchors[4]);
        }
    }

    #[test]
    fn test_passes_through_interior_anchors() {
        let anchors = create_arch_anchors();
        let curve = CatmullRomCurve::new(&anchors, 0.0).unwrap();

        // With 4 segments, t = i / 4 lands exactly on anchor i
        for (i, anchor) in anchors.iter().enumerate() {
            let p = curve.point_at(i as f64 / 4.0);
            assert!((p - anchor).norm() < 1e-12, "anchor {} missed: {:?}", i, p);
        }
    }

    #[test]
    fn test_resampling_is_deterministic() {
        let curve = CatmullRomCurve::new(&create_arch_anchors(), 0.0).unwrap();
        assert_eq!(curve.points(50), curve.points(50));

        let coarse = curve.points(50);
        let fine = curve.points(100);
        for (i, p) in coarse.iter().enumerate() {
            assert!((p - fine[2 * i]).norm() < 1e-12);
        }
    }

    #[test]
    fn test_y_offset_lifts_curve() {
        let anchors = create_arch_anchors();
        let base = CatmullRomCurve::new(&anchors, 0.0).unwrap();
        let lifted = CatmullRomCurve::new(&anchors, 3.0).unwrap();

        for (a, b) in base.points(40).iter().zip(lifted.points(40)) {
            assert!((b.y - a.y - 3.0).abs() < 1e-12);
            assert!((b.x - a.x).abs() < 1e-12);
            assert!((b.z - a.z).abs() < 1e-12);
        }
    }

    #[test]
    fn test_two_anchor_curve_is_straight() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(10.0, 0.0, 0.0);
        let curve = CatmullRomCurve::new(&[a, b], 0.0).unwrap();

        for p in curve.points(20) {
            assert!(p.y.abs() < 1e-12 && p.z.abs() < 1e-12);
            assert!(p.x >= -1e-12 && p.x <= 10.0 + 1e-12);
        }
        assert!((curve.point_at(0.5) - Point3::new(5.0, 0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_offset_of_straight_line_is_exact() {
        let line: Vec<Point3<f64>> = (0..=20)
            .map(|i| Point3::new(i as f64 * 0.5, 2.0, i as f64 * 0.25))
            .collect();

        let offset = 1.5;
        let shifted = create_offset_curve(&line, offset);
        assert_eq!(shifted.len(), line.len());

        let direction = (line[20] - line[0]).normalize();
        for (p, q) in line.iter().zip(&shifted) {
            let d = q - p;
            assert!((d.norm() - offset).abs() < 1e-12);
            assert!(d.dot(&direction).abs() < 1e-12);
            assert_eq!(q.y, p.y);
        }
    }

    #[test]
    fn test_offset_side() {
        // Walking along +x, the normal (-t.z, 0, t.x) points along +z
        let line = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        let shifted = create_offset_curve(&line, 2.0);
        assert_eq!(shifted[0], Point3::new(0.0, 0.0, 2.0));
        assert_eq!(shifted[1], Point3::new(1.0, 0.0, 2.0));
    }

    #[test]
    fn test_offset_degenerate_samples() {
        assert!(create_offset_curve(&[], 1.0).is_empty());

        let single = vec![Point3::new(1.0, 2.0, 3.0)];
        assert_eq!(create_offset_curve(&single, 5.0), single);

        let vertical = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 4.0, 0.0)];
        assert_eq!(create_offset_curve(&vertical, 5.0), vertical);
    }
}
