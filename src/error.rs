//! Error types for gumline.
//!
//! This module defines all error types used throughout the library.
//!
//! Parameter and input validation errors abort a reconstruction pass before
//! any output is produced. Geometric degeneracies met while triangulating
//! (collinear triples, duplicate points) are skipped locally and never
//! surface here.

use thiserror::Error;

/// Result type alias using [`GumError`].
pub type Result<T> = std::result::Result<T, GumError>;

/// Errors that can occur while reconstructing a gum surface.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GumError {
    /// A control point set was built from the wrong number of points.
    #[error("expected exactly 5 control points, got {found}")]
    InvalidControlPointCount {
        /// Number of points supplied.
        found: usize,
    },

    /// The input cloud is too small for the requested statistic.
    #[error("insufficient sample points: need at least {required}, got {found}")]
    InsufficientSamplePoints {
        /// Minimum number of points the operation needs.
        required: usize,
        /// Number of points supplied.
        found: usize,
    },

    /// A profile parameter is out of range.
    #[error("invalid profile parameter: {name} = {value} ({reason})")]
    InvalidProfileParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },

    /// Convex hull meshing needs at least four points.
    #[error("convex hull needs at least 4 points, got {found}")]
    InsufficientPointsForHull {
        /// Number of points supplied.
        found: usize,
    },

    /// All hull input points are coplanar, collinear or coincident.
    #[error("convex hull input has no volume (points are coplanar)")]
    DegenerateHull,

    /// A triangle references a vertex outside the vertex buffer.
    #[error("triangle {triangle} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The triangle index.
        triangle: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// Gingival points and their heights are not parallel lists.
    #[error("got {points} gingival points but {heights} heights")]
    MismatchedLengths {
        /// Number of gingival points.
        points: usize,
        /// Number of height values.
        heights: usize,
    },
}

impl GumError {
    /// Create an invalid profile parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        GumError::InvalidProfileParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Returns `true` for errors caused by caller-supplied parameters rather
    /// than by the shape of the input data.
    pub fn is_parameter_error(&self) -> bool {
        matches!(self, GumError::InvalidProfileParameter { .. })
    }
}
