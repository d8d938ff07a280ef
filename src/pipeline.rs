//! End-to-end gum surface reconstruction.
//!
//! [`reconstruct`] chains the algorithm stages in a single pass:
//!
//! 1. Control points from the boundary point cloud
//! 2. Guiding curve through them, sampled for preview and for offsetting
//! 3. Outer curve at a lateral offset from the guiding curve
//! 4. Gingival points paired with their nearest outer curve sample, then
//!    deformed and densified along the mesh vertices
//! 5. Closed gum cap: convex hull of the densified points
//! 6. Flat base: Delaunay triangulation of the band between the two curves
//!
//! Options are validated before any stage runs, so a run either produces
//! every output or none.
//!
//! # Example
//!
//! ```
//! use gumline::pipeline::{reconstruct, ReconstructionInput, ReconstructionOptions};
//! use nalgebra::Point3;
//!
//! // Boundary samples on a half circle opening toward -z
//! let boundary: Vec<Point3<f64>> = (0..=40)
//!     .map(|i| {
//!         let a = std::f64::consts::PI * i as f64 / 40.0;
//!         Point3::new(-20.0 * a.cos(), 0.0, 20.0 * a.sin())
//!     })
//!     .collect();
//!
//! let input = ReconstructionInput::new(&boundary, &[], &[], &[]);
//! let options = ReconstructionOptions::default();
//!
//! // Without gingival points there is nothing to deform
//! assert!(reconstruct(&input, &options).is_err());
//! ```

use nalgebra::Point3;

use crate::algo::anchors::{find_control_points, ControlPointSet};
use crate::algo::curve::{create_offset_curve, CatmullRomCurve, DISPLAY_SAMPLES, OFFSET_SAMPLES};
use crate::algo::inner::{generate_inner_points_at, DEFAULT_POINTS_PER_LINE};
use crate::algo::profile::{deform_with_progress, interpolate_points, pair_with_curve, ProfileOptions};
use crate::algo::triangulate::{convex_hull_mesh, delaunay_mesh_with_progress};
use crate::algo::Progress;
use crate::error::{GumError, Result};
use crate::mesh::TriMesh;

/// Lateral distance between the guiding curve and the outer curve.
pub const DEFAULT_LATERAL_OFFSET: f64 = 5.0;

/// Number of reported pipeline stages.
const STAGES: usize = 6;

/// Options for a reconstruction pass.
#[derive(Debug, Clone)]
pub struct ReconstructionOptions {
    /// Deformation parameters (`D`, `α`, walk limits, baseline height).
    pub profile: ProfileOptions,

    /// Distance from the guiding curve to the outer curve (default: 5.0).
    pub lateral_offset: f64,

    /// Vertical lift applied to the previewed guiding curve (default: 0.0).
    pub display_offset: f64,

    /// Samples taken along the guiding curve to derive the outer curve.
    pub offset_samples: usize,

    /// Samples taken along the guiding curve for preview.
    pub display_samples: usize,

    /// Points per inner-to-outer line of the flat base (default: 30).
    pub points_per_line: usize,

    /// Progress callback for the whole pass.
    pub progress: Progress,
}

impl Default for ReconstructionOptions {
    fn default() -> Self {
        Self {
            profile: ProfileOptions::default(),
            lateral_offset: DEFAULT_LATERAL_OFFSET,
            display_offset: 0.0,
            offset_samples: OFFSET_SAMPLES,
            display_samples: DISPLAY_SAMPLES,
            points_per_line: DEFAULT_POINTS_PER_LINE,
            progress: Progress::none(),
        }
    }
}

impl ReconstructionOptions {
    /// Set the deformation parameters.
    pub fn with_profile(mut self, profile: ProfileOptions) -> Self {
        self.profile = profile;
        self
    }

    /// Set the search and falloff distance `D`.
    pub fn with_distance(mut self, distance: f64) -> Self {
        self.profile.distance = distance;
        self
    }

    /// Set the falloff sharpness `α`.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.profile.alpha = alpha;
        self
    }

    /// Set the outer curve offset.
    pub fn with_lateral_offset(mut self, offset: f64) -> Self {
        self.lateral_offset = offset;
        self
    }

    /// Set the preview lift of the guiding curve.
    pub fn with_display_offset(mut self, offset: f64) -> Self {
        self.display_offset = offset;
        self
    }

    /// Set the points per line of the flat base.
    pub fn with_points_per_line(mut self, points: usize) -> Self {
        self.points_per_line = points;
        self
    }

    /// Set the number of densification subdivisions.
    pub fn with_subdivisions(mut self, subdivisions: usize) -> Self {
        self.profile.subdivisions = subdivisions;
        self
    }

    /// Set a progress callback.
    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }

    /// Enable or disable parallel deformation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.profile.parallel = parallel;
        self
    }

    /// Use single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.profile.parallel = false;
        self
    }

    /// Check that every parameter is usable.
    ///
    /// # Errors
    ///
    /// Returns [`GumError::InvalidProfileParameter`] naming the first bad
    /// parameter.
    pub fn validate(&self) -> Result<()> {
        self.profile.validate()?;
        if !self.lateral_offset.is_finite() {
            return Err(GumError::invalid_param(
                "lateral_offset",
                self.lateral_offset,
                "must be finite",
            ));
        }
        if !self.display_offset.is_finite() {
            return Err(GumError::invalid_param(
                "display_offset",
                self.display_offset,
                "must be finite",
            ));
        }
        if self.offset_samples == 0 {
            return Err(GumError::invalid_param("offset_samples", 0, "must be at least 1"));
        }
        if self.points_per_line < 2 {
            return Err(GumError::invalid_param(
                "points_per_line",
                self.points_per_line,
                "must be at least 2",
            ));
        }
        Ok(())
    }
}

/// Borrowed inputs of a reconstruction pass.
#[derive(Debug, Clone, Copy)]
pub struct ReconstructionInput<'a> {
    /// Boundary point cloud the control points are extracted from.
    pub boundary: &'a [Point3<f64>],

    /// Gingival margin points.
    pub gingival: &'a [Point3<f64>],

    /// Heights of the gingival points, parallel to `gingival`.
    pub heights: &'a [f64],

    /// Vertices of the scanned mesh the segment walks run over.
    pub vertices: &'a [Point3<f64>],
}

impl<'a> ReconstructionInput<'a> {
    /// Bundle the inputs of a pass.
    pub fn new(
        boundary: &'a [Point3<f64>],
        gingival: &'a [Point3<f64>],
        heights: &'a [f64],
        vertices: &'a [Point3<f64>],
    ) -> Self {
        Self {
            boundary,
            gingival,
            heights,
            vertices,
        }
    }
}

/// Everything a reconstruction pass derives.
#[derive(Debug, Clone)]
pub struct ReconstructionOutput {
    /// The five landmarks of the boundary cloud.
    pub control_points: ControlPointSet,

    /// Guiding curve samples for preview, lifted by the display offset.
    pub curve: Vec<Point3<f64>>,

    /// Outer curve samples.
    pub outer_curve: Vec<Point3<f64>>,

    /// Deformed and densified gum points, sorted by `x`.
    pub deformed: Vec<Point3<f64>>,

    /// Closed gum cap over the deformed points.
    pub gum: TriMesh,

    /// Flat base between the guiding curve and the outer curve.
    pub base: TriMesh,
}

/// Run a full reconstruction pass.
///
/// # Errors
///
/// - [`GumError::InvalidProfileParameter`] if `options` fail validation
/// - [`GumError::MismatchedLengths`] if gingival points and heights differ in
///   length
/// - [`GumError::InsufficientSamplePoints`] if the boundary cloud is too small
/// - [`GumError::InsufficientPointsForHull`] or [`GumError::DegenerateHull`]
///   if the deformed points do not span a volume
pub fn reconstruct(
    input: &ReconstructionInput<'_>,
    options: &ReconstructionOptions,
) -> Result<ReconstructionOutput> {
    options.validate()?;
    if input.gingival.len() != input.heights.len() {
        return Err(GumError::MismatchedLengths {
            points: input.gingival.len(),
            heights: input.heights.len(),
        });
    }

    let progress = &options.progress;

    progress.report(0, STAGES, "Finding control points");
    let control_points = find_control_points(input.boundary)?;

    progress.report(1, STAGES, "Fitting guiding curve");
    let guide = CatmullRomCurve::new(control_points.as_slice(), 0.0)?;
    let curve = CatmullRomCurve::new(control_points.as_slice(), options.display_offset)?
        .points(options.display_samples);
    let inner_curve = guide.points(options.offset_samples);
    let outer_curve = create_offset_curve(&inner_curve, options.lateral_offset);
    log::debug!(
        "guiding curve: {} preview samples, {} offset samples",
        curve.len(),
        outer_curve.len()
    );

    progress.report(2, STAGES, "Deforming gingival profiles");
    let pairs = pair_with_curve(input.gingival, input.heights, &outer_curve)?;
    let deformed = deform_with_progress(
        &pairs,
        input.vertices,
        &options.profile,
        &sub_progress(progress, 2),
    )?;

    progress.report(3, STAGES, "Densifying");
    let deformed = interpolate_points(&deformed, options.profile.subdivisions);

    progress.report(4, STAGES, "Meshing gum cap");
    let gum = convex_hull_mesh(&deformed)?;

    progress.report(5, STAGES, "Meshing base");
    let base_points = generate_inner_points_at(
        &inner_curve,
        &outer_curve,
        options.points_per_line,
        options.profile.vertical_offset,
    );
    let base = delaunay_mesh_with_progress(&base_points, &sub_progress(progress, 5));

    progress.report(STAGES, STAGES, "Done");
    log::debug!(
        "reconstruction: {} deformed points, gum {} faces, base {} faces",
        deformed.len(),
        gum.num_faces(),
        base.num_faces()
    );

    Ok(ReconstructionOutput {
        control_points,
        curve,
        outer_curve,
        deformed,
        gum,
        base,
    })
}

/// Map a stage's own steps into its slot of the pass.
fn sub_progress(progress: &Progress, stage: usize) -> Progress {
    let outer = progress.clone();
    Progress::new(move |current, total, message| {
        outer.report_sub(current, total, stage, STAGES, message);
    })
}
