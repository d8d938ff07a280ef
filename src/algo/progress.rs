//! Progress reporting for long-running stages.
//!
//! Triangulation is quadratic in the worst case and the deformation stage
//! scans the whole vertex buffer once per walk step, so hosts feeding large
//! inputs interactively usually want feedback. Stages accept a [`Progress`]
//! and report through it.
//!
//! # Example
//!
//! ```
//! use gumline::algo::Progress;
//! use gumline::pipeline::ReconstructionOptions;
//!
//! let progress = Progress::new(|current, total, message| {
//!     eprintln!("[{}/{}] {}", current, total, message);
//! });
//!
//! let options = ReconstructionOptions::default().with_progress(progress);
//! ```

use std::sync::Arc;

type Callback = dyn Fn(usize, usize, &str) + Send + Sync;

/// A progress callback that receives updates during long-running operations.
///
/// The callback receives:
/// - `current`: Current step (0-based)
/// - `total`: Total number of steps
/// - `message`: Description of the current operation
///
/// Cloning is cheap; clones share the callback.
#[derive(Clone)]
pub struct Progress {
    callback: Arc<Callback>,
}

impl Progress {
    /// Create a new progress reporter with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
        }
    }

    /// Report progress.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) {
        (self.callback)(current, total, message);
    }

    /// Report progress within a sub-range.
    ///
    /// Maps progress from `[0, sub_total]` to `[range_current, range_current + 1]`
    /// within a total of `range_total` steps, so that a stage of the pipeline
    /// can report its own steps inside the slot the pipeline gave it.
    #[inline]
    pub fn report_sub(
        &self,
        sub_current: usize,
        sub_total: usize,
        range_current: usize,
        range_total: usize,
        message: &str,
    ) {
        if sub_total == 0 || range_total == 0 {
            return;
        }
        // Fixed-point with three decimal digits
        let sub_fraction = (sub_current.min(sub_total) * 1000) / sub_total;
        let effective = range_current * 1000 + sub_fraction;
        let total_scaled = range_total * 1000;
        (self.callback)(effective, total_scaled, message);
    }

    /// Create a no-op progress reporter that discards all updates.
    pub fn none() -> Self {
        Self::new(|_, _, _| {})
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_report_sub_scales_into_range() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let progress = Progress::new(move |current, total, _| {
            sink.lock().unwrap().push((current, total));
        });

        progress.report_sub(5, 10, 2, 4, "inserting");
        progress.report_sub(0, 0, 2, 4, "ignored");

        assert_eq!(*seen.lock().unwrap(), vec![(2500, 4000)]);
    }

    #[test]
    fn test_clones_share_callback() {
        let seen = Arc::new(Mutex::new(0usize));
        let sink = Arc::clone(&seen);
        let progress = Progress::new(move |_, _, _| *sink.lock().unwrap() += 1);

        let copy = progress.clone();
        progress.report(0, 1, "a");
        copy.report(1, 1, "b");

        assert_eq!(*seen.lock().unwrap(), 2);
    }
}
