//! Progress reporting for long-running algorithms.
//!
//! The remesher reports once before each stage of each iteration and once
//! when it is done. Callers wire that into whatever display they have.
//!
//! # Example
//!
//! ```
//! use isomesh::algo::{Progress, RemeshStage};
//!
//! let progress = Progress::new(|event| {
//!     if event.stage != RemeshStage::Done {
//!         println!("[{}/{}] {}", event.iteration + 1, event.iterations, event.stage);
//!     }
//! });
//! # let _ = progress;
//! ```

use std::fmt;

/// The stage the remesher is about to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemeshStage {
    /// Splitting over-long edges.
    Split,
    /// Collapsing over-short edges.
    Collapse,
    /// Flipping edges to balance vertex valence.
    EqualizeValence,
    /// Tangential relaxation.
    Relax,
    /// Projection back onto the pre-relaxation surface.
    Project,
    /// All iterations have finished.
    Done,
}

impl RemeshStage {
    /// The five stages run by every iteration, in order.
    pub const PIPELINE: [RemeshStage; 5] = [
        RemeshStage::Split,
        RemeshStage::Collapse,
        RemeshStage::EqualizeValence,
        RemeshStage::Relax,
        RemeshStage::Project,
    ];

    /// Position of this stage within an iteration (`Done` comes last).
    pub fn ordinal(self) -> usize {
        match self {
            RemeshStage::Split => 0,
            RemeshStage::Collapse => 1,
            RemeshStage::EqualizeValence => 2,
            RemeshStage::Relax => 3,
            RemeshStage::Project => 4,
            RemeshStage::Done => 5,
        }
    }
}

impl fmt::Display for RemeshStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RemeshStage::Split => "split",
            RemeshStage::Collapse => "collapse",
            RemeshStage::EqualizeValence => "equalize valence",
            RemeshStage::Relax => "relax",
            RemeshStage::Project => "project",
            RemeshStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// A single progress update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Current iteration (0-based). Equal to `iterations` for [`RemeshStage::Done`].
    pub iteration: usize,
    /// Total number of iterations.
    pub iterations: usize,
    /// The stage about to run.
    pub stage: RemeshStage,
}

impl ProgressEvent {
    /// Fraction of the pipeline completed before this stage, in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.stage == RemeshStage::Done || self.iterations == 0 {
            return 1.0;
        }
        let per_iteration = RemeshStage::PIPELINE.len();
        let done = self.iteration * per_iteration + self.stage.ordinal();
        done as f64 / (self.iterations * per_iteration) as f64
    }
}

/// A progress callback that receives updates during long-running operations.
pub struct Progress {
    callback: Box<dyn Fn(&ProgressEvent) + Send + Sync>,
}

impl Progress {
    /// Create a new progress reporter with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&ProgressEvent) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Report progress.
    #[inline]
    pub fn report(&self, event: ProgressEvent) {
        (self.callback)(&event);
    }

    /// Create a no-op progress reporter that discards all updates.
    pub fn none() -> Self {
        Self::new(|_| {})
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Debug for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}
