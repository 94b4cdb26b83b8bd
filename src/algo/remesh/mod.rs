//! Isotropic remeshing.
//!
//! The remesher rewrites a manifold triangle mesh so that its edges fall into
//! a target length band, interior valences approach 6 (4 on the boundary),
//! and the surface keeps its shape.
//!
//! # Algorithm
//!
//! The band is computed once from the mean edge length `L` of the input:
//! `[min_ratio * L, max_ratio * L]`. Each of a fixed number of iterations then
//! runs, on the same mesh:
//!
//! 1. **Split** interior edges longer than `max`
//! 2. **Collapse** interior edges shorter than `min` into their midpoint
//! 3. **Flip** edges that lower the valence deviation of their four vertices
//! 4. **Relax** interior vertices tangentially towards their neighbours
//! 5. **Project** the relaxed vertices back onto the pre-relaxation surface
//!
//! Normals are recomputed after every stage. Tombstoned elements are
//! compacted after each collapse stage and at the end, so every handle into
//! the mesh is invalid once [`IsotropicRemesher::remesh`] returns.
//!
//! There is no convergence test and no early exit.
//!
//! # Example
//!
//! ```
//! use isomesh::algo::remesh::{isotropic_remesh, RemeshOptions};
//! use isomesh::mesh::{shapes, HalfEdgeMesh};
//!
//! let mut mesh: HalfEdgeMesh = shapes::unit_cube().unwrap();
//! let stats = isotropic_remesh(&mut mesh, &RemeshOptions::default()).unwrap();
//!
//! assert_eq!(stats.iterations.len(), 5);
//! assert!(mesh.is_valid());
//! ```
//!
//! # References
//!
//! - Botsch, M., & Kobbelt, L. (2004). "A remeshing approach to multiresolution modeling."
//!   Symposium on Geometry Processing.

mod collapse;
mod project;
mod relax;
mod split;
mod valence;

pub use collapse::collapse_short_edges;
pub use project::{project_to_surface, SurfaceSnapshot};
pub use relax::tangential_relaxation;
pub use split::split_long_edges;
pub use valence::{equalize_valences, optimal_valence, total_valence_excess, valence_excess};

use log::{debug, info};

use crate::algo::{Progress, ProgressEvent, RemeshStage};
use crate::error::{MeshError, Result};
use crate::mesh::{HalfEdgeMesh, MeshIndex};

/// Options for isotropic remeshing.
#[derive(Debug, Clone, PartialEq)]
pub struct RemeshOptions {
    /// Number of remeshing iterations.
    pub iterations: usize,

    /// Lower band bound as a multiple of the input mean edge length.
    pub min_ratio: f64,

    /// Upper band bound as a multiple of the input mean edge length.
    pub max_ratio: f64,

    /// Damping factor applied to each tangential relaxation step.
    ///
    /// Corners of coarse closed meshes round off a little every iteration;
    /// at 0.5 a unit cube shrinks to a sliver within five iterations.
    pub damping: f64,

    /// Largest tangential relaxation step, as a multiple of the band maximum.
    pub max_step_ratio: f64,

    /// Whether relaxation and projection compute in parallel (default: false).
    pub parallel: bool,
}

impl Default for RemeshOptions {
    fn default() -> Self {
        Self {
            iterations: 5,
            min_ratio: 0.8,
            max_ratio: 4.0 / 3.0,
            damping: 0.2,
            max_step_ratio: 0.5,
            parallel: false,
        }
    }
}

impl RemeshOptions {
    /// Set the number of remeshing iterations.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the band multipliers.
    pub fn with_band_ratios(mut self, min_ratio: f64, max_ratio: f64) -> Self {
        self.min_ratio = min_ratio;
        self.max_ratio = max_ratio;
        self
    }

    /// Set the relaxation damping factor.
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    /// Set the relaxation step clamp, as a multiple of the band maximum.
    pub fn with_max_step_ratio(mut self, ratio: f64) -> Self {
        self.max_step_ratio = ratio;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Check that every parameter is in range.
    pub fn validate(&self) -> Result<()> {
        if !(self.min_ratio.is_finite() && self.min_ratio > 0.0) {
            return Err(MeshError::invalid_param("min_ratio", self.min_ratio, "must be positive"));
        }
        if !(self.max_ratio.is_finite() && self.max_ratio > self.min_ratio) {
            return Err(MeshError::invalid_param(
                "max_ratio",
                self.max_ratio,
                "must be greater than min_ratio",
            ));
        }
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(MeshError::invalid_param("damping", self.damping, "must be in (0, 1]"));
        }
        if !(self.max_step_ratio.is_finite() && self.max_step_ratio > 0.0) {
            return Err(MeshError::invalid_param(
                "max_step_ratio",
                self.max_step_ratio,
                "must be positive",
            ));
        }
        Ok(())
    }
}

/// The edge length band the remesher drives edges into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetBand {
    /// Edges shorter than this are collapsed.
    pub min: f64,
    /// Edges longer than this are split.
    pub max: f64,
}

impl TargetBand {
    /// Band for a mesh with the given mean edge length.
    pub fn from_mean_edge_length(mean: f64, options: &RemeshOptions) -> Self {
        Self {
            min: options.min_ratio * mean,
            max: options.max_ratio * mean,
        }
    }

    /// Whether `length` lies inside the band (bounds included).
    #[inline]
    pub fn contains(&self, length: f64) -> bool {
        length >= self.min && length <= self.max
    }
}

/// Fraction of interior edges whose length lies outside `band`.
///
/// A mesh without interior edges reports 0.
pub fn out_of_band_fraction<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, band: &TargetBand) -> f64 {
    let (outside, total) = mesh
        .edge_ids()
        .filter(|&e| !mesh.is_boundary_edge(e))
        .fold((0usize, 0usize), |(outside, total), e| {
            let out = !band.contains(mesh.edge_length(e));
            (outside + out as usize, total + 1)
        });

    if total == 0 {
        0.0
    } else {
        outside as f64 / total as f64
    }
}

/// What one iteration did.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IterationStats {
    /// Edges split.
    pub splits: usize,
    /// Edges collapsed.
    pub collapses: usize,
    /// Edges flipped.
    pub flips: usize,
    /// Vertices relaxed.
    pub relaxed: usize,
    /// Vertices projected back onto the surface.
    pub projected: usize,
    /// Fraction of interior edges outside the band at the end of the iteration.
    pub out_of_band_fraction: f64,
}

/// Statistics of a complete remeshing run.
#[derive(Debug, Clone, PartialEq)]
pub struct RemeshStats {
    /// The band used for the run.
    pub band: TargetBand,
    /// One entry per iteration.
    pub iterations: Vec<IterationStats>,
}

impl RemeshStats {
    /// Total number of splits.
    pub fn total_splits(&self) -> usize {
        self.iterations.iter().map(|s| s.splits).sum()
    }

    /// Total number of collapses.
    pub fn total_collapses(&self) -> usize {
        self.iterations.iter().map(|s| s.collapses).sum()
    }

    /// Total number of flips.
    pub fn total_flips(&self) -> usize {
        self.iterations.iter().map(|s| s.flips).sum()
    }
}

/// Remesher bound to one mesh for the duration of a run.
///
/// The band is fixed at construction from the mesh as it is then; running
/// [`remesh`](Self::remesh) again reuses it.
pub struct IsotropicRemesher<'a, I: MeshIndex = u32> {
    mesh: &'a mut HalfEdgeMesh<I>,
    options: RemeshOptions,
    band: TargetBand,
}

impl<'a, I: MeshIndex> IsotropicRemesher<'a, I> {
    /// Bind a remesher to `mesh`.
    ///
    /// Fails if the options are out of range or the mesh connectivity is
    /// inconsistent. A mesh without edges is accepted; its band is empty and
    /// remeshing it does nothing.
    pub fn new(mesh: &'a mut HalfEdgeMesh<I>, options: RemeshOptions) -> Result<Self> {
        options.validate()?;

        if !mesh.is_valid() {
            return Err(MeshError::InvalidState(
                "half-edge connectivity is inconsistent".to_string(),
            ));
        }
        if !mesh.is_manifold() {
            return Err(MeshError::NonManifold {
                details: "a vertex has more than one fan of faces".to_string(),
            });
        }

        let band = TargetBand::from_mean_edge_length(mesh.average_edge_length(), &options);
        mesh.update_normals();

        debug!("target band [{:.6}, {:.6}]", band.min, band.max);

        Ok(Self { mesh, options, band })
    }

    /// The target band.
    pub fn band(&self) -> TargetBand {
        self.band
    }

    /// The options this remesher runs with.
    pub fn options(&self) -> &RemeshOptions {
        &self.options
    }

    /// Run all iterations.
    pub fn remesh(&mut self) -> RemeshStats {
        self.remesh_with_progress(&Progress::none())
    }

    /// Run all iterations, reporting before each stage.
    pub fn remesh_with_progress(&mut self, progress: &Progress) -> RemeshStats {
        let iterations = self.options.iterations;
        let mut stats = RemeshStats {
            band: self.band,
            iterations: Vec::with_capacity(iterations),
        };

        for iteration in 0..iterations {
            let report = |stage| {
                progress.report(ProgressEvent {
                    iteration,
                    iterations,
                    stage,
                })
            };
            let it = self.iterate(report);

            debug!(
                "iteration {}/{}: {} splits, {} collapses, {} flips, {} relaxed, {} projected, {:.1}% out of band",
                iteration + 1,
                iterations,
                it.splits,
                it.collapses,
                it.flips,
                it.relaxed,
                it.projected,
                it.out_of_band_fraction * 100.0
            );
            stats.iterations.push(it);
        }

        let removed = self.mesh.garbage_collect();
        debug!("final compaction removed {:?}", removed);
        self.mesh.update_normals();

        progress.report(ProgressEvent {
            iteration: iterations,
            iterations,
            stage: RemeshStage::Done,
        });

        info!(
            "remeshed in {} iterations: {} vertices, {} faces ({} splits, {} collapses, {} flips)",
            iterations,
            self.mesh.num_vertices(),
            self.mesh.num_faces(),
            stats.total_splits(),
            stats.total_collapses(),
            stats.total_flips()
        );

        stats
    }

    fn iterate(&mut self, report: impl Fn(RemeshStage)) -> IterationStats {
        let band = self.band;
        let mut it = IterationStats::default();

        report(RemeshStage::Split);
        it.splits = split_long_edges(self.mesh, &band);
        self.mesh.update_normals();
        self.check(RemeshStage::Split);

        report(RemeshStage::Collapse);
        it.collapses = collapse_short_edges(self.mesh, &band);
        self.mesh.garbage_collect();
        self.mesh.update_normals();
        self.check(RemeshStage::Collapse);

        report(RemeshStage::EqualizeValence);
        it.flips = equalize_valences(self.mesh);
        self.mesh.update_normals();
        self.check(RemeshStage::EqualizeValence);

        report(RemeshStage::Relax);
        let snapshot = SurfaceSnapshot::capture(self.mesh);
        let max_step = self.options.max_step_ratio * band.max;
        it.relaxed = tangential_relaxation(
            self.mesh,
            self.options.damping,
            max_step,
            self.options.parallel,
        );
        self.mesh.update_normals();
        self.check(RemeshStage::Relax);

        report(RemeshStage::Project);
        it.projected = project_to_surface(self.mesh, &snapshot, self.options.parallel);
        self.mesh.update_normals();
        self.check(RemeshStage::Project);

        it.out_of_band_fraction = out_of_band_fraction(self.mesh, &band);
        it
    }

    #[cfg(debug_assertions)]
    fn check(&self, stage: RemeshStage) {
        if !self.mesh.is_valid() || !self.mesh.is_manifold() {
            log::warn!("mesh failed validation after {} stage", stage);
        }
    }

    #[cfg(not(debug_assertions))]
    #[inline]
    fn check(&self, _stage: RemeshStage) {}
}

/// Performs isotropic remeshing on a triangle mesh.
///
/// The band is taken from the mesh's current mean edge length. Returns an
/// error only for invalid options or a corrupt mesh.
pub fn isotropic_remesh<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    options: &RemeshOptions,
) -> Result<RemeshStats> {
    isotropic_remesh_with_progress(mesh, options, &Progress::none())
}

/// Performs isotropic remeshing with progress reporting.
///
/// See [`isotropic_remesh`] for details.
pub fn isotropic_remesh_with_progress<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    options: &RemeshOptions,
    progress: &Progress,
) -> Result<RemeshStats> {
    let mut remesher = IsotropicRemesher::new(mesh, options.clone())?;
    Ok(remesher.remesh_with_progress(progress))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::shapes;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_default_options_validate() {
        assert!(RemeshOptions::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_options() {
        let bad = [
            RemeshOptions::default().with_damping(0.0),
            RemeshOptions::default().with_damping(1.5),
            RemeshOptions::default().with_band_ratios(0.8, 0.7),
            RemeshOptions::default().with_band_ratios(-1.0, 1.2),
            RemeshOptions::default().with_max_step_ratio(0.0),
            RemeshOptions::default().with_band_ratios(0.8, f64::NAN),
        ];
        for options in bad {
            assert!(
                matches!(options.validate(), Err(MeshError::InvalidParameter { .. })),
                "{:?} should be rejected",
                options
            );
        }
    }

    #[test]
    fn test_band_from_mean() {
        let options = RemeshOptions::default().with_band_ratios(0.8, 1.2);
        let band = TargetBand::from_mean_edge_length(2.0, &options);
        assert!((band.min - 1.6).abs() < 1e-12);
        assert!((band.max - 2.4).abs() < 1e-12);
        assert!(band.contains(2.0));
        assert!(!band.contains(2.5));
    }

    #[test]
    fn test_remesher_band_uses_input_mean() {
        let mut mesh: HalfEdgeMesh = shapes::unit_cube().unwrap();
        let mean = mesh.average_edge_length();
        let remesher = IsotropicRemesher::new(&mut mesh, RemeshOptions::default()).unwrap();

        let band = remesher.band();
        assert!((band.min - 0.8 * mean).abs() < 1e-12);
        assert!((band.max - 4.0 / 3.0 * mean).abs() < 1e-12);
    }

    #[test]
    fn test_zero_iterations_no_change() {
        let mut mesh: HalfEdgeMesh = shapes::hex_patch().unwrap();
        let before: Vec<_> = mesh.vertex_ids().map(|v| *mesh.position(v)).collect();

        let stats = isotropic_remesh(&mut mesh, &RemeshOptions::default().with_iterations(0)).unwrap();

        assert!(stats.iterations.is_empty());
        assert_eq!(mesh.num_faces(), 10);
        for (v, p) in mesh.vertex_ids().zip(before) {
            assert_eq!(*mesh.position(v), p);
        }
    }

    #[test]
    fn test_empty_mesh_is_a_no_op() {
        let mut mesh = HalfEdgeMesh::<u32>::new();
        let stats = isotropic_remesh(&mut mesh, &RemeshOptions::default()).unwrap();

        assert_eq!(stats.band, TargetBand { min: 0.0, max: 0.0 });
        assert_eq!(stats.total_splits() + stats.total_collapses() + stats.total_flips(), 0);
        assert_eq!(mesh.num_faces(), 0);
    }

    #[test]
    fn test_corrupt_mesh_is_rejected() {
        let mut mesh: HalfEdgeMesh = shapes::unit_quad().unwrap();
        let he = mesh.halfedge_ids().next().unwrap();
        let next = mesh.next(he);
        mesh.halfedge_mut(he).next = mesh.next(next);

        let result = IsotropicRemesher::new(&mut mesh, RemeshOptions::default());
        assert!(matches!(result, Err(MeshError::InvalidState(_))));
    }

    #[test]
    fn test_remesh_keeps_mesh_valid() {
        // Only the cell diagonals are above 1.2 times the mean.
        let mut mesh: HalfEdgeMesh = shapes::grid(3, 1.0).unwrap();
        let stats = isotropic_remesh(
            &mut mesh,
            &RemeshOptions::default().with_band_ratios(0.8, 1.2),
        )
        .unwrap();

        assert!(stats.total_splits() > 0);
        assert!(mesh.is_valid());
        assert!(mesh.is_manifold());
        assert!(!mesh.has_garbage());
        assert!((mesh.surface_area() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_progress_reports_every_stage() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let progress = Progress::new(move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        });

        let mut mesh: HalfEdgeMesh = shapes::octahedron().unwrap();
        let options = RemeshOptions::default().with_iterations(3);
        isotropic_remesh_with_progress(&mut mesh, &options, &progress).unwrap();

        assert_eq!(count.load(Ordering::Relaxed), 3 * 5 + 1);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut sequential: HalfEdgeMesh = shapes::unit_cube().unwrap();
        let mut parallel: HalfEdgeMesh = shapes::unit_cube().unwrap();

        let options = RemeshOptions::default().with_band_ratios(0.3, 0.5);
        isotropic_remesh(&mut sequential, &options).unwrap();
        isotropic_remesh(&mut parallel, &options.with_parallel(true)).unwrap();

        assert_eq!(sequential.num_vertices(), parallel.num_vertices());
        for v in sequential.vertex_ids() {
            assert_eq!(sequential.position(v), parallel.position(v));
        }
    }
}
