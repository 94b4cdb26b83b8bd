//! Splitting of over-long edges.

use std::collections::VecDeque;

use log::trace;

use super::TargetBand;
use crate::mesh::{EdgeId, HalfEdgeMesh, MeshIndex};

/// How many generations of re-examined edges one stage follows. A boundary
/// edge longer than `2 * max` can never have both of its triangle's other
/// edges below `max`, so the chain of splits next to it must be cut off.
/// Ordinary refinement halves lengths every generation and stays far below
/// this.
const MAX_SPLIT_DEPTH: u32 = 16;

/// Split every interior edge longer than `band.max` at its midpoint.
///
/// Works from a FIFO queue seeded with the long edges, so edges are handled
/// generation by generation. Each split re-examines the edges around the
/// inserted vertex, so halves that are still too long get split again.
/// Stale entries (deleted, or no longer too long) are skipped.
/// Boundary edges are never split.
///
/// Returns the number of splits performed.
pub fn split_long_edges<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>, band: &TargetBand) -> usize {
    let is_candidate = |mesh: &HalfEdgeMesh<I>, e: EdgeId<I>| {
        mesh.is_live_edge(e) && !mesh.is_boundary_edge(e) && mesh.edge_length(e) > band.max
    };

    let mut worklist: VecDeque<(EdgeId<I>, u32)> = mesh
        .edge_ids()
        .filter(|&e| is_candidate(mesh, e))
        .map(|e| (e, 0))
        .collect();
    let mut splits = 0;

    while let Some((e, depth)) = worklist.pop_front() {
        if !is_candidate(mesh, e) {
            continue;
        }

        let midpoint = mesh.edge_midpoint(e);
        let v = mesh.split_edge(e, midpoint);
        splits += 1;
        trace!("split {:?} at new vertex {:?}", e, v);

        if depth < MAX_SPLIT_DEPTH {
            worklist.extend(
                mesh.vertex_edges(v)
                    .filter(|&e| is_candidate(mesh, e))
                    .map(|e| (e, depth + 1)),
            );
        }
    }

    splits
}
