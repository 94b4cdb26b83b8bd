//! Collapsing of over-short edges.

use log::trace;

use super::TargetBand;
use crate::mesh::{EdgeId, HalfEdgeMesh, MeshIndex};

/// Collapse interior edges shorter than `band.min` into their midpoint.
///
/// A candidate is skipped when:
/// - an endpoint lies on the boundary, or has a neighbour that does
/// - [`HalfEdgeMesh::is_collapse_legal`] refuses it
/// - some neighbour of the merged vertex would end up farther than `band.max`
///   from the midpoint
///
/// Edges around the surviving vertex are re-examined after every collapse.
/// Deleted elements are only tombstoned; the caller decides when to run
/// [`HalfEdgeMesh::garbage_collect`].
///
/// Returns the number of collapses performed.
pub fn collapse_short_edges<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>, band: &TargetBand) -> usize {
    let is_candidate = |mesh: &HalfEdgeMesh<I>, e: EdgeId<I>| {
        mesh.is_live_edge(e) && !mesh.is_boundary_edge(e) && mesh.edge_length(e) < band.min
    };

    let mut worklist: Vec<EdgeId<I>> = mesh.edge_ids().filter(|&e| is_candidate(mesh, e)).collect();
    let mut collapses = 0;

    while let Some(e) = worklist.pop() {
        if !is_candidate(mesh, e) {
            continue;
        }

        // Removes v0, keeps v1.
        let he = e.halfedge(0);
        let v0 = mesh.origin(he);
        let v1 = mesh.dest(he);

        if mesh.is_boundary_vertex(v0) || mesh.is_boundary_vertex(v1) {
            continue;
        }
        let touches_boundary = mesh
            .vertex_neighbors(v0)
            .chain(mesh.vertex_neighbors(v1))
            .any(|n| mesh.is_boundary_vertex(n));
        if touches_boundary {
            continue;
        }

        if !mesh.is_collapse_legal(he) {
            continue;
        }

        let midpoint = mesh.edge_midpoint(e);
        let creates_long_edge = mesh
            .vertex_neighbors(v0)
            .chain(mesh.vertex_neighbors(v1))
            .filter(|&n| n != v0 && n != v1)
            .any(|n| (mesh.position(n) - midpoint).norm() > band.max);
        if creates_long_edge {
            continue;
        }

        if !mesh.collapse(he) {
            continue;
        }
        mesh.set_position(v1, midpoint);
        collapses += 1;
        trace!("collapsed {:?} into {:?}", e, v1);

        worklist.extend(mesh.vertex_edges(v1).filter(|&e| is_candidate(mesh, e)));
    }

    collapses
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::remesh::split_long_edges;
    use crate::mesh::shapes;
    use nalgebra::Point3;

    #[test]
    fn test_quad_never_collapses() {
        let mut mesh: HalfEdgeMesh = shapes::unit_quad().unwrap();
        let band = TargetBand { min: 10.0, max: 20.0 };

        assert_eq!(collapse_short_edges(&mut mesh, &band), 0);
        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(mesh.num_vertices(), 4);
    }

    #[test]
    fn test_collapse_on_closed_mesh() {
        let mut mesh: HalfEdgeMesh = shapes::unit_cube().unwrap();
        let band = TargetBand { min: 0.1, max: 0.4 };
        split_long_edges(&mut mesh, &band);
        let vertices_before = mesh.num_vertices();

        let coarse = TargetBand { min: 0.3, max: 0.8 };
        let collapses = collapse_short_edges(&mut mesh, &coarse);

        assert!(collapses > 0);
        assert_eq!(mesh.num_vertices(), vertices_before - collapses);
        assert!(mesh.is_valid());
        assert!(mesh.is_manifold());

        mesh.garbage_collect();
        assert!(mesh.is_valid());
        let euler = mesh.num_vertices() as i64 - mesh.num_edges() as i64 + mesh.num_faces() as i64;
        assert_eq!(euler, 2);
    }

    #[test]
    fn test_collapse_moves_survivor_to_midpoint() {
        let mut mesh: HalfEdgeMesh = shapes::grid(6, 6.0).unwrap();

        // Nudge one interior vertex towards its right neighbour.
        let v = mesh
            .vertex_ids()
            .find(|&v| *mesh.position(v) == Point3::new(3.0, 3.0, 0.0))
            .unwrap();
        mesh.set_position(v, Point3::new(3.8, 3.0, 0.0));

        let band = TargetBand { min: 0.5, max: 2.5 };
        let collapses = collapse_short_edges(&mut mesh, &band);

        assert_eq!(collapses, 1);
        assert!(mesh.is_valid());
        let merged = Point3::new(3.9, 3.0, 0.0);
        assert!(mesh
            .vertex_ids()
            .any(|v| (mesh.position(v) - merged).norm() < 1e-12));
    }

    #[test]
    fn test_rejects_collapse_that_creates_long_edge() {
        let mut mesh: HalfEdgeMesh = shapes::grid(6, 6.0).unwrap();
        let v = mesh
            .vertex_ids()
            .find(|&v| *mesh.position(v) == Point3::new(3.0, 3.0, 0.0))
            .unwrap();
        mesh.set_position(v, Point3::new(3.8, 3.0, 0.0));

        // Merging at (3.9, 3) puts (2, 2) about 2.15 away.
        let band = TargetBand { min: 0.5, max: 2.0 };
        assert_eq!(collapse_short_edges(&mut mesh, &band), 0);
        assert!(!mesh.has_garbage());
    }
}
