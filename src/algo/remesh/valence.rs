//! Valence equalization by edge flips.
//!
//! A regular triangulation has valence 6 at interior vertices and 4 on the
//! boundary. Flipping an edge lowers the valence of its endpoints and raises
//! that of its two apexes, which is used to pull vertex valences towards
//! those targets.

use log::trace;
use nalgebra::Point3;

use crate::mesh::{EdgeId, HalfEdgeMesh, MeshIndex, VertexId};

/// Target valence of a vertex: 4 on the boundary, 6 inside.
#[inline]
pub fn optimal_valence<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, v: VertexId<I>) -> usize {
    if mesh.is_boundary_vertex(v) {
        4
    } else {
        6
    }
}

/// Sum of `|degree - 6|` over all interior vertices.
pub fn valence_excess<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> usize {
    mesh.vertex_ids()
        .filter(|&v| !mesh.is_boundary_vertex(v))
        .map(|v| mesh.degree(v).abs_diff(6))
        .sum()
}

/// Sum of `|degree - optimal|` over all vertices, boundary included.
///
/// This is the quantity every flip of [`equalize_valences`] strictly lowers.
pub fn total_valence_excess<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> usize {
    mesh.vertex_ids()
        .map(|v| mesh.degree(v).abs_diff(optimal_valence(mesh, v)))
        .sum()
}

/// Flip interior edges that reduce the valence deviation of their four
/// vertices.
///
/// For an edge `(v0, v1)` with apexes `v2` and `v3`, the flip is taken only if
/// - the summed deviation of the four vertices strictly decreases (ties are
///   left alone)
/// - the summed deviation of the interior vertices among the four does not
///   increase
/// - no interior endpoint drops below valence 3
/// - the quad `(v0, v2, v1, v3)` is convex
/// - [`HalfEdgeMesh::flip_edge`] accepts it
///
/// This is a single greedy pass over the edges that exist when it starts.
/// Returns the number of flips performed.
pub fn equalize_valences<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) -> usize {
    let edges: Vec<EdgeId<I>> = mesh.edge_ids().collect();
    let mut flips = 0;

    for e in edges {
        if !mesh.is_live_edge(e) || mesh.is_boundary_edge(e) {
            continue;
        }

        let h = e.halfedge(0);
        let v0 = mesh.origin(h);
        let v1 = mesh.dest(h);
        let v2 = mesh.apex(h);
        let v3 = mesh.apex(h.twin());

        let deviation = |v: VertexId<I>, delta: isize| -> usize {
            let degree = mesh.degree(v) as isize + delta;
            degree.abs_diff(optimal_valence(mesh, v) as isize)
        };

        let before = deviation(v0, 0) + deviation(v1, 0) + deviation(v2, 0) + deviation(v3, 0);
        let after = deviation(v0, -1) + deviation(v1, -1) + deviation(v2, 1) + deviation(v3, 1);
        if after >= before {
            continue;
        }

        let interior = |v: VertexId<I>, delta: isize| -> usize {
            if mesh.is_boundary_vertex(v) {
                0
            } else {
                deviation(v, delta)
            }
        };
        let interior_before =
            interior(v0, 0) + interior(v1, 0) + interior(v2, 0) + interior(v3, 0);
        let interior_after =
            interior(v0, -1) + interior(v1, -1) + interior(v2, 1) + interior(v3, 1);
        if interior_after > interior_before {
            continue;
        }

        let too_thin = [v0, v1]
            .into_iter()
            .any(|v| !mesh.is_boundary_vertex(v) && mesh.degree(v) <= 3);
        if too_thin {
            continue;
        }

        let [p0, p1, p2, p3] = [v0, v1, v2, v3].map(|v| *mesh.position(v));
        if !is_convex_quad(&p0, &p2, &p1, &p3) {
            continue;
        }

        if mesh.flip_edge(e) {
            flips += 1;
            trace!("flipped {:?}: deviation {} -> {}", e, before, after);
        }
    }

    flips
}

/// Whether the quad `p0 p1 p2 p3` (in cyclic order) is convex: all corner
/// normals must point the same way.
pub(crate) fn is_convex_quad(
    p0: &Point3<f64>,
    p1: &Point3<f64>,
    p2: &Point3<f64>,
    p3: &Point3<f64>,
) -> bool {
    let v01 = p1 - p0;
    let v12 = p2 - p1;
    let v23 = p3 - p2;
    let v30 = p0 - p3;

    let n0 = v01.cross(&(-v30));
    let n1 = v12.cross(&(-v01));
    let n2 = v23.cross(&(-v12));
    let n3 = v30.cross(&(-v23));

    n0.dot(&n1) > 0.0 && n1.dot(&n2) > 0.0 && n2.dot(&n3) > 0.0
}
