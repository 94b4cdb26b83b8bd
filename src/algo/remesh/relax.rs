//! Tangential relaxation.

use nalgebra::{Point3, Vector3};
use rayon::prelude::*;

use crate::mesh::{HalfEdgeMesh, MeshIndex, VertexId};

/// Move every interior vertex towards the centroid of its neighbours,
/// restricted to the tangent plane of its cached normal.
///
/// The tangential step is clamped to `max_step` and then scaled by `damping`.
/// All new positions are computed from the current positions before any is
/// written back, so the result does not depend on visiting order. Boundary
/// vertices never move. Cached normals must be up to date.
///
/// With `parallel` set, the compute phase runs on the rayon thread pool.
/// Returns the number of vertices relaxed.
pub fn tangential_relaxation<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    damping: f64,
    max_step: f64,
    parallel: bool,
) -> usize {
    let vertices: Vec<VertexId<I>> = mesh.vertex_ids().collect();

    let relaxed: Vec<Option<Point3<f64>>> = {
        let mesh = &*mesh;
        let compute = |&v: &VertexId<I>| relaxed_position(mesh, v, damping, max_step);
        if parallel {
            vertices.par_iter().map(compute).collect()
        } else {
            vertices.iter().map(compute).collect()
        }
    };

    let mut moved = 0;
    for (v, position) in vertices.into_iter().zip(relaxed) {
        if let Some(p) = position {
            mesh.set_position(v, p);
            moved += 1;
        }
    }
    moved
}

fn relaxed_position<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    v: VertexId<I>,
    damping: f64,
    max_step: f64,
) -> Option<Point3<f64>> {
    if mesh.is_boundary_vertex(v) {
        return None;
    }

    let (sum, count) = mesh
        .vertex_neighbors(v)
        .fold((Vector3::zeros(), 0usize), |(sum, count), n| {
            (sum + mesh.position(n).coords, count + 1)
        });
    if count == 0 {
        return None;
    }

    let p = mesh.position(v);
    let displacement = sum / count as f64 - p.coords;
    let normal = mesh.vertex_normal(v);
    let mut tangent = displacement - normal * normal.dot(&displacement);

    let length = tangent.norm();
    if length > max_step {
        tangent *= max_step / length;
    }

    Some(p + tangent * damping)
}
