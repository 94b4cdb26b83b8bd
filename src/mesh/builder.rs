//! Mesh construction utilities.
//!
//! The mesh loader that feeds the remesher lives outside this crate; it hands
//! over plain face-vertex lists, which are turned into a half-edge mesh here.
//! [`to_face_vertex`] goes the other way so the caller can rebuild render
//! buffers after remeshing.

use std::collections::HashMap;

use nalgebra::Point3;

use super::halfedge::HalfEdgeMesh;
use super::index::{HalfEdgeId, MeshIndex, VertexId};
use crate::error::{MeshError, Result};

/// Build a half-edge mesh from vertices and triangle faces.
///
/// Faces must be consistently oriented and the result must be manifold:
/// every edge is used by at most two faces, in opposite directions, and every
/// vertex fan is a single disk or half-disk.
///
/// # Example
/// ```
/// use isomesh::mesh::{build_from_triangles, HalfEdgeMesh};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let faces = vec![[0, 1, 2]];
///
/// let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
/// assert_eq!(mesh.num_vertices(), 3);
/// assert_eq!(mesh.num_edges(), 3);
/// assert_eq!(mesh.num_faces(), 1);
/// ```
pub fn build_from_triangles<I: MeshIndex>(
    vertices: &[Point3<f64>],
    faces: &[[usize; 3]],
) -> Result<HalfEdgeMesh<I>> {
    if faces.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    for (fi, face) in faces.iter().enumerate() {
        for &vi in face {
            if vi >= vertices.len() {
                return Err(MeshError::InvalidVertexIndex { face: fi, vertex: vi });
            }
        }
        if face[0] == face[1] || face[1] == face[2] || face[0] == face[2] {
            return Err(MeshError::DegenerateFace { face: fi });
        }
    }

    let mut mesh = HalfEdgeMesh::with_capacity(vertices.len(), faces.len());

    let vertex_ids: Vec<VertexId<I>> = vertices.iter().map(|&p| mesh.add_vertex(p)).collect();

    // Undirected edge (min, max) -> half-edge leaving min.
    let mut edge_map: HashMap<(usize, usize), HalfEdgeId<I>> = HashMap::new();

    for face in faces {
        let mut hes = [HalfEdgeId::<I>::invalid(); 3];

        for i in 0..3 {
            let a = face[i];
            let b = face[(i + 1) % 3];
            let key = (a.min(b), a.max(b));

            let he = match edge_map.get(&key) {
                Some(&low) => {
                    let he = if a < b { low } else { low.twin() };
                    if !mesh.halfedge(he).is_boundary() {
                        return Err(MeshError::NonManifoldEdge { v0: a, v1: b });
                    }
                    he
                }
                None => {
                    let low = mesh.new_edge(vertex_ids[key.0], vertex_ids[key.1]);
                    edge_map.insert(key, low);
                    if a < b {
                        low
                    } else {
                        low.twin()
                    }
                }
            };
            hes[i] = he;
        }

        let f = mesh.new_face(hes[0]);
        for i in 0..3 {
            mesh.halfedge_mut(hes[i]).face = f;
            mesh.link(hes[i], hes[(i + 1) % 3]);
            mesh.vertex_mut(vertex_ids[face[i]]).halfedge = hes[i];
        }
    }

    link_boundary_loops(&mut mesh)?;
    fix_boundary_vertex_halfedges(&mut mesh);

    if !mesh.is_manifold() {
        return Err(MeshError::NonManifold {
            details: "a vertex has more than one fan of faces".to_string(),
        });
    }

    Ok(mesh)
}

/// Link boundary half-edges into loops.
///
/// A vertex with two outgoing boundary half-edges is a pinch point and is
/// rejected.
fn link_boundary_loops<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) -> Result<()> {
    let boundary: Vec<HalfEdgeId<I>> = mesh
        .halfedge_ids()
        .filter(|&he| mesh.is_boundary_halfedge(he))
        .collect();

    let mut outgoing: HashMap<VertexId<I>, HalfEdgeId<I>> = HashMap::new();
    for &he in &boundary {
        let origin = mesh.origin(he);
        if outgoing.insert(origin, he).is_some() {
            return Err(MeshError::NonManifold {
                details: format!("vertex {} is shared by two boundary loops", origin.index()),
            });
        }
    }

    for &he in &boundary {
        let dest = mesh.dest(he);
        match outgoing.get(&dest) {
            Some(&next) => mesh.link(he, next),
            None => {
                return Err(MeshError::InvalidState(format!(
                    "boundary loop is open at vertex {}",
                    dest.index()
                )))
            }
        }
    }

    Ok(())
}

/// Ensure boundary vertices point to a boundary half-edge.
fn fix_boundary_vertex_halfedges<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) {
    let boundary: Vec<HalfEdgeId<I>> = mesh
        .halfedge_ids()
        .filter(|&he| mesh.is_boundary_halfedge(he))
        .collect();

    for he in boundary {
        let origin = mesh.origin(he);
        mesh.vertex_mut(origin).halfedge = he;
    }
}

/// Convert a half-edge mesh back to a face-vertex representation.
///
/// Live vertices are renumbered densely in index order, so the output is
/// valid even while the mesh still holds tombstoned elements.
pub fn to_face_vertex<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let mut remap = vec![usize::MAX; mesh.vertex_slot_count()];
    let mut vertices = Vec::with_capacity(remap.len());
    for v in mesh.vertex_ids() {
        remap[v.index()] = vertices.len();
        vertices.push(*mesh.position(v));
    }

    let faces = mesh
        .face_ids()
        .map(|f| mesh.face_triangle(f).map(|v| remap[v.index()]))
        .collect();

    (vertices, faces)
}
