//! # Isomesh
//!
//! Isotropic remeshing of manifold triangle meshes.
//!
//! Isomesh provides an index-based half-edge mesh with the local topological
//! operators remeshing needs (edge split, halfedge collapse, edge flip) and a
//! remesher that drives every edge towards a target length band while
//! keeping vertex valences regular and the surface in place.
//!
//! ## Features
//!
//! - **Half-edge data structure**: O(1) adjacency queries with type-safe indices
//! - **Flexible indexing**: Support for 16-bit, 32-bit, and 64-bit indices
//! - **Tombstone deletion**: Removed elements stay addressable until an explicit
//!   [`garbage_collect`](mesh::HalfEdgeMesh::garbage_collect)
//! - **Isotropic remeshing**: split, collapse, flip, relax and project passes
//!
//! ## Quick Start
//!
//! ```
//! use isomesh::prelude::*;
//!
//! let mut mesh: HalfEdgeMesh = shapes::unit_cube().unwrap();
//! let stats = isotropic_remesh(&mut mesh, &RemeshOptions::default()).unwrap();
//!
//! println!("band: [{:.3}, {:.3}]", stats.band.min, stats.band.max);
//! println!("Vertices: {}", mesh.num_vertices());
//! println!("Faces: {}", mesh.num_faces());
//! assert!(mesh.is_valid());
//! ```
//!
//! ## Building Meshes Programmatically
//!
//! ```
//! use isomesh::prelude::*;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//!
//! let faces = vec![
//!     [0, 2, 1],  // bottom
//!     [0, 1, 3],  // front
//!     [1, 2, 3],  // right
//!     [2, 0, 3],  // left
//! ];
//!
//! let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
//! assert_eq!(mesh.num_vertices(), 4);
//! assert_eq!(mesh.num_faces(), 4);
//! ```
//!
//! ## Running Stages by Hand
//!
//! Every remeshing stage is a plain function on `&mut HalfEdgeMesh`:
//!
//! ```
//! use isomesh::prelude::*;
//! use isomesh::algo::remesh::{split_long_edges, TargetBand};
//!
//! let mut mesh: HalfEdgeMesh = shapes::unit_quad().unwrap();
//! let band = TargetBand { min: 0.5, max: 1.2 };
//!
//! assert_eq!(split_long_edges(&mut mesh, &band), 1);
//! assert_eq!(mesh.num_faces(), 4);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use isomesh::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::remesh::{
        isotropic_remesh, isotropic_remesh_with_progress, IsotropicRemesher, RemeshOptions,
        RemeshStats,
    };
    pub use crate::algo::{Progress, ProgressEvent, RemeshStage};
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        build_from_triangles, shapes, to_face_vertex, EdgeId, Face, FaceId, HalfEdge, HalfEdgeId,
        HalfEdgeMesh, MeshIndex, Vertex, VertexId,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use nalgebra::Point3;

    #[test]
    fn test_tetrahedron() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];

        let faces = vec![
            [0, 2, 1], // bottom
            [0, 1, 3], // front
            [1, 2, 3], // right
            [2, 0, 3], // left
        ];

        let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_faces(), 4);
        // Closed: every half-edge has a face
        assert_eq!(mesh.num_halfedges(), 12);
        assert!(mesh.is_valid());

        for v in mesh.vertex_ids() {
            assert!(!mesh.is_boundary_vertex(v), "vertex {:?} should not be on boundary", v);
        }
    }

    #[test]
    fn test_prelude_remesh_roundtrip() {
        let mut mesh: HalfEdgeMesh = shapes::octahedron().unwrap();
        let stats = isotropic_remesh(&mut mesh, &RemeshOptions::default()).unwrap();

        assert_eq!(stats.iterations.len(), 5);
        assert!(mesh.is_valid());
        assert!(mesh.is_manifold());
        assert!(!mesh.has_garbage());
    }
}
