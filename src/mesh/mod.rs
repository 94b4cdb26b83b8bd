//! Core mesh data structures.
//!
//! This module provides the half-edge mesh the remesher operates on, together
//! with the topological operators it is built from.
//!
//! # Overview
//!
//! The primary type is [`HalfEdgeMesh`], an arena-backed half-edge
//! (doubly-connected edge list) structure. Adjacency queries are O(1) and
//! every vertex one-ring can be walked without allocation.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`VertexId`] - Identifies a vertex
//! - [`HalfEdgeId`] - Identifies a half-edge
//! - [`FaceId`] - Identifies a face
//! - [`EdgeId`] - Identifies a full edge
//!
//! These indices are generic over the underlying integer type ([`MeshIndex`] trait),
//! allowing you to choose `u16`, `u32`, or `u64` based on mesh size.
//!
//! # Mutation
//!
//! [`HalfEdgeMesh::split_edge`], [`HalfEdgeMesh::collapse`] and
//! [`HalfEdgeMesh::flip_edge`] tombstone what they remove; call
//! [`HalfEdgeMesh::garbage_collect`] to compact storage. Compaction renumbers
//! every element.
//!
//! # Construction
//!
//! Meshes are constructed from face-vertex lists, or taken from [`shapes`]:
//!
//! ```
//! use isomesh::mesh::{HalfEdgeMesh, build_from_triangles};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let faces = vec![[0, 1, 2]];
//!
//! let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
//! ```

mod builder;
mod halfedge;
mod index;
pub mod shapes;
mod status;
mod topology;

pub use builder::{build_from_triangles, to_face_vertex};
pub use halfedge::{Edge, Face, FaceHalfEdgeIter, HalfEdge, HalfEdgeMesh, Vertex, VertexHalfEdgeIter};
pub use index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};
pub use status::Status;
pub use topology::GarbageCollection;
