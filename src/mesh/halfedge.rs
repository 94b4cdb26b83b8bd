//! Half-edge mesh data structure.
//!
//! This module provides the arena-backed half-edge representation the
//! remesher mutates in place.
//!
//! # Structure
//!
//! - Half-edges are allocated in **twin pairs**: edge `e` owns half-edges
//!   `2e` and `2e + 1`, so `twin` and `edge` are index arithmetic
//! - Each half-edge knows its **origin vertex**, **next** and **prev**
//!   half-edges around its face, and its **incident face**
//! - Each vertex stores one outgoing half-edge; boundary vertices always store
//!   a boundary half-edge, which makes the boundary test O(1)
//! - Each face stores one half-edge on its boundary
//!
//! # Boundary Handling
//!
//! A boundary edge has one face half-edge and one boundary half-edge whose
//! face is invalid. Boundary half-edges are linked into loops through `next`
//! and `prev`.
//!
//! # Deletion
//!
//! Vertices, edges and faces carry a [`Status`]. Topological operations that
//! remove elements only set the deleted bit; every iterator and counter skips
//! deleted elements. [`HalfEdgeMesh::garbage_collect`] compacts the arenas and
//! invalidates every previously obtained index.

use nalgebra::{Point3, Vector3};

use super::index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};
use super::status::Status;

/// A vertex in the half-edge mesh.
#[derive(Debug, Clone)]
pub struct Vertex<I: MeshIndex = u32> {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,

    /// Cached unit normal, refreshed by [`HalfEdgeMesh::update_normals`].
    pub normal: Vector3<f64>,

    /// One outgoing half-edge from this vertex.
    /// For boundary vertices, this is guaranteed to be a boundary half-edge.
    pub halfedge: HalfEdgeId<I>,

    pub(crate) status: Status,
}

impl<I: MeshIndex> Vertex<I> {
    /// Create a new, unconnected vertex at the given position.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            normal: Vector3::zeros(),
            halfedge: HalfEdgeId::invalid(),
            status: Status::live(),
        }
    }
}

/// A half-edge in the mesh.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge<I: MeshIndex = u32> {
    /// The vertex this half-edge originates from.
    pub origin: VertexId<I>,

    /// The next half-edge around the face (counter-clockwise).
    pub next: HalfEdgeId<I>,

    /// The previous half-edge around the face.
    pub prev: HalfEdgeId<I>,

    /// The face this half-edge belongs to.
    /// Invalid for boundary half-edges.
    pub face: FaceId<I>,
}

impl<I: MeshIndex> HalfEdge<I> {
    /// Create a new unlinked half-edge leaving `origin`.
    pub fn new(origin: VertexId<I>) -> Self {
        Self {
            origin,
            next: HalfEdgeId::invalid(),
            prev: HalfEdgeId::invalid(),
            face: FaceId::invalid(),
        }
    }

    /// Check if this half-edge is on the boundary.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        !self.face.is_valid()
    }
}

/// An undirected edge; its two half-edges live at `2e` and `2e + 1`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Edge {
    pub(crate) status: Status,
}

/// A triangular face in the half-edge mesh.
#[derive(Debug, Clone, Copy)]
pub struct Face<I: MeshIndex = u32> {
    /// One half-edge on the boundary of this face.
    pub halfedge: HalfEdgeId<I>,

    /// Cached unit normal, refreshed by [`HalfEdgeMesh::update_normals`].
    pub normal: Vector3<f64>,

    pub(crate) status: Status,
}

impl<I: MeshIndex> Face<I> {
    /// Create a new face with the given half-edge.
    pub fn new(halfedge: HalfEdgeId<I>) -> Self {
        Self {
            halfedge,
            normal: Vector3::zeros(),
            status: Status::live(),
        }
    }
}

/// A half-edge mesh data structure for manifold triangle meshes.
///
/// The mesh is the single owner of all elements and the only mutator of
/// connectivity. Remeshing stages borrow it mutably, one at a time.
#[derive(Debug, Clone)]
pub struct HalfEdgeMesh<I: MeshIndex = u32> {
    pub(crate) vertices: Vec<Vertex<I>>,
    pub(crate) halfedges: Vec<HalfEdge<I>>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) faces: Vec<Face<I>>,
    pub(crate) generation: u64,
}

impl<I: MeshIndex> Default for HalfEdgeMesh<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            halfedges: Vec::new(),
            edges: Vec::new(),
            faces: Vec::new(),
            generation: 0,
        }
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(num_vertices: usize, num_faces: usize) -> Self {
        // Closed mesh: E = 3F/2. Leave some slack for boundary edges.
        let num_edges = num_faces * 3 / 2 + num_faces / 4 + 1;

        Self {
            vertices: Vec::with_capacity(num_vertices),
            halfedges: Vec::with_capacity(2 * num_edges),
            edges: Vec::with_capacity(num_edges),
            faces: Vec::with_capacity(num_faces),
            generation: 0,
        }
    }

    // ==================== Counts ====================

    /// Number of live vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.iter().filter(|v| !v.status.is_deleted()).count()
    }

    /// Number of live edges.
    pub fn num_edges(&self) -> usize {
        self.edges.iter().filter(|e| !e.status.is_deleted()).count()
    }

    /// Number of live half-edges (two per live edge).
    pub fn num_halfedges(&self) -> usize {
        2 * self.num_edges()
    }

    /// Number of live faces.
    pub fn num_faces(&self) -> usize {
        self.faces.iter().filter(|f| !f.status.is_deleted()).count()
    }

    /// Number of vertex slots, live or deleted. Vertex indices are below this.
    #[inline]
    pub fn vertex_slot_count(&self) -> usize {
        self.vertices.len()
    }

    /// Whether any element is currently tombstoned.
    pub fn has_garbage(&self) -> bool {
        self.vertices.iter().any(|v| v.status.is_deleted())
            || self.edges.iter().any(|e| e.status.is_deleted())
            || self.faces.iter().any(|f| f.status.is_deleted())
    }

    /// Counter bumped by every [`garbage_collect`](Self::garbage_collect).
    ///
    /// Indices obtained under one generation must not be used under another.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    // ==================== Liveness ====================

    /// Whether `v` addresses a live vertex.
    #[inline]
    pub fn is_live_vertex(&self, v: VertexId<I>) -> bool {
        v.is_valid()
            && self
                .vertices
                .get(v.index())
                .is_some_and(|v| !v.status.is_deleted())
    }

    /// Whether `e` addresses a live edge.
    #[inline]
    pub fn is_live_edge(&self, e: EdgeId<I>) -> bool {
        e.is_valid()
            && self
                .edges
                .get(e.index())
                .is_some_and(|e| !e.status.is_deleted())
    }

    /// Whether `he` addresses a half-edge of a live edge.
    #[inline]
    pub fn is_live_halfedge(&self, he: HalfEdgeId<I>) -> bool {
        he.is_valid() && self.is_live_edge(he.edge())
    }

    /// Whether `f` addresses a live face.
    #[inline]
    pub fn is_live_face(&self, f: FaceId<I>) -> bool {
        f.is_valid()
            && self
                .faces
                .get(f.index())
                .is_some_and(|f| !f.status.is_deleted())
    }

    // ==================== Accessors ====================

    /// Get a vertex by ID.
    #[inline]
    pub fn vertex(&self, id: VertexId<I>) -> &Vertex<I> {
        let v = &self.vertices[id.index()];
        debug_assert!(!v.status.is_deleted(), "access to deleted {:?}", id);
        v
    }

    #[inline]
    pub(crate) fn vertex_mut(&mut self, id: VertexId<I>) -> &mut Vertex<I> {
        &mut self.vertices[id.index()]
    }

    /// Get a half-edge by ID.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId<I>) -> &HalfEdge<I> {
        debug_assert!(
            !self.edges[id.index() >> 1].status.is_deleted(),
            "access to deleted {:?}",
            id
        );
        &self.halfedges[id.index()]
    }

    #[inline]
    pub(crate) fn halfedge_mut(&mut self, id: HalfEdgeId<I>) -> &mut HalfEdge<I> {
        &mut self.halfedges[id.index()]
    }

    /// Get a face by ID.
    #[inline]
    pub fn face(&self, id: FaceId<I>) -> &Face<I> {
        let f = &self.faces[id.index()];
        debug_assert!(!f.status.is_deleted(), "access to deleted {:?}", id);
        f
    }

    #[inline]
    pub(crate) fn face_mut(&mut self, id: FaceId<I>) -> &mut Face<I> {
        &mut self.faces[id.index()]
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId<I>) -> &Point3<f64> {
        &self.vertex(v).position
    }

    /// Set the position of a vertex. Cached normals are not refreshed.
    #[inline]
    pub fn set_position(&mut self, v: VertexId<I>, pos: Point3<f64>) {
        self.vertex_mut(v).position = pos;
    }

    // ==================== Topology Queries ====================

    /// Get the twin (opposite) half-edge.
    #[inline]
    pub fn twin(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        he.twin()
    }

    /// Get the next half-edge around the face.
    #[inline]
    pub fn next(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).next
    }

    /// Get the previous half-edge around the face.
    #[inline]
    pub fn prev(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).prev
    }

    /// Get the origin vertex of a half-edge.
    #[inline]
    pub fn origin(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.halfedge(he).origin
    }

    /// Get the destination vertex of a half-edge.
    #[inline]
    pub fn dest(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.origin(he.twin())
    }

    /// Get the face of a half-edge.
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId<I>) -> FaceId<I> {
        self.halfedge(he).face
    }

    /// The two endpoints of an edge, in the direction of its first half-edge.
    #[inline]
    pub fn edge_vertices(&self, e: EdgeId<I>) -> [VertexId<I>; 2] {
        let he = e.halfedge(0);
        [self.origin(he), self.dest(he)]
    }

    /// The vertex opposite to `he` in its face, or invalid for a boundary half-edge.
    #[inline]
    pub fn apex(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        if self.is_boundary_halfedge(he) {
            VertexId::invalid()
        } else {
            self.dest(self.next(he))
        }
    }

    /// Find the half-edge going from `from` to `to`, if the two are connected.
    pub fn find_halfedge(&self, from: VertexId<I>, to: VertexId<I>) -> Option<HalfEdgeId<I>> {
        self.vertex_halfedges(from).find(|&he| self.dest(he) == to)
    }

    /// Check if a half-edge is on the boundary.
    #[inline]
    pub fn is_boundary_halfedge(&self, he: HalfEdgeId<I>) -> bool {
        self.halfedge(he).is_boundary()
    }

    /// Check if an edge is on the boundary (exactly one incident face).
    #[inline]
    pub fn is_boundary_edge(&self, e: EdgeId<I>) -> bool {
        self.is_boundary_halfedge(e.halfedge(0)) || self.is_boundary_halfedge(e.halfedge(1))
    }

    /// Check if a vertex is on the boundary.
    ///
    /// Isolated vertices count as boundary.
    #[inline]
    pub fn is_boundary_vertex(&self, v: VertexId<I>) -> bool {
        let he = self.vertex(v).halfedge;
        !he.is_valid() || self.is_boundary_halfedge(he)
    }

    /// Number of live edges incident to a vertex.
    pub fn degree(&self, v: VertexId<I>) -> usize {
        self.vertex_halfedges(v).count()
    }

    /// Alias of [`degree`](Self::degree).
    #[inline]
    pub fn valence(&self, v: VertexId<I>) -> usize {
        self.degree(v)
    }

    // ==================== Iteration ====================

    /// Iterate over all live vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.status.is_deleted())
            .map(|(i, _)| VertexId::new(i))
    }

    /// Iterate over all live edge IDs.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId<I>> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.status.is_deleted())
            .map(|(i, _)| EdgeId::new(i))
    }

    /// Iterate over all live half-edge IDs.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId<I>> + '_ {
        self.edge_ids()
            .flat_map(|e| [e.halfedge(0), e.halfedge(1)])
    }

    /// Iterate over all live face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        self.faces
            .iter()
            .enumerate()
            .filter(|(_, f)| !f.status.is_deleted())
            .map(|(i, _)| FaceId::new(i))
    }

    /// Iterate over half-edges around a vertex (outgoing half-edges).
    pub fn vertex_halfedges(&self, v: VertexId<I>) -> VertexHalfEdgeIter<'_, I> {
        VertexHalfEdgeIter::new(self, v)
    }

    /// Iterate over vertices adjacent to a vertex.
    pub fn vertex_neighbors(&self, v: VertexId<I>) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.vertex_halfedges(v).map(|he| self.dest(he))
    }

    /// Iterate over edges incident to a vertex.
    pub fn vertex_edges(&self, v: VertexId<I>) -> impl Iterator<Item = EdgeId<I>> + '_ {
        self.vertex_halfedges(v).map(|he| he.edge())
    }

    /// Iterate over faces adjacent to a vertex.
    pub fn vertex_faces(&self, v: VertexId<I>) -> impl Iterator<Item = FaceId<I>> + '_ {
        self.vertex_halfedges(v).filter_map(|he| {
            let f = self.face_of(he);
            f.is_valid().then_some(f)
        })
    }

    /// Iterate over half-edges around a face.
    pub fn face_halfedges(&self, f: FaceId<I>) -> FaceHalfEdgeIter<'_, I> {
        FaceHalfEdgeIter::new(self, f)
    }

    /// Iterate over vertices of a face.
    pub fn face_vertices(&self, f: FaceId<I>) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.face_halfedges(f).map(|he| self.origin(he))
    }

    /// Get the three vertices of a triangular face.
    pub fn face_triangle(&self, f: FaceId<I>) -> [VertexId<I>; 3] {
        let he0 = self.face(f).halfedge;
        let he1 = self.next(he0);
        let he2 = self.next(he1);
        [self.origin(he0), self.origin(he1), self.origin(he2)]
    }

    /// Get the positions of the three vertices of a triangular face.
    pub fn face_positions(&self, f: FaceId<I>) -> [Point3<f64>; 3] {
        let [v0, v1, v2] = self.face_triangle(f);
        [*self.position(v0), *self.position(v1), *self.position(v2)]
    }

    // ==================== Geometry ====================

    /// Compute the unit normal of a face from current positions.
    ///
    /// Degenerate faces yield a zero vector.
    pub fn compute_face_normal(&self, f: FaceId<I>) -> Vector3<f64> {
        let [p0, p1, p2] = self.face_positions(f);
        let n = (p1 - p0).cross(&(p2 - p0));
        n.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::zeros)
    }

    /// Compute the area-weighted unit normal at a vertex from current positions.
    pub fn compute_vertex_normal(&self, v: VertexId<I>) -> Vector3<f64> {
        let mut normal = Vector3::zeros();
        for f in self.vertex_faces(v) {
            let [p0, p1, p2] = self.face_positions(f);
            normal += (p1 - p0).cross(&(p2 - p0));
        }
        normal.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::zeros)
    }

    /// Cached face normal.
    #[inline]
    pub fn face_normal(&self, f: FaceId<I>) -> Vector3<f64> {
        self.face(f).normal
    }

    /// Cached vertex normal.
    #[inline]
    pub fn vertex_normal(&self, v: VertexId<I>) -> Vector3<f64> {
        self.vertex(v).normal
    }

    /// Recompute every cached face and vertex normal.
    ///
    /// Vertex normals are the normalized sum of area-weighted face normals.
    pub fn update_normals(&mut self) {
        let mut vertex_normals = vec![Vector3::zeros(); self.vertices.len()];

        let face_ids: Vec<FaceId<I>> = self.face_ids().collect();
        for f in face_ids {
            let [v0, v1, v2] = self.face_triangle(f);
            let [p0, p1, p2] = self.face_positions(f);
            let weighted = (p1 - p0).cross(&(p2 - p0));

            vertex_normals[v0.index()] += weighted;
            vertex_normals[v1.index()] += weighted;
            vertex_normals[v2.index()] += weighted;

            self.face_mut(f).normal = weighted
                .try_normalize(f64::EPSILON)
                .unwrap_or_else(Vector3::zeros);
        }

        for (vertex, n) in self.vertices.iter_mut().zip(vertex_normals) {
            vertex.normal = n.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::zeros);
        }
    }

    /// Compute the area of a face.
    pub fn face_area(&self, f: FaceId<I>) -> f64 {
        let [p0, p1, p2] = self.face_positions(f);
        0.5 * (p1 - p0).cross(&(p2 - p0)).norm()
    }

    /// Compute the centroid of a face.
    pub fn face_centroid(&self, f: FaceId<I>) -> Point3<f64> {
        let [p0, p1, p2] = self.face_positions(f);
        Point3::from((p0.coords + p1.coords + p2.coords) / 3.0)
    }

    /// Length of the segment spanned by a half-edge.
    pub fn halfedge_length(&self, he: HalfEdgeId<I>) -> f64 {
        (self.position(self.dest(he)) - self.position(self.origin(he))).norm()
    }

    /// Euclidean length of an edge.
    #[inline]
    pub fn edge_length(&self, e: EdgeId<I>) -> f64 {
        self.halfedge_length(e.halfedge(0))
    }

    /// Mean length over all live edges, or 0 for a mesh without edges.
    pub fn average_edge_length(&self) -> f64 {
        let (total, count) = self
            .edge_ids()
            .fold((0.0, 0usize), |(total, count), e| (total + self.edge_length(e), count + 1));

        if count == 0 {
            0.0
        } else {
            total / count as f64
        }
    }

    /// Compute the edge vector (from origin to destination).
    pub fn edge_vector(&self, he: HalfEdgeId<I>) -> Vector3<f64> {
        self.position(self.dest(he)) - self.position(self.origin(he))
    }

    /// Midpoint of an edge.
    pub fn edge_midpoint(&self, e: EdgeId<I>) -> Point3<f64> {
        let [a, b] = self.edge_vertices(e);
        Point3::from((self.position(a).coords + self.position(b).coords) * 0.5)
    }

    /// Compute the bounding box of the live vertices.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let mut live = self.vertex_ids().map(|v| *self.position(v));
        let first = live.next()?;

        Some(live.fold((first, first), |(mut min, mut max), p| {
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
            (min, max)
        }))
    }

    /// Compute the total surface area of the mesh.
    pub fn surface_area(&self) -> f64 {
        self.face_ids().map(|f| self.face_area(f)).sum()
    }

    // ==================== Construction ====================

    /// Add a new, unconnected vertex and return its ID.
    ///
    /// A vertex that never receives a face is removed by the next
    /// [`garbage_collect`](Self::garbage_collect).
    pub fn add_vertex(&mut self, position: Point3<f64>) -> VertexId<I> {
        let id = VertexId::new(self.vertices.len());
        self.vertices.push(Vertex::new(position));
        id
    }

    /// Allocate a new edge from `from` to `to`, returning the half-edge
    /// leaving `from`. Links are left for the caller to set.
    pub(crate) fn new_edge(&mut self, from: VertexId<I>, to: VertexId<I>) -> HalfEdgeId<I> {
        let e = EdgeId::<I>::new(self.edges.len());
        self.edges.push(Edge::default());
        self.halfedges.push(HalfEdge::new(from));
        self.halfedges.push(HalfEdge::new(to));
        e.halfedge(0)
    }

    pub(crate) fn new_face(&mut self, halfedge: HalfEdgeId<I>) -> FaceId<I> {
        let id = FaceId::new(self.faces.len());
        self.faces.push(Face::new(halfedge));
        id
    }

    /// Make `next` follow `prev` in a face or boundary loop.
    #[inline]
    pub(crate) fn link(&mut self, prev: HalfEdgeId<I>, next: HalfEdgeId<I>) {
        self.halfedge_mut(prev).next = next;
        self.halfedge_mut(next).prev = prev;
    }

    /// Point the vertex at a boundary outgoing half-edge if it has one.
    pub(crate) fn adjust_outgoing_halfedge(&mut self, v: VertexId<I>) {
        if let Some(he) = self
            .vertex_halfedges(v)
            .find(|&he| self.is_boundary_halfedge(he))
        {
            self.vertex_mut(v).halfedge = he;
        }
    }

    // ==================== Validation ====================

    /// Check that all connectivity among live elements is consistent.
    pub fn is_valid(&self) -> bool {
        for v in self.vertex_ids() {
            let he = self.vertices[v.index()].halfedge;
            if !he.is_valid() {
                continue;
            }
            if !self.is_live_halfedge(he) || self.halfedges[he.index()].origin != v {
                return false;
            }
        }

        for e in self.edge_ids() {
            let h0 = e.halfedge(0);
            let h1 = e.halfedge(1);
            if self.halfedges[h0.index()].is_boundary() && self.halfedges[h1.index()].is_boundary()
            {
                return false;
            }

            for he in [h0, h1] {
                let h = &self.halfedges[he.index()];
                if !self.is_live_vertex(h.origin) {
                    return false;
                }
                if !self.is_live_halfedge(h.next) || !self.is_live_halfedge(h.prev) {
                    return false;
                }
                if self.halfedges[h.next.index()].prev != he
                    || self.halfedges[h.prev.index()].next != he
                {
                    return false;
                }
                // The next half-edge must start where this one ends.
                if self.halfedges[h.next.index()].origin != self.halfedges[he.twin().index()].origin
                {
                    return false;
                }
                if h.origin == self.halfedges[he.twin().index()].origin {
                    return false;
                }
                if h.face.is_valid() && !self.is_live_face(h.face) {
                    return false;
                }
            }
        }

        for f in self.face_ids() {
            let start = self.faces[f.index()].halfedge;
            if !self.is_live_halfedge(start) {
                return false;
            }
            let mut he = start;
            for _ in 0..3 {
                if self.halfedges[he.index()].face != f {
                    return false;
                }
                he = self.halfedges[he.index()].next;
            }
            if he != start {
                return false;
            }
        }

        true
    }

    /// Check that every vertex fan is a single disk or half-disk.
    ///
    /// Edges can never carry more than two faces in this representation, so
    /// vertex fans are the only place non-manifoldness can appear.
    pub fn is_manifold(&self) -> bool {
        let mut outgoing = vec![0usize; self.vertices.len()];
        for he in self.halfedge_ids() {
            outgoing[self.origin(he).index()] += 1;
        }

        let limit = self.halfedges.len();
        for v in self.vertex_ids() {
            let start = self.vertex(v).halfedge;
            if !start.is_valid() {
                continue;
            }

            let mut count = 0;
            let mut boundary = 0;
            let mut he = start;
            loop {
                count += 1;
                if self.is_boundary_halfedge(he) {
                    boundary += 1;
                }
                he = self.next(he.twin());
                if he == start || count > limit {
                    break;
                }
            }

            if count != outgoing[v.index()] || boundary > 1 {
                return false;
            }
        }

        true
    }
}

/// Iterator over outgoing half-edges around a vertex.
pub struct VertexHalfEdgeIter<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    done: bool,
}

impl<'a, I: MeshIndex> VertexHalfEdgeIter<'a, I> {
    fn new(mesh: &'a HalfEdgeMesh<I>, v: VertexId<I>) -> Self {
        let start = mesh.vertex(v).halfedge;
        Self {
            mesh,
            start,
            current: start,
            done: !start.is_valid(),
        }
    }
}

impl<'a, I: MeshIndex> Iterator for VertexHalfEdgeIter<'a, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;

        // If he goes v -> w, twin(he) goes w -> v and the half-edge after it
        // leaves v again.
        self.current = self.mesh.next(self.current.twin());

        if self.current == self.start {
            self.done = true;
        }

        Some(result)
    }
}

/// Iterator over half-edges around a face.
pub struct FaceHalfEdgeIter<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    done: bool,
}

impl<'a, I: MeshIndex> FaceHalfEdgeIter<'a, I> {
    fn new(mesh: &'a HalfEdgeMesh<I>, f: FaceId<I>) -> Self {
        let start = mesh.face(f).halfedge;
        Self {
            mesh,
            start,
            current: start,
            done: !start.is_valid(),
        }
    }
}

impl<'a, I: MeshIndex> Iterator for FaceHalfEdgeIter<'a, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;
        self.current = self.mesh.next(self.current);

        if self.current == self.start {
            self.done = true;
        }

        Some(result)
    }
}
