//! Topological mutations: edge split, half-edge collapse, edge flip and
//! garbage collection.
//!
//! Every mutation either completes atomically or leaves the mesh untouched.
//! Collapse and flip check their own preconditions and return `false` when
//! the operation would break manifoldness; the remeshing stages treat that as
//! "skip this candidate".

use std::collections::HashSet;

use nalgebra::Point3;

use super::halfedge::HalfEdgeMesh;
use super::index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};

/// Summary of a [`HalfEdgeMesh::garbage_collect`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GarbageCollection {
    /// Vertices removed (tombstoned or isolated).
    pub vertices: usize,
    /// Edges removed.
    pub edges: usize,
    /// Faces removed.
    pub faces: usize,
}

impl<I: MeshIndex> HalfEdgeMesh<I> {
    // ==================== Split ====================

    /// Split an edge by inserting a new vertex at `position`.
    ///
    /// Each incident triangle is replaced by two, so an interior edge turns
    /// 2 triangles into 4 and a boundary edge turns 1 into 2. The original
    /// edge keeps its index and now joins its first endpoint to the new vertex.
    /// Always legal on a live edge of a manifold triangle mesh.
    ///
    /// # Example
    /// ```
    /// use isomesh::mesh::{shapes, HalfEdgeMesh};
    ///
    /// let mut mesh: HalfEdgeMesh = shapes::unit_quad().unwrap();
    /// let diagonal = mesh.edge_ids().find(|&e| !mesh.is_boundary_edge(e)).unwrap();
    /// let mid = mesh.edge_midpoint(diagonal);
    /// let v = mesh.split_edge(diagonal, mid);
    ///
    /// assert_eq!(mesh.num_vertices(), 5);
    /// assert_eq!(mesh.num_faces(), 4);
    /// assert_eq!(mesh.degree(v), 4);
    /// ```
    pub fn split_edge(&mut self, e: EdgeId<I>, position: Point3<f64>) -> VertexId<I> {
        debug_assert!(self.is_live_edge(e), "split of dead {:?}", e);

        let h0 = e.halfedge(0);
        let h1 = e.halfedge(1);
        let b = self.origin(h1);

        let m = self.add_vertex(position);

        // h0 becomes a -> m, h1 becomes m -> a; the new edge carries m -> b / b -> m.
        let h2 = self.new_edge(m, b);
        let h3 = h2.twin();
        self.halfedge_mut(h1).origin = m;

        self.split_side(h0, h2, h0);
        self.split_side(h3, h1, h1);

        if self.vertex(b).halfedge == h1 {
            self.vertex_mut(b).halfedge = h3;
        }
        self.vertex_mut(m).halfedge = h2;
        self.adjust_outgoing_halfedge(m);

        m
    }

    /// Rewire one side of a split. `first` ends at the new vertex and
    /// `second` leaves it; together they replace `anchor`, the half-edge that
    /// still holds the old loop links.
    fn split_side(&mut self, first: HalfEdgeId<I>, second: HalfEdgeId<I>, anchor: HalfEdgeId<I>) {
        let old_prev = self.prev(anchor);
        let old_next = self.next(anchor);
        let face = self.face_of(anchor);

        if !face.is_valid() {
            self.halfedge_mut(first).face = FaceId::invalid();
            self.halfedge_mut(second).face = FaceId::invalid();
            self.link(old_prev, first);
            self.link(first, second);
            self.link(second, old_next);
            return;
        }

        // Triangle (x -> y -> c): first is x -> m, second is m -> y,
        // old_next is y -> c, old_prev is c -> x.
        let c = self.origin(old_prev);
        let m = self.dest(first);

        let to_c = self.new_edge(m, c);
        let from_c = to_c.twin();

        // Keep the old face on the `first` side: x -> m -> c.
        self.halfedge_mut(first).face = face;
        self.halfedge_mut(to_c).face = face;
        self.link(first, to_c);
        self.link(to_c, old_prev);
        self.link(old_prev, first);
        self.face_mut(face).halfedge = first;

        // New face on the `second` side: m -> y -> c.
        let new_face = self.new_face(second);
        self.halfedge_mut(second).face = new_face;
        self.halfedge_mut(old_next).face = new_face;
        self.halfedge_mut(from_c).face = new_face;
        self.link(second, old_next);
        self.link(old_next, from_c);
        self.link(from_c, second);
    }

    // ==================== Collapse ====================

    /// Check whether collapsing `he` (moving its origin onto its destination)
    /// keeps the mesh manifold.
    ///
    /// Refused when:
    /// - the edge or an endpoint is deleted
    /// - both sides lack an apex, or both apexes are the same vertex
    /// - the edge is interior but joins two boundary vertices
    /// - the one-rings of the endpoints share a vertex other than the apexes
    ///   (the link condition)
    /// - an apex would be left without a proper fan (interior apex with degree
    ///   3, boundary apex with degree 2)
    pub fn is_collapse_legal(&self, he: HalfEdgeId<I>) -> bool {
        if !self.is_live_halfedge(he) {
            return false;
        }

        let v0 = self.origin(he);
        let v1 = self.dest(he);
        if !self.is_live_vertex(v0) || !self.is_live_vertex(v1) {
            return false;
        }

        let vl = self.apex(he);
        let vr = self.apex(he.twin());
        if vl == vr {
            return false;
        }

        if self.is_boundary_vertex(v0)
            && self.is_boundary_vertex(v1)
            && !self.is_boundary_edge(he.edge())
        {
            return false;
        }

        let ring1: HashSet<VertexId<I>> = self.vertex_neighbors(v1).collect();
        let violates_link = self
            .vertex_neighbors(v0)
            .any(|n| n != v1 && n != vl && n != vr && ring1.contains(&n));
        if violates_link {
            return false;
        }

        for apex in [vl, vr] {
            if !apex.is_valid() {
                continue;
            }
            let min_degree = if self.is_boundary_vertex(apex) { 3 } else { 4 };
            if self.degree(apex) < min_degree {
                return false;
            }
        }

        true
    }

    /// Collapse half-edge `he`: its origin is removed and every edge of the
    /// origin is reattached to the destination, which keeps its position.
    ///
    /// Returns `false` and leaves the mesh untouched if
    /// [`is_collapse_legal`](Self::is_collapse_legal) refuses the collapse.
    /// The removed vertex, the collapsed edge, the faces incident to it and
    /// one edge of each such face are tombstoned.
    pub fn collapse(&mut self, he: HalfEdgeId<I>) -> bool {
        if !self.is_collapse_legal(he) {
            return false;
        }

        let o = he.twin();
        let v0 = self.origin(he);
        let v1 = self.dest(he);

        let hn = self.next(he);
        let hp = self.prev(he);
        let on = self.next(o);
        let op = self.prev(o);
        let fh = self.face_of(he);
        let fo = self.face_of(o);

        let outgoing: Vec<HalfEdgeId<I>> = self.vertex_halfedges(v0).collect();
        for h in outgoing {
            self.halfedge_mut(h).origin = v1;
        }

        self.link(hp, hn);
        self.link(op, on);

        if fh.is_valid() {
            self.face_mut(fh).halfedge = hn;
        }
        if fo.is_valid() {
            self.face_mut(fo).halfedge = on;
        }

        if self.vertex(v1).halfedge == o {
            self.vertex_mut(v1).halfedge = hn;
        }

        self.vertex_mut(v0).halfedge = HalfEdgeId::invalid();
        self.vertex_mut(v0).status.set_deleted(true);
        self.edges[he.edge().index()].status.set_deleted(true);

        if self.next(self.next(hn)) == hn {
            self.remove_loop(hn);
        }
        if self.next(self.next(on)) == on {
            self.remove_loop(on);
        }

        self.adjust_outgoing_halfedge(v1);
        true
    }

    /// Remove a two-edge loop left behind by a collapse. `h0` and its edge
    /// disappear together with the loop's face; `next(h0)` takes the place of
    /// `twin(h0)` in the neighbouring loop.
    fn remove_loop(&mut self, h0: HalfEdgeId<I>) {
        let h1 = self.next(h0);
        let o0 = h0.twin();
        let x = self.origin(h0);
        let y = self.origin(h1);
        let f = self.face_of(h0);
        let fo = self.face_of(o0);

        let before = self.prev(o0);
        let after = self.next(o0);
        self.link(before, h1);
        self.link(h1, after);
        self.halfedge_mut(h1).face = fo;

        self.vertex_mut(y).halfedge = h1;
        self.vertex_mut(x).halfedge = h1.twin();

        if fo.is_valid() && self.face(fo).halfedge == o0 {
            self.face_mut(fo).halfedge = h1;
        }

        if f.is_valid() {
            self.faces[f.index()].status.set_deleted(true);
        }
        self.edges[h0.edge().index()].status.set_deleted(true);

        self.adjust_outgoing_halfedge(x);
        self.adjust_outgoing_halfedge(y);
    }

    // ==================== Flip ====================

    /// Check whether an edge can be flipped.
    ///
    /// The edge must be live and interior, and its two apex vertices must be
    /// distinct and not already connected.
    pub fn is_flip_legal(&self, e: EdgeId<I>) -> bool {
        if !self.is_live_edge(e) || self.is_boundary_edge(e) {
            return false;
        }

        let h = e.halfedge(0);
        let c = self.apex(h);
        let d = self.apex(h.twin());
        if c == d {
            return false;
        }

        self.find_halfedge(c, d).is_none()
    }

    /// Flip an interior edge so that it joins the two apex vertices.
    ///
    /// Triangles `(a, b, c)` and `(b, a, d)` become `(a, d, c)` and `(b, c, d)`.
    /// Returns `false` and leaves the mesh untouched if the flip is illegal.
    pub fn flip_edge(&mut self, e: EdgeId<I>) -> bool {
        if !self.is_flip_legal(e) {
            return false;
        }

        let h = e.halfedge(0);
        let o = h.twin();
        let a = self.origin(h);
        let b = self.origin(o);

        let hn = self.next(h);
        let hp = self.prev(h);
        let on = self.next(o);
        let op = self.prev(o);
        let c = self.origin(hp);
        let d = self.origin(op);
        let fh = self.face_of(h);
        let fo = self.face_of(o);

        self.halfedge_mut(h).origin = d;
        self.halfedge_mut(o).origin = c;

        // (a, d, c)
        self.link(on, h);
        self.link(h, hp);
        self.link(hp, on);
        self.halfedge_mut(on).face = fh;
        self.face_mut(fh).halfedge = h;

        // (b, c, d)
        self.link(hn, o);
        self.link(o, op);
        self.link(op, hn);
        self.halfedge_mut(hn).face = fo;
        self.face_mut(fo).halfedge = o;

        if self.vertex(a).halfedge == h {
            self.vertex_mut(a).halfedge = on;
        }
        if self.vertex(b).halfedge == o {
            self.vertex_mut(b).halfedge = hn;
        }

        true
    }

    // ==================== Garbage Collection ====================

    /// Physically remove tombstoned elements and isolated vertices, and
    /// renumber the survivors densely.
    ///
    /// **Every** vertex, half-edge, edge and face index obtained before this
    /// call is invalidated; [`generation`](Self::generation) is bumped so
    /// holders can tell.
    pub fn garbage_collect(&mut self) -> GarbageCollection {
        for vertex in &mut self.vertices {
            if !vertex.halfedge.is_valid() {
                vertex.status.set_deleted(true);
            }
        }

        let vertex_map = compact(&mut self.vertices, |v| v.status.is_deleted());
        let face_map = compact(&mut self.faces, |f| f.status.is_deleted());

        let edges_before = self.edges.len();
        let edge_alive: Vec<bool> = self.edges.iter().map(|e| !e.status.is_deleted()).collect();
        let mut edge_map = vec![usize::MAX; edges_before];
        let mut next_edge = 0;
        for (old, &alive) in edge_alive.iter().enumerate() {
            if alive {
                edge_map[old] = next_edge;
                self.edges[next_edge] = self.edges[old];
                self.halfedges[2 * next_edge] = self.halfedges[2 * old];
                self.halfedges[2 * next_edge + 1] = self.halfedges[2 * old + 1];
                next_edge += 1;
            }
        }
        self.edges.truncate(next_edge);
        self.halfedges.truncate(2 * next_edge);

        let map_he = |he: HalfEdgeId<I>| -> HalfEdgeId<I> {
            if he.is_valid() {
                HalfEdgeId::new(2 * edge_map[he.index() >> 1] + (he.index() & 1))
            } else {
                he
            }
        };

        for v in &mut self.vertices {
            v.halfedge = map_he(v.halfedge);
        }
        for f in &mut self.faces {
            f.halfedge = map_he(f.halfedge);
        }
        for h in &mut self.halfedges {
            h.origin = VertexId::new(vertex_map[h.origin.index()]);
            h.next = map_he(h.next);
            h.prev = map_he(h.prev);
            if h.face.is_valid() {
                h.face = FaceId::new(face_map[h.face.index()]);
            }
        }

        self.generation += 1;

        GarbageCollection {
            vertices: vertex_map.len() - self.vertices.len(),
            edges: edges_before - self.edges.len(),
            faces: face_map.len() - self.faces.len(),
        }
    }
}

/// Stable in-place compaction. Returns the old-index -> new-index map
/// (`usize::MAX` for removed slots).
fn compact<T>(items: &mut Vec<T>, removed: impl Fn(&T) -> bool) -> Vec<usize> {
    let mut map = vec![usize::MAX; items.len()];
    let mut next = 0;
    for old in 0..items.len() {
        if !removed(&items[old]) {
            map[old] = next;
            items.swap(next, old);
            next += 1;
        }
    }
    items.truncate(next);
    map
}
