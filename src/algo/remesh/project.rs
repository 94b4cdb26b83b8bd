//! Projection of relaxed vertices back onto the surface.
//!
//! Relaxation moves vertices within their tangent planes, which slowly
//! shrinks curved surfaces. Each relaxed vertex is pushed back along its
//! normal onto one of its incident triangles as they were before relaxation.
//! Only the incident triangles are searched.

use log::warn;
use nalgebra::{Point3, Vector3};
use rayon::prelude::*;

use crate::mesh::{HalfEdgeMesh, MeshIndex, VertexId};

/// Normals closer than this to perpendicular do not intersect a face plane.
const PARALLEL_TOLERANCE: f64 = 1e-12;

/// Slack on the `[0, 1]` barycentric range for points on a triangle edge.
const BARYCENTRIC_TOLERANCE: f64 = 1e-9;

/// Vertex positions captured before relaxation.
///
/// Relaxation moves vertices but never changes connectivity, so the snapshot
/// is indexed by vertex slot. It is tied to the mesh generation it was taken
/// in and refuses to be used after a garbage collection.
#[derive(Debug, Clone)]
pub struct SurfaceSnapshot {
    positions: Vec<Point3<f64>>,
    generation: u64,
}

impl SurfaceSnapshot {
    /// Record the current position of every vertex slot.
    pub fn capture<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> Self {
        let mut positions = vec![Point3::origin(); mesh.vertex_slot_count()];
        for v in mesh.vertex_ids() {
            positions[v.index()] = *mesh.position(v);
        }
        Self {
            positions,
            generation: mesh.generation(),
        }
    }

    /// Position of `v` when the snapshot was taken.
    #[inline]
    pub fn position<I: MeshIndex>(&self, v: VertexId<I>) -> Point3<f64> {
        self.positions[v.index()]
    }

    /// Whether the snapshot still addresses the same vertices as `mesh`.
    pub fn matches<I: MeshIndex>(&self, mesh: &HalfEdgeMesh<I>) -> bool {
        self.generation == mesh.generation() && self.positions.len() == mesh.vertex_slot_count()
    }
}

/// Project every interior vertex onto the snapshot surface.
///
/// For each incident face, the vertex is moved along its cached normal onto
/// the face's plane, evaluated at snapshot positions. A candidate counts only
/// if it lands inside the triangle; the closest candidate wins. A vertex
/// without any valid candidate keeps its position. Boundary vertices never
/// move.
///
/// Returns the number of vertices projected, or 0 if the snapshot belongs to
/// a different mesh state.
pub fn project_to_surface<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    snapshot: &SurfaceSnapshot,
    parallel: bool,
) -> usize {
    if !snapshot.matches(mesh) {
        warn!("surface snapshot is stale, skipping projection");
        return 0;
    }

    let vertices: Vec<VertexId<I>> = mesh.vertex_ids().collect();

    let projected: Vec<Option<Point3<f64>>> = {
        let mesh = &*mesh;
        let compute = |&v: &VertexId<I>| projected_position(mesh, snapshot, v);
        if parallel {
            vertices.par_iter().map(compute).collect()
        } else {
            vertices.iter().map(compute).collect()
        }
    };

    let mut moved = 0;
    for (v, position) in vertices.into_iter().zip(projected) {
        if let Some(p) = position {
            mesh.set_position(v, p);
            moved += 1;
        }
    }
    moved
}

fn projected_position<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    snapshot: &SurfaceSnapshot,
    v: VertexId<I>,
) -> Option<Point3<f64>> {
    if mesh.is_boundary_vertex(v) {
        return None;
    }

    let normal = mesh.vertex_normal(v);
    if normal.norm_squared() == 0.0 {
        return None;
    }

    let p = *mesh.position(v);
    mesh.vertex_faces(v)
        .filter_map(|f| {
            let triangle = mesh.face_triangle(f).map(|u| snapshot.position(u));
            project_onto_triangle(&p, &normal, &triangle)
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(q, _)| q)
}

/// Move `p` along `direction` onto the plane of `triangle`. Returns the
/// projected point and its distance from `p`, if the point lies inside the
/// triangle.
pub(crate) fn project_onto_triangle(
    p: &Point3<f64>,
    direction: &Vector3<f64>,
    triangle: &[Point3<f64>; 3],
) -> Option<(Point3<f64>, f64)> {
    let [a, b, c] = triangle;
    let face_normal = (b - a).cross(&(c - a)).try_normalize(f64::EPSILON)?;

    let denom = direction.dot(&face_normal);
    if denom.abs() < PARALLEL_TOLERANCE {
        return None;
    }

    let centroid = Point3::from((a.coords + b.coords + c.coords) / 3.0);
    let s = (centroid - p).dot(&face_normal) / denom;
    let q = p + direction * s;

    let inside = barycentric(&q, triangle)?
        .iter()
        .all(|&w| (-BARYCENTRIC_TOLERANCE..=1.0 + BARYCENTRIC_TOLERANCE).contains(&w));

    inside.then(|| (q, (q - p).norm()))
}

/// Least-squares barycentric coordinates of `q` with respect to `triangle`,
/// or `None` if they are not finite.
pub(crate) fn barycentric(q: &Point3<f64>, triangle: &[Point3<f64>; 3]) -> Option<[f64; 3]> {
    let [a, b, c] = triangle;
    let e0 = b - a;
    let e1 = c - a;
    let e2 = q - a;

    let d00 = e0.dot(&e0);
    let d01 = e0.dot(&e1);
    let d11 = e1.dot(&e1);
    let d20 = e2.dot(&e0);
    let d21 = e2.dot(&e1);

    let denom = d00 * d11 - d01 * d01;
    let v = (d11 * d20 - d01 * d21) / denom;
    let w = (d00 * d21 - d01 * d20) / denom;
    let u = 1.0 - v - w;

    [u, v, w].iter().all(|x| x.is_finite()).then_some([u, v, w])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::shapes;

    fn center_vertex(mesh: &HalfEdgeMesh) -> VertexId {
        mesh.vertex_ids()
            .find(|&v| *mesh.position(v) == Point3::new(2.0, 2.0, 0.0))
            .unwrap()
    }

    #[test]
    fn test_barycentric() {
        let tri = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let [u, v, w] = barycentric(&Point3::new(0.25, 0.25, 0.0), &tri).unwrap();
        assert!((u - 0.5).abs() < 1e-12);
        assert!((v - 0.25).abs() < 1e-12);
        assert!((w - 0.25).abs() < 1e-12);

        let flat = [tri[0], tri[0], tri[0]];
        assert!(barycentric(&Point3::new(0.1, 0.0, 0.0), &flat).is_none());
    }

    #[test]
    fn test_project_onto_triangle() {
        let tri = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let up = Vector3::z();

        let (q, dist) = project_onto_triangle(&Point3::new(0.2, 0.2, 0.5), &up, &tri).unwrap();
        assert!((q - Point3::new(0.2, 0.2, 0.0)).norm() < 1e-12);
        assert!((dist - 0.5).abs() < 1e-12);

        // Outside the triangle
        assert!(project_onto_triangle(&Point3::new(0.8, 0.8, 0.5), &up, &tri).is_none());
        // Parallel to the plane
        assert!(project_onto_triangle(&Point3::new(0.2, 0.2, 0.5), &Vector3::x(), &tri).is_none());
    }

    #[test]
    fn test_lifted_vertex_returns_to_plane() {
        let mut mesh: HalfEdgeMesh = shapes::grid(4, 4.0).unwrap();
        let snapshot = SurfaceSnapshot::capture(&mesh);

        let v = center_vertex(&mesh);
        mesh.set_position(v, Point3::new(2.1, 2.05, 0.3));
        mesh.update_normals();

        let moved = project_to_surface(&mut mesh, &snapshot, false);

        assert!(moved > 0);
        assert!(mesh.position(v).z.abs() < 1e-12);
        for v in mesh.vertex_ids() {
            assert!(mesh.position(v).z.abs() < 1e-12);
        }
    }

    #[test]
    fn test_boundary_is_fixed() {
        let mut mesh: HalfEdgeMesh = shapes::hex_patch().unwrap();
        let snapshot = SurfaceSnapshot::capture(&mesh);
        for v in mesh.vertex_ids().collect::<Vec<_>>() {
            let p = *mesh.position(v);
            mesh.set_position(v, Point3::new(p.x, p.y, 0.2));
        }
        mesh.update_normals();

        let moved = project_to_surface(&mut mesh, &snapshot, false);

        assert_eq!(moved, 2);
        for v in mesh.vertex_ids() {
            let expected = if mesh.is_boundary_vertex(v) { 0.2 } else { 0.0 };
            assert!((mesh.position(v).z - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_stale_snapshot_is_ignored() {
        let mut mesh: HalfEdgeMesh = shapes::grid(2, 1.0).unwrap();
        let snapshot = SurfaceSnapshot::capture(&mesh);
        mesh.garbage_collect();

        assert!(!snapshot.matches(&mesh));
        assert_eq!(project_to_surface(&mut mesh, &snapshot, false), 0);
    }
}
