//! Small built-in meshes.
//!
//! These are the test surfaces the remesher is exercised on: open patches
//! with boundary, closed polyhedra, and a parametric grid for scaling runs.

use nalgebra::Point3;

use super::builder::build_from_triangles;
use super::halfedge::HalfEdgeMesh;
use super::index::MeshIndex;
use crate::error::{MeshError, Result};

/// Unit square in the XY plane, split along the `0-2` diagonal.
///
/// ```text
/// 3 ---- 2
/// |    / |
/// |  /   |
/// 0 ---- 1
/// ```
pub fn unit_quad<I: MeshIndex>() -> Result<HalfEdgeMesh<I>> {
    let vertices = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
    ];
    build_from_triangles(&vertices, &[[0, 1, 2], [0, 2, 3]])
}

/// Axis-aligned unit cube with outward-facing triangles.
pub fn unit_cube<I: MeshIndex>() -> Result<HalfEdgeMesh<I>> {
    // Vertex i sits at (i & 1, (i >> 1) & 1, (i >> 2) & 1).
    let vertices: Vec<Point3<f64>> = (0..8)
        .map(|i| Point3::new((i & 1) as f64, ((i >> 1) & 1) as f64, ((i >> 2) & 1) as f64))
        .collect();

    let faces = [
        [0, 2, 3],
        [0, 3, 1],
        [4, 5, 7],
        [4, 7, 6],
        [0, 1, 5],
        [0, 5, 4],
        [2, 6, 7],
        [2, 7, 3],
        [0, 4, 6],
        [0, 6, 2],
        [1, 3, 7],
        [1, 7, 5],
    ];
    build_from_triangles(&vertices, &faces)
}

/// Planar patch of ten triangles in three staggered rows (3, 4 and 3
/// vertices). The two middle vertices are interior with six neighbours each.
pub fn hex_patch<I: MeshIndex>() -> Result<HalfEdgeMesh<I>> {
    let vertices = [
        Point3::new(0.0, 2.0, 0.0),
        Point3::new(1.0, 2.0, 0.0),
        Point3::new(2.0, 2.0, 0.0),
        Point3::new(-0.5, 1.0, 0.0),
        Point3::new(0.5, 1.0, 0.0),
        Point3::new(1.5, 1.0, 0.0),
        Point3::new(2.5, 1.0, 0.0),
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(2.0, 0.0, 0.0),
    ];
    let faces = [
        [0, 3, 4],
        [1, 0, 4],
        [1, 4, 5],
        [1, 5, 2],
        [2, 5, 6],
        [3, 7, 4],
        [4, 7, 8],
        [4, 8, 5],
        [5, 8, 9],
        [5, 9, 6],
    ];
    build_from_triangles(&vertices, &faces)
}

/// Two triangles sharing the long `0-2` diagonal of a rhombus.
pub fn diamond<I: MeshIndex>() -> Result<HalfEdgeMesh<I>> {
    let vertices = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(2.0, 0.0, 0.0),
        Point3::new(1.0, -1.0, 0.0),
    ];
    build_from_triangles(&vertices, &[[0, 1, 2], [0, 2, 3]])
}

/// Regular `n x n` grid of `size x size` in the XY plane, two triangles per
/// cell with all diagonals in the same direction.
pub fn grid<I: MeshIndex>(n: usize, size: f64) -> Result<HalfEdgeMesh<I>> {
    if n == 0 {
        return Err(MeshError::invalid_param("n", n, "must be at least 1"));
    }
    if !(size.is_finite() && size > 0.0) {
        return Err(MeshError::invalid_param("size", size, "must be positive"));
    }

    let step = size / n as f64;
    let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
    let mut faces = Vec::with_capacity(n * n * 2);

    for j in 0..=n {
        for i in 0..=n {
            vertices.push(Point3::new(i as f64 * step, j as f64 * step, 0.0));
        }
    }

    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;

            faces.push([v00, v10, v11]);
            faces.push([v00, v11, v01]);
        }
    }

    build_from_triangles(&vertices, &faces)
}

/// Regular octahedron with vertices on the unit axes.
pub fn octahedron<I: MeshIndex>() -> Result<HalfEdgeMesh<I>> {
    let vertices = [
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(-1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, -1.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
        Point3::new(0.0, 0.0, -1.0),
    ];
    let faces = [
        [0, 2, 4],
        [2, 1, 4],
        [1, 3, 4],
        [3, 0, 4],
        [2, 0, 5],
        [1, 2, 5],
        [3, 1, 5],
        [0, 3, 5],
    ];
    build_from_triangles(&vertices, &faces)
}

/// Triangular bipyramid: an equilateral equator `0, 1, 2` and poles `3`
/// (top) and `4` (bottom).
///
/// Collapsing any equator edge would fold the two pyramids onto each other,
/// which makes it the smallest surface that violates the link condition.
pub fn bipyramid<I: MeshIndex>() -> Result<HalfEdgeMesh<I>> {
    let h = 3f64.sqrt() / 2.0;
    let vertices = [
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(-0.5, h, 0.0),
        Point3::new(-0.5, -h, 0.0),
        Point3::new(0.0, 0.0, 1.0),
        Point3::new(0.0, 0.0, -1.0),
    ];
    let faces = [
        [0, 1, 3],
        [1, 2, 3],
        [2, 0, 3],
        [1, 0, 4],
        [2, 1, 4],
        [0, 2, 4],
    ];
    build_from_triangles(&vertices, &faces)
}
