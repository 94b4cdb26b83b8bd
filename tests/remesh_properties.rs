//! End-to-end properties of the remeshing stages and the full pipeline.

use isomesh::algo::remesh::{
    collapse_short_edges, equalize_valences, project_to_surface, split_long_edges,
    tangential_relaxation, total_valence_excess, valence_excess, SurfaceSnapshot, TargetBand,
};
use isomesh::prelude::*;
use nalgebra::Point3;

fn assert_invariants(mesh: &HalfEdgeMesh, context: &str) {
    assert!(mesh.is_valid(), "{}: connectivity is inconsistent", context);
    assert!(mesh.is_manifold(), "{}: mesh is not manifold", context);
    for f in mesh.face_ids() {
        assert_eq!(mesh.face_vertices(f).count(), 3, "{}: {:?} is not a triangle", context, f);
    }
    for e in mesh.edge_ids() {
        let faces = [0, 1]
            .into_iter()
            .filter(|&i| !mesh.is_boundary_halfedge(e.halfedge(i)))
            .count();
        assert!((1..=2).contains(&faces), "{}: {:?} has {} faces", context, e, faces);
    }
}

fn boundary_positions(mesh: &HalfEdgeMesh) -> Vec<Point3<f64>> {
    let mut positions: Vec<_> = mesh
        .vertex_ids()
        .filter(|&v| mesh.is_boundary_vertex(v))
        .map(|v| *mesh.position(v))
        .collect();
    positions.sort_by(|a, b| {
        a.x.total_cmp(&b.x)
            .then(a.y.total_cmp(&b.y))
            .then(a.z.total_cmp(&b.z))
    });
    positions
}

fn topology_operations(stats: &RemeshStats) -> usize {
    stats.total_splits() + stats.total_collapses()
}

#[test]
fn stages_preserve_invariants() {
    let mut mesh: HalfEdgeMesh = shapes::unit_cube().unwrap();
    let band = TargetBand { min: 0.15, max: 0.3 };
    mesh.update_normals();

    for round in 0..3 {
        split_long_edges(&mut mesh, &band);
        mesh.update_normals();
        assert_invariants(&mesh, &format!("split, round {}", round));

        collapse_short_edges(&mut mesh, &band);
        assert_invariants(&mesh, &format!("collapse, round {}", round));
        mesh.garbage_collect();
        mesh.update_normals();
        assert_invariants(&mesh, &format!("compaction, round {}", round));

        equalize_valences(&mut mesh);
        mesh.update_normals();
        assert_invariants(&mesh, &format!("flips, round {}", round));

        let snapshot = SurfaceSnapshot::capture(&mesh);
        tangential_relaxation(&mut mesh, 0.2, 0.5 * band.max, false);
        mesh.update_normals();
        project_to_surface(&mut mesh, &snapshot, false);
        mesh.update_normals();
        assert_invariants(&mesh, &format!("relax and project, round {}", round));
    }
}

#[test]
fn link_condition_violation_leaves_mesh_untouched() {
    let mut mesh: HalfEdgeMesh = shapes::bipyramid().unwrap();
    let before = mesh.clone();

    let equator: Vec<_> = mesh
        .halfedge_ids()
        .filter(|&he| mesh.origin(he).index() < 3 && mesh.dest(he).index() < 3)
        .collect();
    assert_eq!(equator.len(), 6);

    for he in equator {
        assert!(!mesh.collapse(he));
    }

    assert!(!mesh.has_garbage());
    assert_eq!(mesh.num_vertices(), before.num_vertices());
    assert_eq!(mesh.num_faces(), before.num_faces());
    for he in mesh.halfedge_ids() {
        assert_eq!(mesh.origin(he), before.origin(he));
        assert_eq!(mesh.next(he), before.next(he));
        assert_eq!(mesh.face_of(he), before.face_of(he));
    }
    for v in mesh.vertex_ids() {
        assert_eq!(mesh.position(v), before.position(v));
    }
}

#[test]
fn valence_excess_never_grows_on_closed_mesh() {
    let mut mesh: HalfEdgeMesh = shapes::unit_cube().unwrap();
    split_long_edges(&mut mesh, &TargetBand { min: 0.1, max: 0.25 });

    let before = valence_excess(&mesh);
    let flips = equalize_valences(&mut mesh);

    assert!(flips > 0);
    assert!(valence_excess(&mesh) <= before);
    assert_invariants(&mesh, "flips on refined cube");
}

#[test]
fn valence_excess_never_grows_on_open_mesh() {
    let mut mesh: HalfEdgeMesh = shapes::grid(4, 1.0).unwrap();
    split_long_edges(&mut mesh, &TargetBand { min: 0.1, max: 0.2 });

    let before = valence_excess(&mesh);
    let total_before = total_valence_excess(&mesh);
    let flips = equalize_valences(&mut mesh);

    assert!(flips > 0);
    assert!(valence_excess(&mesh) <= before);
    assert!(total_valence_excess(&mesh) < total_before);
    assert_invariants(&mesh, "flips on refined grid");
}

#[test]
fn boundary_is_fixed_by_relaxation_and_projection() {
    let mut mesh: HalfEdgeMesh = shapes::grid(6, 1.0).unwrap();
    for v in mesh.vertex_ids().collect::<Vec<_>>() {
        if !mesh.is_boundary_vertex(v) {
            let p = *mesh.position(v);
            let bump = 0.03 * ((p.x * 7.0).sin() + (p.y * 5.0).cos());
            mesh.set_position(v, Point3::new(p.x + bump, p.y - bump, 0.0));
        }
    }
    mesh.update_normals();
    let boundary = boundary_positions(&mesh);

    let snapshot = SurfaceSnapshot::capture(&mesh);
    let relaxed = tangential_relaxation(&mut mesh, 0.2, 0.1, false);
    mesh.update_normals();
    assert_eq!(relaxed, 25);
    assert_eq!(boundary_positions(&mesh), boundary);

    project_to_surface(&mut mesh, &snapshot, false);
    assert_eq!(boundary_positions(&mesh), boundary);
}

#[test]
fn remesh_keeps_the_boundary_in_place() {
    let mut mesh: HalfEdgeMesh = shapes::grid(3, 1.0).unwrap();
    let boundary = boundary_positions(&mesh);

    let options = RemeshOptions::default().with_band_ratios(0.8, 1.2);
    let stats = isotropic_remesh(&mut mesh, &options).unwrap();

    assert!(stats.total_splits() > 0);
    assert_eq!(boundary_positions(&mesh), boundary);
    assert!((mesh.surface_area() - 1.0).abs() < 1e-9);
    assert_invariants(&mesh, "remeshed grid");
}

#[test]
fn cube_converges_into_band() {
    let mut mesh: HalfEdgeMesh = shapes::unit_cube().unwrap();
    let stats = isotropic_remesh(&mut mesh, &RemeshOptions::default()).unwrap();

    let first = stats.iterations.first().unwrap().out_of_band_fraction;
    let last = stats.iterations.last().unwrap().out_of_band_fraction;
    assert!(last < first, "out of band went from {} to {}", first, last);
    assert_invariants(&mesh, "remeshed cube");

    let euler = mesh.num_vertices() as i64 - mesh.num_edges() as i64 + mesh.num_faces() as i64;
    assert_eq!(euler, 2);
}

#[test]
fn single_split_of_quad_diagonal() {
    let mut mesh: HalfEdgeMesh = shapes::unit_quad().unwrap();
    assert_eq!(mesh.num_vertices(), 4);
    assert_eq!(mesh.num_faces(), 2);

    let band = TargetBand { min: 0.5, max: 1.3 };
    assert_eq!(split_long_edges(&mut mesh, &band), 1);

    assert_eq!(mesh.num_vertices(), 5);
    assert_eq!(mesh.num_faces(), 4);
    let center = mesh
        .vertex_ids()
        .find(|&v| (mesh.position(v) - Point3::new(0.5, 0.5, 0.0)).norm() < 1e-12)
        .unwrap();
    assert_eq!(mesh.degree(center), 4);
    assert!(!mesh.is_boundary_vertex(center));
    assert_invariants(&mesh, "split quad");
}

#[test]
fn quad_never_collapses() {
    for min in [0.1, 1.0, 10.0, 100.0] {
        let mut mesh: HalfEdgeMesh = shapes::unit_quad().unwrap();
        let band = TargetBand { min, max: 2.0 * min };

        assert_eq!(collapse_short_edges(&mut mesh, &band), 0);
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_faces(), 2);
        assert!(!mesh.has_garbage());
    }
}

#[test]
fn second_run_does_less_work() {
    let mut mesh: HalfEdgeMesh = shapes::unit_cube().unwrap();
    let options = RemeshOptions::default();

    let first = isotropic_remesh(&mut mesh, &options).unwrap();
    let second = isotropic_remesh(&mut mesh, &options).unwrap();

    assert!(topology_operations(&second) <= topology_operations(&first));
}

#[test]
fn second_run_does_less_work_after_refinement() {
    let mut mesh: HalfEdgeMesh = shapes::unit_cube().unwrap();
    isotropic_remesh(&mut mesh, &RemeshOptions::default().with_band_ratios(0.5, 0.7)).unwrap();

    let options = RemeshOptions::default();
    let first = isotropic_remesh(&mut mesh, &options).unwrap();
    let second = isotropic_remesh(&mut mesh, &options).unwrap();

    assert!(topology_operations(&second) <= topology_operations(&first));
    assert_invariants(&mesh, "remeshed refined cube");
}

#[test]
fn compaction_invalidates_snapshots() {
    let mut mesh: HalfEdgeMesh = shapes::octahedron().unwrap();
    let generation = mesh.generation();
    let snapshot = SurfaceSnapshot::capture(&mesh);
    assert!(snapshot.matches(&mesh));

    let he = mesh.halfedge_ids().next().unwrap();
    assert!(mesh.collapse(he));
    // Tombstones keep slots addressable until compaction.
    assert!(snapshot.matches(&mesh));
    assert_eq!(mesh.vertex_slot_count(), 6);

    mesh.garbage_collect();
    assert_eq!(mesh.generation(), generation + 1);
    assert_eq!(mesh.vertex_slot_count(), mesh.num_vertices());
    assert!(!snapshot.matches(&mesh));
}

#[test]
fn remesh_leaves_compacted_mesh_with_fresh_normals() {
    let mut mesh: HalfEdgeMesh = shapes::unit_cube().unwrap();
    let options = RemeshOptions::default().with_band_ratios(0.3, 0.5);
    isotropic_remesh(&mut mesh, &options).unwrap();

    assert!(!mesh.has_garbage());
    assert_eq!(mesh.vertex_slot_count(), mesh.num_vertices());
    for v in mesh.vertex_ids() {
        let stored = mesh.vertex_normal(v);
        let fresh = mesh.compute_vertex_normal(v);
        assert!((stored.norm() - 1.0).abs() < 1e-9);
        assert!((stored - fresh).norm() < 1e-9);
    }
}

#[test]
fn small_index_type_works_end_to_end() {
    let mut mesh: HalfEdgeMesh<u16> = shapes::unit_cube().unwrap();
    let stats = isotropic_remesh(&mut mesh, &RemeshOptions::default()).unwrap();

    assert_eq!(stats.iterations.len(), 5);
    assert!(mesh.is_valid());
    assert!(mesh.is_manifold());
}
