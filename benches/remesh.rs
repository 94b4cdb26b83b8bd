//! Benchmarks for the remeshing stages.

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use isomesh::algo::remesh::{
    equalize_valences, split_long_edges, tangential_relaxation, TargetBand,
};
use isomesh::prelude::*;

fn bench_mesh_construction(c: &mut Criterion) {
    c.bench_function("build_grid_50x50", |b| {
        b.iter(|| {
            let mesh: HalfEdgeMesh = shapes::grid(50, 50.0).unwrap();
            mesh
        });
    });
}

fn bench_stages(c: &mut Criterion) {
    let cube: HalfEdgeMesh = shapes::unit_cube().unwrap();
    let band = TargetBand { min: 0.02, max: 0.05 };

    c.bench_function("split_cube_to_0.05", |b| {
        b.iter_batched(
            || cube.clone(),
            |mut mesh| split_long_edges(&mut mesh, &band),
            BatchSize::SmallInput,
        );
    });

    let mut refined = cube.clone();
    split_long_edges(&mut refined, &band);
    refined.update_normals();

    c.bench_function("equalize_valences_refined_cube", |b| {
        b.iter_batched(
            || refined.clone(),
            |mut mesh| equalize_valences(&mut mesh),
            BatchSize::SmallInput,
        );
    });

    for parallel in [false, true] {
        let name = if parallel {
            "relax_refined_cube_parallel"
        } else {
            "relax_refined_cube_sequential"
        };
        c.bench_function(name, |b| {
            b.iter_batched(
                || refined.clone(),
                |mut mesh| tangential_relaxation(&mut mesh, 0.2, 0.025, parallel),
                BatchSize::SmallInput,
            );
        });
    }
}

fn bench_remesh(c: &mut Criterion) {
    let cube: HalfEdgeMesh = shapes::unit_cube().unwrap();
    let options = RemeshOptions::default().with_band_ratios(0.3, 0.5);

    c.bench_function("remesh_cube_fine_band", |b| {
        b.iter_batched(
            || cube.clone(),
            |mut mesh| isotropic_remesh(&mut mesh, &options).unwrap(),
            BatchSize::SmallInput,
        );
    });

    let grid: HalfEdgeMesh = shapes::grid(40, 1.0).unwrap();
    c.bench_function("remesh_grid_40x40", |b| {
        b.iter_batched(
            || grid.clone(),
            |mut mesh| isotropic_remesh(&mut mesh, &RemeshOptions::default()).unwrap(),
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(benches, bench_mesh_construction, bench_stages, bench_remesh);
criterion_main!(benches);
