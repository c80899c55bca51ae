//! Benchmarks for mesh construction and simplification.

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use nalgebra::{Point3, Vector2, Vector3};
use whittle::prelude::*;

fn grid_soup(n: usize) -> (Vec<Point3<f64>>, Vec<Vector2<f64>>, Vec<Vector3<f64>>) {
    let mut corners = Vec::with_capacity((n + 1) * (n + 1));
    for j in 0..=n {
        for i in 0..=n {
            corners.push(Point3::new(i as f64, j as f64, 0.0));
        }
    }

    let mut positions = Vec::with_capacity(n * n * 6);
    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;

            for idx in [v00, v10, v11, v00, v11, v01] {
                positions.push(corners[idx]);
            }
        }
    }

    let uvs = vec![Vector2::zeros(); positions.len()];
    let normals = vec![Vector3::z(); positions.len()];
    (positions, uvs, normals)
}

fn bench_build(c: &mut Criterion) {
    let (positions, uvs, normals) = grid_soup(30);

    c.bench_function("weld_grid_30x30", |b| {
        b.iter(|| build_from_soup(&positions, &uvs, &normals).unwrap());
    });
}

fn bench_simplify(c: &mut Criterion) {
    let (positions, uvs, normals) = grid_soup(20);

    c.bench_function("simplify_grid_20x20_step50", |b| {
        b.iter_batched(
            || Simplifier::new(build_from_soup(&positions, &uvs, &normals).unwrap()),
            |mut simplifier| simplifier.step(50),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_build, bench_simplify);
criterion_main!(benches);
