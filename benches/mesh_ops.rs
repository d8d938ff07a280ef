//! Benchmarks for meshing and deformation.

use criterion::{criterion_group, criterion_main, Criterion};
use gumline::algo::profile::deform;
use gumline::prelude::*;
use nalgebra::Point3;

fn create_grid_points(n: usize) -> Vec<Point3<f64>> {
    let mut points = Vec::with_capacity(n * n);

    // Slight shear keeps the grid out of exactly cocircular configurations
    for j in 0..n {
        for i in 0..n {
            let x = i as f64 + 0.01 * j as f64;
            points.push(Point3::new(x, 0.0, j as f64));
        }
    }

    points
}

fn create_sphere_points(n: usize) -> Vec<Point3<f64>> {
    let golden = std::f64::consts::PI * (3.0 - 5.0_f64.sqrt());
    (0..n)
        .map(|i| {
            let y = 1.0 - 2.0 * (i as f64 + 0.5) / n as f64;
            let r = (1.0 - y * y).sqrt();
            let theta = golden * i as f64;
            Point3::new(r * theta.cos(), y, r * theta.sin())
        })
        .collect()
}

fn bench_triangulation(c: &mut Criterion) {
    let points = create_grid_points(30);

    c.bench_function("delaunay_grid_30x30", |b| {
        b.iter(|| delaunay_mesh(&points));
    });

    let sphere = create_sphere_points(500);

    c.bench_function("convex_hull_sphere_500", |b| {
        b.iter(|| convex_hull_mesh(&sphere).unwrap());
    });
}

fn bench_deformation(c: &mut Criterion) {
    let vertices: Vec<Point3<f64>> = {
        let mut v = Vec::with_capacity(80 * 80);
        for j in 0..80 {
            for i in 0..80 {
                v.push(Point3::new(i as f64 * 0.25, 0.0, j as f64 * 0.25));
            }
        }
        v
    };
    let pairs: Vec<AnchorPair> = (0..40)
        .map(|j| {
            let z = j as f64 * 0.5;
            AnchorPair::new(Point3::new(0.0, 0.0, z), Point3::new(20.0, 0.0, z), 8.0)
        })
        .collect();

    let parallel = ProfileOptions::default().with_distance(4.0);
    let sequential = parallel.clone().sequential();

    c.bench_function("deform_40_pairs_parallel", |b| {
        b.iter(|| deform(&pairs, &vertices, &parallel).unwrap());
    });

    c.bench_function("deform_40_pairs_sequential", |b| {
        b.iter(|| deform(&pairs, &vertices, &sequential).unwrap());
    });
}

criterion_group!(benches, bench_triangulation, bench_deformation);
criterion_main!(benches);
