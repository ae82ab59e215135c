use criterion::{criterion_group, criterion_main, Criterion};
use numlab_math::linalg::{invert, random_matrix};
use numlab_math::sparse::{random_sparse_system, sparse_solve};
use numlab_math::tridiag::thomas_solve;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::hint::black_box;

fn bench_thomas_1000(c: &mut Criterion) {
    let n = 1000;
    let a = vec![-1.0; n];
    let b = vec![2.5; n];
    let cc = vec![-1.0; n];
    let d = vec![1.0; n];

    c.bench_function("thomas_1000", |bench| {
        bench.iter(|| {
            let x = thomas_solve(&a, &b, &cc, &d).unwrap();
            black_box(x[n / 2]);
        })
    });
}

fn bench_dense_invert(c: &mut Criterion) {
    let mut group = c.benchmark_group("dense_invert");
    group.sample_size(10);

    for n in [100, 200] {
        let mut rng = StdRng::seed_from_u64(42);
        let m = random_matrix(n, &mut rng);
        group.bench_function(format!("n{n}"), |b| {
            b.iter(|| {
                let inv = invert(&m).unwrap();
                black_box(inv[[0, 0]]);
            })
        });
    }

    group.finish();
}

fn bench_sparse_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("sparse_solve");
    group.sample_size(10);

    for (n, density) in [(500, 2e-3), (1000, 1e-3)] {
        let mut rng = StdRng::seed_from_u64(42);
        let (a, rhs) = random_sparse_system(n, density, &mut rng).unwrap();
        group.bench_function(format!("n{n}"), |b| {
            b.iter(|| {
                let x = sparse_solve(&a, &rhs).unwrap();
                black_box(x[0]);
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_thomas_1000,
    bench_dense_invert,
    bench_sparse_solve
);
criterion_main!(benches);
