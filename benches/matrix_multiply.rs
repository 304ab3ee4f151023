//! Benchmarks comparing the three multiplication strategies

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rowwise::{Algorithm, MultiplyConfig, SparseMatrixCSR, Triplet};

/// Banded matrix with a few random off-band entries per row
fn create_test_matrix(n: usize, bandwidth: usize, extra_per_row: usize) -> SparseMatrixCSR<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut triplets = Vec::new();

    for row in 0..n {
        let start = row.saturating_sub(bandwidth);
        let end = (row + bandwidth + 1).min(n);
        for col in start..end {
            triplets.push(Triplet::new(row, col, rng.gen_range(-1.0..1.0)));
        }
        for _ in 0..extra_per_row {
            triplets.push(Triplet::new(row, rng.gen_range(0..n), rng.gen_range(-1.0..1.0)));
        }
    }

    SparseMatrixCSR::from_triplets(n, n, triplets, false, true).expect("valid benchmark matrix")
}

fn bench_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("spgemm");
    group.sample_size(10);

    for n in [200usize, 1000] {
        let a = create_test_matrix(n, 2, 3);
        let config = MultiplyConfig::default();

        for algorithm in Algorithm::ALL {
            // The inner product without transposition is quadratic in n
            if algorithm == Algorithm::Inner && n > 200 {
                continue;
            }
            group.bench_with_input(
                BenchmarkId::new(format!("{:?}", algorithm), n),
                &a,
                |bench, a| bench.iter(|| a.multiply(black_box(a), algorithm, &config)),
            );
        }
    }

    group.finish();
}

fn bench_thread_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("row_wise_threads");
    group.sample_size(10);
    let a = create_test_matrix(2000, 3, 4);

    for threads in [1usize, 2, 4] {
        group.bench_with_input(BenchmarkId::from_parameter(threads), &threads, |bench, &threads| {
            bench.iter(|| a.multiply_row_wise(black_box(&a), 8, threads))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_strategies, bench_thread_scaling);
criterion_main!(benches);
