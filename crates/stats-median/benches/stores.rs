use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};
use stats_median::{MedianAggregator, MedianConfig, StoreBackend, F64};
use std::collections::VecDeque;

const SEED: u64 = 0x7fc3_5918_4519_c0aa;

fn data(length: usize) -> Vec<F64> {
    let mut rng = StdRng::seed_from_u64(SEED);
    (0..length)
        .map(|_| F64::new(rng.gen_range(-1_000.0..1_000.0)))
        .collect()
}

/// Slide a window of `window` values over `input`, reading the median after
/// every event.
fn slide(config: &MedianConfig, window: usize, input: &[F64]) -> f64 {
    let mut agg = MedianAggregator::<F64>::new(config);
    let mut events = VecDeque::with_capacity(window);
    let mut last = 0.0;
    for &v in input {
        if events.len() == window {
            if let Some(expired) = events.pop_front() {
                agg.remove(expired).unwrap();
            }
        }
        events.push_back(v);
        last = agg.add(v);
    }
    last
}

fn sliding_window(c: &mut Criterion) {
    let input = data(20_000);
    let mut group = c.benchmark_group("sliding-window");

    for window in [16, 1_024, 16_384] {
        for (name, config) in [
            ("tree", MedianConfig::default()),
            ("sorted", MedianConfig::default().with_store(StoreBackend::Sorted)),
        ] {
            group.bench_with_input(BenchmarkId::new(name, window), &window, |b, &window| {
                b.iter(|| slide(&config, window, black_box(&input)))
            });
        }
    }

    group.finish();
}

fn bulk_insert(c: &mut Criterion) {
    let input = data(100_000);
    let mut group = c.benchmark_group("bulk-insert");

    for branching_factor in [8, 64, 256] {
        let config = MedianConfig::default().with_branching_factor(branching_factor);
        group.bench_function(BenchmarkId::new("tree", branching_factor), |b| {
            b.iter_batched(
                || MedianAggregator::<F64>::new(&config),
                |mut agg| {
                    for &v in &input {
                        agg.add(v);
                    }
                    agg
                },
                BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, sliding_window, bulk_insert);
criterion_main!(benches);
