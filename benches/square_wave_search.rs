use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use gfsearch::evaluator::from_fn;
use gfsearch::{SearchEngine, SearchParams, TimeWindow};

/// Random true spans over `[0, horizon]`, each wider than `min_width`.
fn random_truth(rng: &mut StdRng, n: usize, horizon: f64, min_width: f64) -> TimeWindow {
    (0..n)
        .map(|_| {
            let start = rng.random_range(0.0..horizon);
            let width = rng.random_range(min_width..4.0 * min_width);
            (start, start + width)
        })
        .fold(TimeWindow::new(), |mut w, (s, e)| {
            let _ = w.insert(s, e);
            w
        })
}

/// One day sampled every minute, a few hundred events.
fn bench_single_interval(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0xDEADBEEF);
    let truth = random_truth(&mut rng, 300, 86_400.0, 120.0);
    let engine = SearchEngine::binary(from_fn(move |t: f64| truth.contains(t)));
    let confinement = TimeWindow::from_pairs(&[0.0, 86_400.0]).unwrap();
    let params = SearchParams::new(60.0, 1e-6, 10_000).unwrap();

    c.bench_function("search/single_interval_1d_step60", |b| {
        b.iter(|| {
            let found = engine
                .run(black_box(&confinement), black_box(&params))
                .unwrap();
            black_box(found);
        })
    });
}

/// Many short confinement intervals, as produced by chaining searches.
fn bench_fragmented_confinement(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0xBADF00D);
    let truth = random_truth(&mut rng, 300, 86_400.0, 120.0);
    let engine = SearchEngine::binary(from_fn(move |t: f64| truth.contains(t)));

    c.bench_function("search/fragmented_confinement", |b| {
        b.iter_batched(
            || random_truth(&mut rng, 500, 86_400.0, 60.0),
            |confinement| {
                let params = SearchParams::new(30.0, 1e-6, 10_000).unwrap();
                black_box(engine.run(&confinement, &params).unwrap());
            },
            BatchSize::SmallInput,
        )
    });
}

/// Refinement cost as the tolerance tightens.
fn bench_tolerance(c: &mut Criterion) {
    let engine = SearchEngine::binary(from_fn(|t: f64| (t / 3_600.0).sin() > 0.3));
    let confinement = TimeWindow::from_pairs(&[0.0, 864_000.0]).unwrap();

    for tol in [1e-3, 1e-6, 1e-9] {
        let params = SearchParams::new(300.0, tol, 10_000).unwrap();
        c.bench_function(&format!("search/sine_10d_tol{tol:e}"), |b| {
            b.iter(|| black_box(engine.run(&confinement, &params).unwrap()))
        });
    }
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_single_interval, bench_fragmented_confinement, bench_tolerance
);
criterion_main!(benches);
