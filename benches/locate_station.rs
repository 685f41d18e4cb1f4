//! Benchmarks for the station locator.
//!
//! Run with:
//!   cargo bench --bench locate_station
//!   cargo bench locate_station -- locate_station/default_seed

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use geoloc::look_angles::look_angles;
use geoloc::seed::{GridSearchParams, SeedStrategy};
use geoloc::{Locator, LocatorParams, Observation};

/// Observations of random mid-latitude stations, paired with their satellite longitude.
fn make_targets(rng: &mut StdRng, n: usize) -> Vec<(Observation, f64)> {
    (0..n)
        .filter_map(|_| {
            let sat: f64 = rng.random_range(-180.0..180.0);
            let lat: f64 = rng.random_range(10.0..50.0);
            let lon = sat + rng.random_range(-40.0..40.0);
            let angles = look_angles(sat, lat, lon).ok()?;
            let obs = Observation::new(angles.azimuth, angles.elevation).ok()?;
            Some((obs, sat))
        })
        .collect()
}

fn bench_locate(c: &mut Criterion) {
    let mut group = c.benchmark_group("locate_station");

    let reference = Observation::new(183.7, 56.6).expect("reference observation");
    let default_locator = Locator::new();

    // 1) Single solve from the (0, 0) seed
    group.bench_function("default_seed", |b| {
        b.iter(|| {
            let res = default_locator.locate(black_box(&reference), black_box(74.0));
            black_box(&res);
        })
    });

    // 2) Grid-search seeding, coarse lattice to keep the run short
    let grid_locator = Locator::with_params(
        LocatorParams::builder()
            .seed(SeedStrategy::GridSearch(GridSearchParams {
                coarse_step: 2.0,
                fine_step: 0.05,
                fine_span: 2.0,
            }))
            .build()
            .expect("grid locator params"),
    );
    group.bench_function("grid_seed", |b| {
        b.iter(|| {
            let res = grid_locator.locate(black_box(&reference), black_box(74.0));
            black_box(&res);
        })
    });

    // 3) Batch of random stations
    let mut rng = StdRng::seed_from_u64(0xDEADBEEF);
    group.bench_function("random_batch_32", |b| {
        b.iter_batched(
            || make_targets(&mut rng, 32),
            |targets| {
                for (obs, sat) in &targets {
                    let res = default_locator.locate(obs, *sat);
                    black_box(&res);
                }
            },
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(locate_benches, bench_locate);
criterion_main!(locate_benches);
