use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use wh_core::{search_catalog, Catalog, WormholeRegistry};

const ORDERS: [(&str, &str); 3] = [
    ("all", "all"),
    (
        "dense",
        "c5; effect exclude red giant; static c6 or ns; radius 60-100",
    ),
    (
        "planets",
        "c1 c2 c3 non-shattered; planets perfect 4-8; moons 2-12",
    ),
];

fn bench_search(c: &mut Criterion) {
    let catalog = Catalog::load_builtin().expect("builtin catalog loads");
    let mut group = c.benchmark_group("search");

    for (label, order) in ORDERS {
        group.bench_with_input(BenchmarkId::new("order", label), &order, |b, &order| {
            b.iter(|| search_catalog(order, &catalog))
        });
    }

    group.finish();
}

fn bench_splash_cascade(c: &mut Criterion) {
    let catalog = Catalog::load_builtin().expect("builtin catalog loads");
    let mut seeded = WormholeRegistry::new();
    seeded
        .spawn(&catalog, "bench", "abc-123", "h296", "new")
        .expect("spawns");

    let mut group = c.benchmark_group("masscalc");
    group.bench_function("splash_cascade", |b| {
        b.iter_batched(
            || seeded.clone(),
            |mut registry| {
                for mass in [1350.0, 1350.0, 900.0, 900.0] {
                    let _ = registry.splash("bench", "abc-123", mass);
                }
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(search_benches, bench_search, bench_splash_cascade);
criterion_main!(search_benches);
