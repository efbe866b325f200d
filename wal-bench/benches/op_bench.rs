//! Criterion harness: cost of a single worker operation (insert / bounded
//! lookup) against an in-memory and an on-disk WAL database, without any
//! contention.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use wal_bench::store::{BenchStore, SqliteStore, StorageTarget};
use wal_bench::worker::{read_once, write_once};

/// Rows inserted before measuring lookups, so they have something to return.
const PRELOAD_ROWS: u32 = 5_000;

fn setup_store(target: StorageTarget) -> SqliteStore {
    let store = SqliteStore::open(target, 1, Duration::from_secs(5))
        .expect("Failed to open SQLite store");
    store.init_schema().expect("Failed to create schema");
    store
}

fn targets(dir: &tempfile::TempDir) -> Vec<(&'static str, StorageTarget)> {
    vec![
        ("memory", StorageTarget::Memory),
        ("file", StorageTarget::File(dir.path().join("bench.db"))),
    ]
}

fn bench_insert(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut group = c.benchmark_group("op/insert");
    group.measurement_time(Duration::from_secs(10));

    for (label, target) in targets(&dir) {
        let store = setup_store(target);
        let mut rng = StdRng::seed_from_u64(0xBEEF);

        group.bench_function(BenchmarkId::from_parameter(label), |b| {
            b.iter(|| write_once(&store, &mut rng).expect("insert failed"));
        });
    }
    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut group = c.benchmark_group("op/lookup");
    group.measurement_time(Duration::from_secs(10));

    for (label, target) in targets(&dir) {
        let store = setup_store(target);
        for i in 0..PRELOAD_ROWS {
            store
                .insert(i % 1000 + 1, f64::from(i % 100))
                .expect("preload failed");
        }
        let mut rng = StdRng::seed_from_u64(0xCAFE);

        group.bench_function(BenchmarkId::from_parameter(label), |b| {
            b.iter(|| read_once(&store, &mut rng).expect("lookup failed"));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_insert, bench_lookup);
criterion_main!(benches);
