//! Throughput Benchmark for IndexKV
//!
//! This benchmark measures command execution through the dispatcher
//! under various workloads.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use indexkv::commands::CommandHandler;
use indexkv::storage::Database;

const NOW: i64 = 1_700_000_000_000;

/// Builds a database with `count` documents of the form `{"n": i, "tag": "t<i % 10>"}`.
fn populated(count: usize) -> Database {
    let mut db = Database::new();
    let mut handler = CommandHandler::at(&mut db, NOW);
    for i in 0..count {
        handler.execute(&format!(
            r#"SET doc:{} {{"n": {}, "tag": "t{}"}}"#,
            i,
            i,
            i % 10
        ));
    }
    db
}

/// Benchmark SET operations
fn bench_set(c: &mut Criterion) {
    let mut db = Database::new();

    let mut group = c.benchmark_group("set");
    group.throughput(Throughput::Elements(1));

    group.bench_function("set_small", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let line = format!(r#"SET key:{} {{"a": 1}}"#, i);
            black_box(CommandHandler::at(&mut db, NOW).execute(&line));
            i += 1;
        });
    });

    group.bench_function("set_wide", |b| {
        let fields: Vec<String> = (0..32).map(|f| format!(r#""f{}": "value {}""#, f, f)).collect();
        let body = fields.join(", ");
        let mut i = 0u64;
        b.iter(|| {
            let line = format!("SET wide:{} {{{}}} 60000", i, body);
            black_box(CommandHandler::at(&mut db, NOW).execute(&line));
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark GET operations
fn bench_get(c: &mut Criterion) {
    let mut db = populated(100_000);

    let mut group = c.benchmark_group("get");
    group.throughput(Throughput::Elements(1));

    group.bench_function("get_existing", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let line = format!("GET doc:{}", i % 100_000);
            black_box(CommandHandler::at(&mut db, NOW).execute(&line));
            i += 1;
        });
    });

    group.bench_function("get_missing", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let line = format!("GET missing:{}", i);
            black_box(CommandHandler::at(&mut db, NOW).execute(&line));
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark INDEX validation and writes
fn bench_index(c: &mut Criterion) {
    let mut db = populated(10_000);

    let mut group = c.benchmark_group("index");
    group.throughput(Throughput::Elements(1));

    group.bench_function("index_valid", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let line = format!("INDEX doc:{} tag t{}", i % 10_000, i % 10);
            black_box(CommandHandler::at(&mut db, NOW).execute(&line));
            i += 1;
        });
    });

    group.bench_function("index_rejected", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let line = format!("INDEX doc:{} tag nope", i % 10_000);
            black_box(CommandHandler::at(&mut db, NOW).execute(&line));
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark RANGE scans over growing document sets
fn bench_range(c: &mut Criterion) {
    let mut group = c.benchmark_group("range");

    for size in [1_000usize, 10_000, 100_000] {
        let mut db = populated(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("narrow", size), &size, |b, _| {
            b.iter(|| black_box(CommandHandler::at(&mut db, NOW).execute("RANGE n 100 110")));
        });

        group.bench_with_input(BenchmarkId::new("empty", size), &size, |b, _| {
            b.iter(|| black_box(CommandHandler::at(&mut db, NOW).execute("RANGE n -10 -1")));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_set, bench_get, bench_index, bench_range);

criterion_main!(benches);
