#![allow(unused_must_use)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pathfinder::{parse_query, search, SearchOptions};
use std::{fs, fs::File, io::Write, num::NonZeroUsize};
use tempfile::tempdir;

fn create_test_files(
    dir: &tempfile::TempDir,
    file_count: usize,
    lines_per_file: usize,
) -> std::io::Result<()> {
    for i in 0..file_count {
        let sub = dir.path().join(format!("folder_{}", i % 10));
        fs::create_dir_all(&sub)?;
        let mut file = File::create(sub.join(format!("note_{}.txt", i)))?;
        for j in 0..lines_per_file {
            writeln!(file, "Line {} of note {}: meeting agenda and follow-ups", j, i)?;
        }
        if i % 25 == 0 {
            writeln!(file, "attached invoice {}", i)?;
        }
    }
    Ok(())
}

fn base_options() -> SearchOptions {
    SearchOptions {
        limit: NonZeroUsize::new(100_000).unwrap(),
        workers: NonZeroUsize::new(4).unwrap(),
        ..SearchOptions::default()
    }
}

fn bench_name_vs_content(c: &mut Criterion) -> std::io::Result<()> {
    let dir = tempdir().unwrap();
    create_test_files(&dir, 500, 20)?;
    let query = parse_query(&["invoice"], false);

    let mut group = c.benchmark_group("Name vs Content");

    let names_only = SearchOptions {
        scan_content: false,
        ..base_options()
    };
    group.bench_function("names_only", |b| {
        b.iter(|| search(&[dir.path()], black_box(&query), &names_only, None));
    });

    let with_content = base_options();
    group.bench_function("with_content", |b| {
        b.iter(|| search(&[dir.path()], black_box(&query), &with_content, None));
    });

    group.finish();
    Ok(())
}

fn bench_file_scaling(c: &mut Criterion) -> std::io::Result<()> {
    let mut group = c.benchmark_group("File Scaling");
    let query = parse_query(&["invoice"], false);
    let options = base_options();

    for count in [100, 500, 2000] {
        let dir = tempdir().unwrap();
        create_test_files(&dir, count, 10)?;
        group.bench_function(format!("files_{}", count), |b| {
            b.iter(|| search(&[dir.path()], black_box(&query), &options, None));
        });
    }

    group.finish();
    Ok(())
}

fn bench_worker_count(c: &mut Criterion) -> std::io::Result<()> {
    let dir = tempdir().unwrap();
    create_test_files(&dir, 1000, 20)?;
    let query = parse_query(&["invoice", "type:doc"], false);

    let mut group = c.benchmark_group("Worker Count");
    for workers in [1, 2, 4, 8] {
        let options = SearchOptions {
            workers: NonZeroUsize::new(workers).unwrap(),
            ..base_options()
        };
        group.bench_function(format!("workers_{}", workers), |b| {
            b.iter(|| search(&[dir.path()], black_box(&query), &options, None));
        });
    }

    group.finish();
    Ok(())
}

fn bench_query_parsing(c: &mut Criterion) {
    let terms = [
        "quarterly",
        "\"Budget 2024.xlsx\"",
        "type:sheet",
        "ext:csv",
        "\"~/Documents/notes\"",
        "report",
    ];
    c.bench_function("parse_query", |b| {
        b.iter(|| parse_query(black_box(&terms), false));
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = bench_name_vs_content, bench_file_scaling,
              bench_worker_count, bench_query_parsing
}

#[test]
fn ensure_benchmarks_valid() {
    benches();
}

criterion_main!(benches);
