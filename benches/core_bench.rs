//! Benchmarks for trenza core operations.
//!
//! Run with: cargo bench
//!
//! Results include 95% confidence intervals via Criterion.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use trenza::core::{as_table, detect, parse};
use trenza::polyglot::scan_str;

fn bench_detect(c: &mut Criterion) {
    let inputs = [
        ("int", "1234567".to_string()),
        ("bool", "true".to_string()),
        ("int_array", (0..200).map(|n| n.to_string()).collect::<Vec<_>>().join("\n")),
        ("string_array", "alpha\nbeta\ngamma\n".repeat(64)),
        ("dict", "A=1\nB=2\nC=3\n".repeat(32)),
    ];

    let mut group = c.benchmark_group("detect");
    for (name, input) in &inputs {
        group.bench_with_input(BenchmarkId::from_parameter(name), input, |b, input| {
            b.iter(|| black_box(detect(black_box(input))));
        });
    }
    group.finish();
}

fn bench_parse_int_array(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_int_array");
    for size in [16, 256, 4096] {
        let input: String = (0..size).map(|n| n.to_string()).collect::<Vec<_>>().join("\n");
        group.bench_with_input(BenchmarkId::from_parameter(size), &input, |b, input| {
            b.iter(|| black_box(parse(black_box(input)).unwrap()));
        });
    }
    group.finish();
}

fn bench_as_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("as_table");
    for rows in [16, 256, 4096] {
        let mut input = String::from("pid user time cmd\n");
        for i in 0..rows {
            input.push_str(&format!("{} root 0:0{} proc{}\n", i, i % 10, i));
        }
        group.bench_with_input(BenchmarkId::from_parameter(rows), &input, |b, input| {
            b.iter(|| black_box(as_table(black_box(input), ' ', None)));
        });
    }
    group.finish();
}

fn bench_scan_str(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_str");
    for blocks in [8, 128, 1024] {
        let mut source = String::new();
        for i in 0..blocks {
            source.push_str(&format!("x{} = {}\n#B> echo {}\n", i, i, i));
        }
        group.bench_with_input(BenchmarkId::from_parameter(blocks), &source, |b, source| {
            b.iter(|| black_box(scan_str(black_box(source))));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_detect,
    bench_parse_int_array,
    bench_as_table,
    bench_scan_str
);
criterion_main!(benches);
