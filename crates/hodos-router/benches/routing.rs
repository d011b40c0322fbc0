//! Matching benchmarks.
//!
//! Run with: `cargo bench -p hodos-router`

use hodos_router::Pattern;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn build_table(num_routes: usize) -> Vec<Pattern> {
    let mut table = Vec::with_capacity(num_routes);

    for i in 0..num_routes / 3 {
        table.push(Pattern::compile(&format!("/api/v1/resource{i}")).unwrap());
    }

    for i in 0..num_routes / 3 {
        table.push(Pattern::compile(&format!("/api/v1/resource{i}/{{id:[0-9]+}}")).unwrap());
    }

    for i in 0..num_routes / 3 {
        table.push(
            Pattern::compile(&format!("/api/v1/org/{{orgId}}/resource{i}/{{id}}")).unwrap(),
        );
    }

    table
}

/// Linear scan over the table, as the router does.
fn first_match<'a>(table: &'a [Pattern], path: &str) -> Option<&'a Pattern> {
    table.iter().find(|pattern| pattern.matches(path).is_some())
}

fn bench_static_match(c: &mut Criterion) {
    let table = build_table(100);

    c.bench_function("static_match", |b| {
        b.iter(|| black_box(first_match(&table, "/api/v1/resource20")));
    });
}

fn bench_constrained_match(c: &mut Criterion) {
    let table = build_table(100);

    c.bench_function("constrained_match", |b| {
        b.iter(|| black_box(first_match(&table, "/api/v1/resource25/12345")));
    });
}

fn bench_no_match(c: &mut Criterion) {
    let table = build_table(100);

    c.bench_function("no_match", |b| {
        b.iter(|| black_box(first_match(&table, "/nonexistent/path")));
    });
}

fn bench_table_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_size");

    for size in [10, 50, 100, 300] {
        let table = build_table(size);
        let last = format!("/api/v1/org/acme/resource{}/42", size / 3 - 1);
        group.bench_with_input(BenchmarkId::from_parameter(size), &last, |b, path| {
            b.iter(|| black_box(first_match(&table, path)));
        });
    }

    group.finish();
}

fn bench_compile(c: &mut Criterion) {
    c.bench_function("compile", |b| {
        b.iter(|| black_box(Pattern::compile("/orgs/{org}/repos/{repo:[a-z0-9-]+}/files/{path:.*}")));
    });
}

criterion_group!(
    benches,
    bench_static_match,
    bench_constrained_match,
    bench_no_match,
    bench_table_size,
    bench_compile,
);
criterion_main!(benches);
