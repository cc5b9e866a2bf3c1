//! Benchmarks for the fixed-point arithmetic engine
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use machin_pi::{config::RunConfig, driver::run_formula, formula, Fixed};

fn seeded(capacity: usize, value: u32, divisor: u32) -> Fixed {
    let mut f = Fixed::new(capacity);
    f.set_int(value);
    f.div_scalar_assign(divisor);
    f
}

fn bench_engine_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_ops");

    for size in [512usize, 4096].iter() {
        group.throughput(Throughput::Elements(*size as u64));

        let a = seeded(*size, 16, 5);
        let b = seeded(*size, 4, 239);

        group.bench_with_input(BenchmarkId::new("add", size), size, |bench, _| {
            let mut dst = a.clone();
            bench.iter(|| dst.add(black_box(&b)));
        });

        group.bench_with_input(BenchmarkId::new("mul_scalar", size), size, |bench, _| {
            let mut dst = a.clone();
            bench.iter(|| dst.mul_scalar_assign(black_box(9)));
        });

        group.bench_with_input(BenchmarkId::new("div_scalar", size), size, |bench, _| {
            let mut dst = a.clone();
            bench.iter(|| dst.div_scalar_assign(black_box(57)));
        });

        group.bench_with_input(BenchmarkId::new("shift_right", size), size, |bench, _| {
            let mut dst = a.clone();
            bench.iter(|| dst.shift_right_assign(black_box(6)).unwrap());
        });
    }

    group.finish();
}

fn bench_formula(c: &mut Criterion) {
    let mut group = c.benchmark_group("formula");
    group.sample_size(10);

    let machin = formula::find("Machin").unwrap();
    for (label, serial) in [("pipelined", false), ("serial", true)] {
        let config = RunConfig {
            index_span: 2048,
            serial,
            ..RunConfig::default()
        };
        group.bench_function(BenchmarkId::new("machin_2048", label), |bench| {
            bench.iter(|| run_formula(black_box(machin), &config).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_engine_ops, bench_formula);
criterion_main!(benches);
