use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use poolwatch_core::PoolController;

/// Build a pool of `size` devices where only every `stride`-th one is ready.
fn sparse_pool(size: usize, stride: usize) -> PoolController {
    let mut controller = PoolController::new();
    for i in 0..size {
        controller.add_device(&format!("oic/dev-{}", i)).unwrap();
    }

    let mut events = Vec::new();
    for i in 0..size {
        controller.fetch_next();
        // Fetch cursor starts after 0, so position i + 1 is being answered
        if (i + 1) % size % stride == 0 {
            controller.update_name("bench").unwrap();
            controller.update_temperature(20.0).unwrap();
            controller.update_failure(false, &mut events).unwrap();
        }
    }
    controller
}

/// Benchmark tick when every device is ready (no skipping)
fn bench_tick_all_ready(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_all_ready");

    for size in [1usize, 10, 100, 1000].iter() {
        let mut controller = sparse_pool(*size, 1);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                black_box(controller.tick());
            });
        });
    }
    group.finish();
}

/// Benchmark tick when most devices have to be skipped
fn bench_tick_sparse(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_sparse");

    for size in [10usize, 100, 1000].iter() {
        let mut controller = sparse_pool(*size, 10);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                black_box(controller.tick());
            });
        });
    }
    group.finish();
}

/// Benchmark the worst case: a scan back to the cursor that finds nothing
fn bench_tick_none_ready(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_none_ready");

    for size in [10usize, 100, 1000].iter() {
        let mut controller = PoolController::new();
        for i in 0..*size {
            controller.add_device(&format!("oic/dev-{}", i)).unwrap();
        }
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                black_box(controller.tick());
            });
        });
    }
    group.finish();
}

/// Benchmark discovery of a new device (linear duplicate scan)
fn bench_add_device(c: &mut Criterion) {
    let mut controller = PoolController::new();
    for i in 0..1000 {
        controller.add_device(&format!("oic/dev-{}", i)).unwrap();
    }

    c.bench_function("add_known_device_1000", |b| {
        b.iter(|| {
            black_box(controller.add_device(black_box("oic/dev-999")).unwrap());
        });
    });
}

criterion_group!(
    benches,
    bench_tick_all_ready,
    bench_tick_sparse,
    bench_tick_none_ready,
    bench_add_device
);
criterion_main!(benches);
