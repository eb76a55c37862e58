use criterion::{black_box, criterion_group, criterion_main, Criterion};
use oz_core::{Alloc, AllocMode, Pool};

fn bench_pool_alloc_free(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_alloc_free");

    group.bench_function("pool_alloc_free", |b| {
        b.iter(|| {
            let mut pool: Pool<i32> = Pool::new();
            let mut slots = Vec::with_capacity(1000);
            for i in 0..1000 {
                slots.push(pool.construct(i));
            }
            for slot in slots {
                unsafe { pool.destruct(slot) };
            }
        });
    });

    group.bench_function("std_box_alloc_free", |b| {
        b.iter(|| {
            let mut boxes = Vec::with_capacity(1000);
            for i in 0..1000 {
                boxes.push(Box::new(i));
            }
            black_box(boxes);
        });
    });

    group.finish();
}

fn bench_pool_reuse(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_reuse");

    group.bench_function("pool_reuse", |b| {
        let mut pool: Pool<i32> = Pool::new();
        b.iter(|| {
            for i in 0..1000 {
                let slot = pool.construct(i);
                black_box(slot);
                unsafe { pool.destruct(slot) };
            }
        });
    });

    group.bench_function("std_box_reuse", |b| {
        b.iter(|| {
            for i in 0..1000 {
                let b = Box::new(i);
                black_box(b);
            }
        });
    });

    group.finish();
}

fn bench_tracking_allocator(c: &mut Criterion) {
    let mut group = c.benchmark_group("tracking_allocator");

    group.bench_function("allocate_deallocate_64b", |b| {
        let alloc = Alloc::new();
        b.iter(|| unsafe {
            let p = alloc.allocate(AllocMode::Object, black_box(64));
            alloc.deallocate(AllocMode::Object, p);
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_pool_alloc_free,
    bench_pool_reuse,
    bench_tracking_allocator
);
criterion_main!(benches);
