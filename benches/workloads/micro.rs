use criterion::{black_box, BenchmarkId, Criterion};
use std::time::Duration;

pub fn run(c: &mut Criterion) {
    bench_alloc_sizes(c);
    bench_overaligned(c);
    bench_vec_push(c);
}

fn bench_alloc_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("micro_alloc_free");
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_secs(1));

    for size in [16usize, 256, 4096, 1 << 20] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let v = Vec::<u8>::with_capacity(size);
                black_box(v.into_boxed_slice());
            })
        });
    }

    group.finish();
}

#[repr(align(128))]
struct CacheLines([u8; 256]);

fn bench_overaligned(c: &mut Criterion) {
    let mut group = c.benchmark_group("micro_overaligned");

    group.bench_function("box_align_128", |b| {
        b.iter(|| black_box(Box::new(CacheLines([0; 256]))))
    });

    group.finish();
}

fn bench_vec_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("micro_vec");

    group.bench_function("vec_push_grow_1000", |b| {
        b.iter(|| {
            let mut v = Vec::new();
            for i in 0..1000u32 {
                v.push(black_box(i));
            }
            black_box(v);
        })
    });

    group.finish();
}
