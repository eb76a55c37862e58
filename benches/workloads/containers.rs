use criterion::{black_box, Criterion};
use oz_core::{HashIndex, HashString, Pool};

/// Container workloads that allocate through the installed global allocator
/// only when growing: the pool on a new block, the tables through their pool.
pub fn run(c: &mut Criterion) {
    let mut group = c.benchmark_group("containers_under_global_alloc");

    group.bench_function("pool_fill_and_free_4096", |b| {
        b.iter(|| {
            let mut pool: Pool<[u64; 2]> = Pool::new();
            let slots: Vec<_> = (0..4096u64).map(|i| pool.construct([i, i])).collect();
            for slot in slots {
                unsafe { pool.destruct(slot) };
            }
            pool.free();
        })
    });

    group.bench_function("hash_index_build_180", |b| {
        b.iter(|| {
            let index: HashIndex<u64> = (0..180).map(|k| (k, k as u64)).collect();
            black_box(index.len())
        })
    });

    let names: Vec<String> = (0..180).map(|i| format!("entity_{i}")).collect();
    group.bench_function("hash_string_build_180", |b| {
        b.iter(|| {
            let table: HashString<usize> = names.iter().zip(0..).collect();
            black_box(table.len())
        })
    });

    group.finish();
}
