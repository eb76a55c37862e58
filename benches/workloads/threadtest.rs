use criterion::{black_box, Criterion, Throughput};
use std::sync::mpsc;
use std::thread;

const OPS: usize = 20_000;

/// Producer threads allocate, consumer threads free. Every release updates
/// the shared counters from a different thread than the allocation.
pub fn run(c: &mut Criterion) {
    let mut group = c.benchmark_group("threadtest_prod_cons");
    group.sample_size(10);

    for t in [2, 4, 8] {
        let pairs = t / 2;
        group.throughput(Throughput::Elements((OPS * pairs) as u64));

        group.bench_function(format!("threadtest_{t}_threads"), |b| {
            b.iter(|| {
                let mut handles = Vec::with_capacity(t);

                for _ in 0..pairs {
                    let (tx, rx) = mpsc::channel();

                    handles.push(thread::spawn(move || {
                        for i in 0..OPS {
                            if tx.send(Box::new([i; 4])).is_err() {
                                break;
                            }
                        }
                    }));

                    handles.push(thread::spawn(move || {
                        while let Ok(val) = rx.recv() {
                            black_box(val);
                        }
                    }));
                }

                for h in handles {
                    h.join().unwrap();
                }
            })
        });
    }
    group.finish();
}
