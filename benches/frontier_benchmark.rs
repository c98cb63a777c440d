use criterion::{black_box, criterion_group, criterion_main, Criterion};

use surge::{MlbFrontier, Queue};

fn bench_frontier_ops(c: &mut Criterion) {
    let queue = Queue::with_geometry(128, 32);
    let n = 1_000_000;
    let frontier: MlbFrontier = MlbFrontier::new(&queue, n).unwrap();

    c.bench_function("mlb_insert_sparse", |b| {
        b.iter(|| {
            for x in (0..n as u32).step_by(1009) {
                frontier.insert(black_box(x));
            }
        });
    });

    c.bench_function("mlb_check", |b| {
        b.iter(|| {
            let mut hits = 0u32;
            for x in (0..n as u32).step_by(997) {
                hits += u32::from(frontier.check(black_box(x)));
            }
            black_box(hits)
        });
    });

    c.bench_function("mlb_empty", |b| {
        b.iter(|| black_box(frontier.empty().unwrap()));
    });

    c.bench_function("mlb_compute_active_frontier", |b| {
        b.iter(|| {
            // Re-insert to invalidate the cached materialization.
            frontier.insert(0);
            black_box(frontier.compute_active_frontier().unwrap())
        });
    });

    c.bench_function("mlb_clear", |b| {
        b.iter(|| frontier.clear().unwrap());
    });
}

criterion_group!(benches, bench_frontier_ops);
criterion_main!(benches);
