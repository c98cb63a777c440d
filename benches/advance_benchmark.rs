use criterion::{black_box, criterion_group, criterion_main, Criterion};

use surge::formats::Coo;
use surge::graph::{self, Properties};
use surge::operators::advance;
use surge::{io, LoadBalancer, MemorySpace, MlbFrontier, Queue};

/// Deterministic pseudo-random symmetric graph with a skewed degree
/// distribution (a handful of hubs plus a sparse background).
fn skewed_graph(queue: &Queue, n: u32) -> surge::CsrGraph<u32> {
    let mut rows = Vec::new();
    let mut cols = Vec::new();
    let mut push = |u: u32, v: u32| {
        if u != v {
            rows.push(u);
            cols.push(v);
            rows.push(v);
            cols.push(u);
        }
    };
    for v in 0..n {
        push(v, (v * 7 + 1) % n);
        push(v, (v * 31 + 3) % n);
        // Hubs 0..4 connect to a slice of everything.
        if v % 11 == 0 {
            push(v % 5, v);
        }
    }
    let values = vec![1u32; rows.len()];
    let csr = io::csr::from_coo_with_vertex_count(&Coo::new(rows, cols, values), n as usize)
        .unwrap();
    graph::build(queue, &csr, Properties::default(), MemorySpace::Shared).unwrap()
}

fn bench_advance(c: &mut Criterion) {
    let queue = Queue::with_geometry(128, 32);
    let n = 100_000u32;
    let graph = skewed_graph(&queue, n);

    let input: MlbFrontier = MlbFrontier::new(&queue, n as usize).unwrap();
    for v in (0..n).step_by(17) {
        input.insert(v);
    }
    let output: MlbFrontier = MlbFrontier::new(&queue, n as usize).unwrap();

    c.bench_function("advance_workgroup_mapped", |b| {
        b.iter(|| {
            advance::frontier(
                LoadBalancer::WorkgroupMapped,
                &graph,
                &input,
                &output,
                |_, dst, _, _| black_box(dst) % 2 == 0,
            )
            .unwrap()
            .wait()
            .unwrap();
            output.clear().unwrap();
        });
    });

    c.bench_function("advance_workitem_mapped", |b| {
        b.iter(|| {
            advance::frontier(
                LoadBalancer::WorkitemMapped,
                &graph,
                &input,
                &output,
                |_, dst, _, _| black_box(dst) % 2 == 0,
            )
            .unwrap()
            .wait()
            .unwrap();
            output.clear().unwrap();
        });
    });

    c.bench_function("advance_graph_view", |b| {
        b.iter(|| {
            advance::vertices_discard(LoadBalancer::WorkgroupMapped, &graph, |_, dst, _, _| {
                black_box(dst);
                false
            })
            .unwrap()
            .wait()
            .unwrap();
        });
    });
}

criterion_group!(benches, bench_advance);
criterion_main!(benches);
