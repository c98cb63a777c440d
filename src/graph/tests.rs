//! Tests for the device CSR graph.

use super::*;
use crate::formats::Csr;

fn queue() -> Queue {
    Queue::with_geometry(64, 32)
}

/// 0 -> 1, 2
/// 1 -> 2
/// 2 ->
/// 3 -> 1
fn sample() -> Csr<u32> {
    Csr::new(vec![0, 2, 3, 3, 4], vec![1, 2, 2, 1], vec![5, 6, 7, 8]).unwrap()
}

#[test]
fn test_build_copies_all_arrays() {
    let queue = queue();
    let graph = build(&queue, &sample(), Properties::default(), MemorySpace::Shared).unwrap();
    assert_eq!(graph.vertex_count(), 4);
    assert_eq!(graph.edge_count(), 4);
    assert_eq!(graph.row_offsets_to_host(), vec![0, 2, 3, 3, 4]);
    assert_eq!(graph.column_indices_to_host(), vec![1, 2, 2, 1]);
    assert_eq!(graph.edge_values_to_host(), vec![5, 6, 7, 8]);
}

#[test]
fn test_view_projections() {
    let queue = queue();
    let graph = build(&queue, &sample(), Properties::default(), MemorySpace::Shared).unwrap();
    let view = graph.view();

    assert_eq!(view.degree(0), 2);
    assert_eq!(view.degree(2), 0);

    let neighbors: Vec<_> = view.neighbors(0).collect();
    assert_eq!(neighbors, vec![(1, 0), (2, 1)]);

    assert_eq!(view.destination_of(3), 1);
    assert_eq!(view.weight_of(3), 8);
}

#[test]
fn test_source_of_covers_every_edge() {
    let queue = queue();
    let graph = build(&queue, &sample(), Properties::default(), MemorySpace::Shared).unwrap();
    let view = graph.view();

    let expected = [0, 0, 1, 3];
    for (edge, &source) in expected.iter().enumerate() {
        assert_eq!(view.source_of(edge as u32), source, "edge {edge}");
    }
}

#[test]
fn test_source_of_skips_degree_zero_rows() {
    // 0 -> (nothing), 1 -> 2, 2 -> (nothing)
    let csr = Csr::<u32>::new(vec![0, 0, 1, 1], vec![2], vec![1]).unwrap();
    let queue = queue();
    let graph = build(&queue, &csr, Properties::default(), MemorySpace::Shared).unwrap();
    assert_eq!(graph.view().source_of(0), 1);
}

#[test]
fn test_intersect_counts_common_neighbors() {
    // Triangle 0-1-2 plus a pendant 2-3 (directed closure of the triangle).
    let csr = Csr::<u32>::new(
        vec![0, 2, 4, 7, 8],
        vec![1, 2, 0, 2, 0, 1, 3, 2],
        vec![1; 8],
    )
    .unwrap();
    let queue = queue();
    let graph = build(&queue, &csr, Properties::default(), MemorySpace::Shared).unwrap();
    let view = graph.view();

    let mut seen = Vec::new();
    let count = view.intersect(0, 1, |v| seen.push(v));
    assert_eq!(count, 1);
    assert_eq!(seen, vec![2]);

    assert_eq!(view.intersect(2, 3, |_| {}), 0);
}
