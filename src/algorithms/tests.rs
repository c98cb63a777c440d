//! End-to-end driver tests on small reference graphs.

use super::*;
use crate::device::{MemorySpace, Queue};
use crate::formats::Coo;
use crate::graph::{self, CsrGraph, Properties};
use crate::io;
use crate::types::Weight;

fn queue() -> Queue {
    Queue::with_geometry(2 * crate::types::WORD_BITS, 8)
}

fn symmetric_graph<W: Weight>(
    queue: &Queue,
    vertices: usize,
    edges: &[(u32, u32)],
    weight: W,
) -> CsrGraph<W> {
    let mut rows = Vec::new();
    let mut cols = Vec::new();
    for &(u, v) in edges {
        rows.push(u);
        cols.push(v);
        rows.push(v);
        cols.push(u);
    }
    let values = vec![weight; rows.len()];
    let coo = Coo::new(rows, cols, values);
    let csr = io::csr::from_coo_with_vertex_count(&coo, vertices).unwrap();
    graph::build(queue, &csr, Properties { directed: false, weighted: true }, MemorySpace::Shared)
        .unwrap()
}

/// Six vertices, symmetric edges {(0,1),(0,2),(1,2),(2,3),(2,4),(4,5)}.
fn g6<W: Weight>(queue: &Queue, weight: W) -> CsrGraph<W> {
    symmetric_graph(queue, 6, &[(0, 1), (0, 2), (1, 2), (2, 3), (2, 4), (4, 5)], weight)
}

#[test]
fn test_bfs_from_0_on_g6() {
    let queue = queue();
    let graph = g6::<u32>(&queue, 1);
    let mut bfs = Bfs::new(&graph);
    bfs.init(0).unwrap();
    bfs.run().unwrap();
    assert_eq!(bfs.distances().unwrap(), vec![0, 1, 1, 2, 2, 3]);
    assert_eq!(bfs.visited_vertices().unwrap(), 6);
}

#[test]
fn test_bfs_from_5_on_g6() {
    let queue = queue();
    let graph = g6::<u32>(&queue, 1);
    let mut bfs = Bfs::new(&graph);
    bfs.init(5).unwrap();
    bfs.run().unwrap();
    assert_eq!(bfs.distances().unwrap(), vec![3, 3, 2, 3, 1, 0]);
}

#[test]
fn test_bfs_parents_form_a_tree() {
    let queue = queue();
    let graph = g6::<u32>(&queue, 1);
    let mut bfs = Bfs::new(&graph);
    bfs.init(0).unwrap();
    bfs.run().unwrap();

    let distances = bfs.distances().unwrap();
    let parents = bfs.parents().unwrap();
    assert_eq!(parents[0], crate::types::NO_PARENT);
    for v in 1..6 {
        let p = parents[v] as usize;
        assert_eq!(distances[v], distances[p] + 1, "vertex {v}");
    }
}

#[test]
fn test_bfs_unreached_vertices_keep_the_sentinel() {
    let queue = queue();
    // 0 - 1 and an isolated pair 2 - 3.
    let graph = symmetric_graph::<u32>(&queue, 4, &[(0, 1), (2, 3)], 1);
    let mut bfs = Bfs::new(&graph);
    bfs.init(0).unwrap();
    bfs.run().unwrap();
    assert_eq!(bfs.distances().unwrap(), vec![0, 1, 5, 5]);
    assert_eq!(bfs.visited_vertices().unwrap(), 2);
}

#[test]
fn test_bfs_requires_init() {
    let queue = queue();
    let graph = g6::<u32>(&queue, 1);
    let mut bfs = Bfs::new(&graph);
    assert!(bfs.run().unwrap_err().to_string().contains("initialized"));
}

#[test]
fn test_bfs_rejects_out_of_range_source() {
    let queue = queue();
    let graph = g6::<u32>(&queue, 1);
    let mut bfs = Bfs::new(&graph);
    assert!(bfs.init(6).unwrap_err().to_string().contains("out of range"));
}

#[test]
fn test_sssp_unit_weights_on_g6() {
    let queue = queue();
    let graph = g6::<u32>(&queue, 1);
    let mut sssp = Sssp::new(&graph);
    sssp.init(0).unwrap();
    sssp.run().unwrap();
    assert_eq!(sssp.distances().unwrap(), vec![0, 1, 1, 2, 2, 3]);
}

#[test]
fn test_sssp_prefers_lighter_paths() {
    let queue = queue();
    // 0 -> 1 costs 5 directly but 2 through vertex 2.
    let coo = Coo::new(vec![0, 0, 2], vec![1, 2, 1], vec![5.0f32, 1.0, 1.0]);
    let csr = io::csr::from_coo_with_vertex_count(&coo, 3).unwrap();
    let graph = graph::build(
        &queue,
        &csr,
        Properties { directed: true, weighted: true },
        MemorySpace::Shared,
    )
    .unwrap();

    let mut sssp = Sssp::new(&graph);
    sssp.init(0).unwrap();
    sssp.run().unwrap();
    assert_eq!(sssp.distances().unwrap(), vec![0.0, 2.0, 1.0]);
    assert_eq!(sssp.parent(1).unwrap(), 2);
}

#[test]
fn test_sssp_leaves_unreachable_at_max() {
    let queue = queue();
    let coo = Coo::new(vec![0], vec![1], vec![1u32]);
    let csr = io::csr::from_coo_with_vertex_count(&coo, 3).unwrap();
    let graph = graph::build(
        &queue,
        &csr,
        Properties { directed: true, weighted: true },
        MemorySpace::Shared,
    )
    .unwrap();

    let mut sssp = Sssp::new(&graph);
    sssp.init(0).unwrap();
    sssp.run().unwrap();
    assert_eq!(sssp.distances().unwrap(), vec![0, 1, u32::MAX]);
}

#[test]
fn test_cc_on_g6_labels_everything_5() {
    let queue = queue();
    let graph = g6::<u32>(&queue, 1);
    let mut cc = ConnectedComponents::new(&graph);
    cc.init().unwrap();
    cc.run().unwrap();
    assert_eq!(cc.labels().unwrap(), vec![5; 6]);
}

#[test]
fn test_cc_on_two_components() {
    let queue = queue();
    // Vertices 0..=4 connected, vertex 5 isolated.
    let graph = symmetric_graph::<u32>(&queue, 6, &[(0, 1), (1, 2), (2, 3), (3, 4)], 1);
    let mut cc = ConnectedComponents::new(&graph);
    cc.init().unwrap();
    cc.run().unwrap();

    let labels = cc.labels().unwrap();
    assert!(labels[0..5].iter().all(|&l| l == labels[0]));
    assert_eq!(labels[5], 5);
}

#[test]
fn test_tc_on_g6_finds_the_single_triangle() {
    let queue = queue();
    let graph = g6::<u32>(&queue, 1);
    let mut tc = TriangleCount::new(&graph);
    tc.init().unwrap();
    tc.run().unwrap();

    let per_vertex = tc.per_vertex().unwrap();
    assert_eq!(per_vertex.iter().sum::<u32>(), 3);
    assert_eq!(tc.total().unwrap(), 1);
}

#[test]
fn test_tc_on_the_embedded_coo_sample() {
    let queue = queue();
    let (coo, vertices) =
        io::coo::from_reader::<u32, _>(io::matrices::SYMMETRIC_6_NODES_COO.as_bytes(), false)
            .unwrap();
    let csr = io::csr::from_coo_with_vertex_count(&coo, vertices).unwrap();
    let graph = graph::build(
        &queue,
        &csr,
        Properties { directed: false, weighted: false },
        MemorySpace::Shared,
    )
    .unwrap();

    let mut tc = TriangleCount::new(&graph);
    tc.init().unwrap();
    tc.run().unwrap();
    assert_eq!(tc.total().unwrap(), 1);
    assert_eq!(crate::validate::tc_reference(&csr), 1);
}

#[test]
fn test_tc_counts_every_triangle_of_k4() {
    let queue = queue();
    let graph =
        symmetric_graph::<u32>(&queue, 4, &[(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)], 1);
    let mut tc = TriangleCount::new(&graph);
    tc.init().unwrap();
    tc.run().unwrap();
    assert_eq!(tc.total().unwrap(), 4);
}

#[test]
fn test_bc_on_a_path() {
    let queue = queue();
    // 0 - 1 - 2 - 3: from source 0 the interior dependencies are 2 and 1.
    let graph = symmetric_graph::<f32>(&queue, 4, &[(0, 1), (1, 2), (2, 3)], 1.0);
    let mut bc = BetweennessCentrality::new(&graph);
    bc.init(0).unwrap();
    bc.run().unwrap();

    let scores = bc.centralities().unwrap();
    assert_eq!(scores, vec![0.0, 2.0, 1.0, 0.0]);
}

#[test]
fn test_bc_on_g6_from_0() {
    let queue = queue();
    let graph = g6::<f32>(&queue, 1.0);
    let mut bc = BetweennessCentrality::new(&graph);
    bc.init(0).unwrap();
    bc.run().unwrap();

    // Levels from 0: {0}, {1,2}, {3,4}, {5}; every sigma is 1, so vertex 2
    // carries its three descendants and vertex 4 carries vertex 5.
    assert_eq!(bc.centralities().unwrap(), vec![0.0, 0.0, 3.0, 0.0, 1.0, 0.0]);
    assert_eq!(bc.level(5).unwrap(), 3);
}

#[test]
fn test_pr_conserves_mass_on_g6() {
    let queue = queue();
    let graph = g6::<f32>(&queue, 1.0);
    let mut pr = PageRank::new(&graph);
    pr.init(PageRankConfig::default()).unwrap();
    pr.run().unwrap();

    let ranks = pr.ranks().unwrap();
    let total: f32 = ranks.iter().sum();
    assert!((total - 1.0).abs() < 1e-3, "mass drifted to {total}");
    // Vertex 2 has the highest degree and the highest rank.
    let top = ranks
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(b.1).expect("finite ranks"))
        .map(|(v, _)| v);
    assert_eq!(top, Some(2));
    assert!(pr.iterations().unwrap() <= 100);
}

#[test]
fn test_pr_is_uniform_on_a_ring() {
    let queue = queue();
    let n = 8u32;
    let edges: Vec<(u32, u32)> = (0..n).map(|v| (v, (v + 1) % n)).collect();
    let graph = symmetric_graph::<f32>(&queue, n as usize, &edges, 1.0);
    let mut pr = PageRank::new(&graph);
    pr.init(PageRankConfig::default()).unwrap();
    pr.run().unwrap();

    let ranks = pr.ranks().unwrap();
    for &r in &ranks {
        assert!((r - 1.0 / n as f32).abs() < 1e-4);
    }
}

#[test]
fn test_bfs_matches_the_reference_on_a_larger_graph() {
    let queue = queue();
    // Deterministic pseudo-random symmetric graph over a few hundred
    // vertices, enough to span several bitmap words and workgroups.
    let n = 500u32;
    let mut rows = Vec::new();
    let mut cols = Vec::new();
    for v in 0..n {
        for u in [(v * 7 + 1) % n, (v * 13 + 5) % n] {
            if u != v {
                rows.push(v);
                cols.push(u);
                rows.push(u);
                cols.push(v);
            }
        }
    }
    let values = vec![1u32; rows.len()];
    let csr = io::csr::from_coo_with_vertex_count(&Coo::new(rows, cols, values), n as usize)
        .unwrap();
    let graph = graph::build(
        &queue,
        &csr,
        Properties { directed: false, weighted: false },
        MemorySpace::Shared,
    )
    .unwrap();

    let mut bfs = Bfs::new(&graph);
    bfs.init(0).unwrap();
    bfs.run().unwrap();

    assert_eq!(bfs.distances().unwrap(), crate::validate::bfs_reference(&csr, 0));
}
