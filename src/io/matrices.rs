//! Embedded sample matrices for tests and smoke runs.

/// Dense adjacency text of a symmetric 6-vertex graph with one triangle.
///
/// Edges: (0,1), (0,2), (1,2), (2,3), (2,4), (4,5).
pub const SYMMETRIC_6_NODES: &str = "\
6
0 1 1 0 0 0
1 0 1 0 0 0
1 1 0 1 1 0
0 0 1 0 0 0
0 0 1 0 0 1
0 0 0 0 1 0
";

/// Dense adjacency text with vertices 0..=4 connected and vertex 5 isolated.
pub const TWO_COMPONENTS_6_NODES: &str = "\
6
0 1 0 0 0 0
1 0 1 0 0 0
0 1 0 1 0 0
0 0 1 0 1 0
0 0 0 1 0 0
0 0 0 0 0 0
";

/// COO text of the symmetric 6-vertex graph (directed entries, both
/// directions listed).
pub const SYMMETRIC_6_NODES_COO: &str = "\
6 6 12
0 1
1 0
0 2
2 0
1 2
2 1
2 3
3 2
2 4
4 2
4 5
5 4
";
