//! Vertex-centric algorithm drivers.
//!
//! Every driver owns two swappable frontiers and its per-vertex state
//! arrays, and loops the advance (and filter) operators until convergence.
//! The pattern is `new` → `init` (validates inputs, allocates state) → `run`
//! → accessors; `run` before `init` fails with
//! [`NotInitialized`](crate::error::Error::NotInitialized).

mod bc;
mod bfs;
mod cc;
mod pr;
mod sssp;
mod tc;

#[cfg(test)]
mod tests;

pub use bc::BetweennessCentrality;
pub use bfs::Bfs;
pub use cc::ConnectedComponents;
pub use pr::{PageRank, PageRankConfig};
pub use sssp::Sssp;
pub use tc::TriangleCount;
