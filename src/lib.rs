//! # `surge` - Data-Parallel Frontier Graph Analytics
//!
//! A frontier-based engine executing vertex-centric graph algorithms (BFS,
//! SSSP, connected components, betweenness centrality, triangle counting,
//! PageRank) on sparse CSR graphs with a SIMT-style data-parallel execution
//! model.
//!
//! ## Key Pieces
//!
//! - **Multi-level bitmap frontier**: a hierarchical bitmap tracking the
//!   active wavefront across kernel launches
//! - **Workgroup-mapped advance**: one kernel visiting every outgoing edge of
//!   each active vertex with three-tier, degree-proportional load balancing
//! - **Lock-free labeling**: relaxed device-scope atomics are the only way
//!   kernels mutate shared per-vertex state
//! - **CPU device emulation**: workgroups dispatch over a scoped thread pool;
//!   one thread owns a workgroup, so barriers become phase boundaries
//!
//! ## Example
//!
//! ```rust
//! use surge::algorithms::Bfs;
//! use surge::formats::Coo;
//! use surge::graph::{self, Properties};
//! use surge::{io, MemorySpace, Queue};
//!
//! # fn main() -> surge::Result<()> {
//! // A directed path 0 -> 1 -> 2.
//! let coo = Coo::new(vec![0, 1], vec![1, 2], vec![1u32, 1]);
//! let csr = io::csr::from_coo(&coo)?;
//!
//! let queue = Queue::new();
//! let graph = graph::build(&queue, &csr, Properties::default(), MemorySpace::Shared)?;
//!
//! let mut bfs = Bfs::new(&graph);
//! bfs.init(0)?;
//! bfs.run()?;
//! assert_eq!(bfs.distances()?, vec![0, 1, 2]);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod algorithms;
pub mod cli;
pub mod device;
pub mod error;
pub mod formats;
pub mod frontier;
pub mod graph;
pub mod io;
pub mod operators;
pub mod profiler;
pub mod sync;
pub mod types;
pub mod validate;

pub use device::{DeviceBuffer, Event, MemorySpace, Queue};
pub use error::{Error, Result};
pub use formats::{Coo, Csr};
pub use frontier::{MlbFrontier, NoFrontier};
pub use graph::CsrGraph;
pub use operators::LoadBalancer;
pub use profiler::Profiler;

// Compile-time layout checks for the values captured into kernels.
const _: () = {
    use core::mem;

    // The "no output frontier" marker must stay zero-sized.
    assert!(mem::size_of::<NoFrontier>() == 0);

    // Bitmap words are exactly the configured width.
    assert!(mem::size_of::<types::BitmapWord>() * 8 == types::WORD_BITS);

    // Device views are captured by copy into every kernel; keep them small.
    assert!(mem::size_of::<graph::CsrView<'static, u32>>() <= 64);
    assert!(mem::size_of::<frontier::MlbView<'static, 2>>() <= 96);
};
