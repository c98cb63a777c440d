//! Device-resident graphs.

mod csr;
#[cfg(test)]
mod tests;

pub use csr::{CsrGraph, CsrView, Neighbors};

use crate::device::{MemorySpace, Queue};
use crate::error::Result;
use crate::formats::Csr;
use crate::types::Weight;

/// Structural flags recorded at build time; they do not change the layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct Properties {
    /// Whether the edge set is directed.
    pub directed: bool,
    /// Whether edge values carry meaningful weights.
    pub weighted: bool,
}

/// Uploads a host CSR into `space` and wraps it as a device graph.
pub fn build<W: Weight>(
    queue: &Queue,
    csr: &Csr<W>,
    properties: Properties,
    space: MemorySpace,
) -> Result<CsrGraph<W>> {
    CsrGraph::from_csr(queue, csr, properties, space)
}
