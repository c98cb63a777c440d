//! Vertex frontiers: the active wavefront of a traversal.
//!
//! The engine carries a single frontier implementation, the multi-level
//! bitmap, plus a zero-sized marker for advance calls that discard their
//! output.

mod mlb;
#[cfg(test)]
mod tests;

pub use mlb::{FrontierState, MlbFrontier, MlbView};

/// Zero-sized stand-in for "no output frontier".
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFrontier;
