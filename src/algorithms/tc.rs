//! Triangle counting.

use std::sync::atomic::{AtomicU32, AtomicU64};
use std::sync::Arc;

use crate::device::{DeviceBuffer, MemorySpace};
use crate::error::{Error, Result};
use crate::graph::CsrGraph;
use crate::operators::foreach;
use crate::profiler::Profiler;
use crate::sync;
use crate::types::{EdgeId, VertexId, Weight};

struct TcInstance {
    triangles: DeviceBuffer<AtomicU32>,
}

/// Edge-parallel triangle counting on a symmetric graph.
///
/// One lane per edge; lanes whose edge satisfies `src < dst` merge-intersect
/// the two sorted neighbor rows and add the match count to `triangles[src]`.
/// Each triangle is charged once per corner that way, so the total is the
/// per-vertex sum divided by three. Requires the sorted-row invariant and a
/// symmetric edge set.
pub struct TriangleCount<'g, W: Weight> {
    graph: &'g CsrGraph<W>,
    profiler: Option<Arc<Profiler>>,
    instance: Option<TcInstance>,
}

impl<'g, W: Weight> TriangleCount<'g, W> {
    /// Creates a driver over `graph`.
    pub fn new(graph: &'g CsrGraph<W>) -> Self {
        Self {
            graph,
            profiler: None,
            instance: None,
        }
    }

    /// Attaches a profiler; every kernel event is recorded on it.
    pub fn with_profiler(mut self, profiler: Arc<Profiler>) -> Self {
        self.profiler = Some(profiler);
        self
    }

    /// Allocates the per-vertex triangle counters.
    pub fn init(&mut self) -> Result<()> {
        let n = self.graph.vertex_count();
        let triangles: DeviceBuffer<AtomicU32> =
            self.graph.queue().alloc(n, MemorySpace::Device)?;
        self.instance = Some(TcInstance { triangles });
        Ok(())
    }

    /// Drops the per-run state.
    pub fn reset(&mut self) {
        self.instance = None;
    }

    /// Counts triangles with one lane per edge.
    pub fn run(&mut self) -> Result<()> {
        let instance = self.instance.as_ref().ok_or(Error::NotInitialized("TC"))?;
        let queue = self.graph.queue();
        let view = self.graph.view();
        let triangles = instance.triangles.as_slice();

        let event = foreach::elements(queue, self.graph.edge_count(), |edge| {
            let edge = edge as EdgeId;
            let src = view.source_of(edge);
            let dst = view.destination_of(edge);
            // Each undirected edge appears in both directions; only the
            // ascending one counts.
            if src >= dst {
                return;
            }
            let matches = view.intersect(src, dst, |_| {});
            if matches > 0 {
                sync::fetch_add(&triangles[src as usize], matches);
            }
        });
        if let Some(profiler) = &self.profiler {
            profiler.record(&event, "tc");
        }
        event.wait()?;
        Ok(())
    }

    /// Triangles charged to `v`.
    pub fn triangles(&self, v: VertexId) -> Result<u32> {
        let instance = self.instance.as_ref().ok_or(Error::NotInitialized("TC"))?;
        Ok(sync::load(&instance.triangles.as_slice()[v as usize]))
    }

    /// Per-vertex triangle charges.
    pub fn per_vertex(&self) -> Result<Vec<u32>> {
        let instance = self.instance.as_ref().ok_or(Error::NotInitialized("TC"))?;
        Ok(instance.triangles.as_slice().iter().map(sync::load).collect())
    }

    /// Total number of triangles (per-vertex sum over three).
    pub fn total(&self) -> Result<u64> {
        let instance = self.instance.as_ref().ok_or(Error::NotInitialized("TC"))?;
        let queue = self.graph.queue();
        let triangles = instance.triangles.as_slice();
        let sum = AtomicU64::new(0);
        foreach::elements(queue, triangles.len(), |v| {
            let count = sync::load(&triangles[v as usize]);
            if count > 0 {
                sync::fetch_add(&sum, count as u64);
            }
        })
        .wait()?;
        Ok(sync::load(&sum) / 3)
    }
}
