//! Connected components by label propagation.

use std::sync::atomic::AtomicU32;
use std::sync::Arc;

use log::debug;

use crate::device::{DeviceBuffer, MemorySpace};
use crate::error::{Error, Result};
use crate::frontier::MlbFrontier;
use crate::graph::CsrGraph;
use crate::operators::{advance, foreach, LoadBalancer};
use crate::profiler::Profiler;
use crate::sync;
use crate::types::{VertexId, Weight};

struct CcInstance {
    labels: DeviceBuffer<AtomicU32>,
}

/// Max-label propagation to a fixpoint.
///
/// Every vertex starts with its own id as label; each round propagates the
/// larger label across every edge with an atomic fetch-max, so a component
/// converges to the largest vertex id it contains. The first round covers the
/// whole graph, later rounds only the vertices whose label changed.
pub struct ConnectedComponents<'g, W: Weight> {
    graph: &'g CsrGraph<W>,
    profiler: Option<Arc<Profiler>>,
    instance: Option<CcInstance>,
}

impl<'g, W: Weight> ConnectedComponents<'g, W> {
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

    /// Allocates the label array, initialized to the vertex ids.
    pub fn init(&mut self) -> Result<()> {
        let n = self.graph.vertex_count();
        let queue = self.graph.queue();

        let labels: DeviceBuffer<AtomicU32> = queue.alloc(n, MemorySpace::Shared)?;
        {
            let cells = labels.as_slice();
            foreach::elements(queue, n, |v| sync::store(&cells[v as usize], v)).wait()?;
        }

        self.instance = Some(CcInstance { labels });
        Ok(())
    }

    /// Drops the per-run state.
    pub fn reset(&mut self) {
        self.instance = None;
    }

    /// Propagates labels until no vertex changes.
    pub fn run(&mut self) -> Result<()> {
        let instance = self.instance.as_ref().ok_or(Error::NotInitialized("CC"))?;
        let queue = self.graph.queue();
        let n = self.graph.vertex_count();

        let labels = instance.labels.as_slice();
        let propagate = |src: VertexId, dst: VertexId, _edge: u32, _weight: W| {
            let label = sync::load(&labels[src as usize]);
            let old = sync::fetch_max(&labels[dst as usize], label);
            old < label
        };

        let mut in_frontier: MlbFrontier = MlbFrontier::new(queue, n)?;
        let mut out_frontier: MlbFrontier = MlbFrontier::new(queue, n)?;

        let event =
            advance::vertices(LoadBalancer::WorkgroupMapped, self.graph, &out_frontier, propagate)?;
        if let Some(profiler) = &self.profiler {
            profiler.record(&event, "cc::advance");
        }
        event.wait()?;

        let mut rounds = 1usize;
        while !out_frontier.empty()? {
            MlbFrontier::swap(&mut in_frontier, &mut out_frontier);
            out_frontier.clear()?;

            let event = advance::frontier(
                LoadBalancer::WorkgroupMapped,
                self.graph,
                &in_frontier,
                &out_frontier,
                propagate,
            )?;
            if let Some(profiler) = &self.profiler {
                profiler.record(&event, "cc::advance");
            }
            event.wait()?;
            rounds += 1;
        }
        debug!("cc converged after {rounds} rounds");
        Ok(())
    }

    /// Component label of `v`.
    pub fn label(&self, v: VertexId) -> Result<VertexId> {
        let instance = self.instance.as_ref().ok_or(Error::NotInitialized("CC"))?;
        Ok(sync::load(&instance.labels.as_slice()[v as usize]))
    }

    /// All component labels.
    pub fn labels(&self) -> Result<Vec<VertexId>> {
        let instance = self.instance.as_ref().ok_or(Error::NotInitialized("CC"))?;
        Ok(instance.labels.as_slice().iter().map(sync::load).collect())
    }
}
