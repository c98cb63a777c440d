//! Betweenness centrality (Brandes, single source).

use std::sync::atomic::AtomicU32;
use std::sync::Arc;

use log::debug;
use num_traits::Float;

use crate::device::{DeviceBuffer, MemorySpace};
use crate::error::{Error, Result};
use crate::frontier::{FrontierState, MlbFrontier};
use crate::graph::CsrGraph;
use crate::operators::{advance, LoadBalancer};
use crate::profiler::Profiler;
use crate::sync;
use crate::types::{VertexId, Weight};

const INVALID_LABEL: u32 = u32::MAX;

struct BcInstance<W: Weight> {
    source: VertexId,
    labels: DeviceBuffer<AtomicU32>,
    sigma: DeviceBuffer<W::Atom>,
    delta: DeviceBuffer<W::Atom>,
    centrality: DeviceBuffer<W::Atom>,
}

/// Single-source betweenness centrality in two phases.
///
/// The forward phase is a BFS-style labeling that accumulates shortest-path
/// counts (`sigma`) concurrently: a lane claims an unlabeled destination with
/// a compare-and-swap and every lane whose observed label matches the
/// candidate level adds its source's sigma. A snapshot of each level's
/// frontier is pushed onto a host stack. The backward phase pops the
/// snapshots deepest-first and accumulates the pair dependency into `delta`
/// and the centrality score; it terminates when the stack is empty.
pub struct BetweennessCentrality<'g, W: Weight + Float> {
    graph: &'g CsrGraph<W>,
    profiler: Option<Arc<Profiler>>,
    instance: Option<BcInstance<W>>,
}

impl<'g, W: Weight + Float> BetweennessCentrality<'g, W> {
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

    /// Allocates per-vertex state for a run from `source`.
    pub fn init(&mut self, source: VertexId) -> Result<()> {
        let n = self.graph.vertex_count();
        if source as usize >= n {
            return Err(Error::InvalidInput(format!(
                "source vertex {source} out of range for {n} vertices"
            )));
        }
        let queue = self.graph.queue();

        let labels: DeviceBuffer<AtomicU32> = queue.alloc(n, MemorySpace::Shared)?;
        queue.fill(&labels, INVALID_LABEL).wait()?;
        sync::store(&labels.as_slice()[source as usize], 0);

        let sigma: DeviceBuffer<W::Atom> = queue.alloc(n, MemorySpace::Device)?;
        queue.fill(&sigma, W::zero()).wait()?;
        sync::store(&sigma.as_slice()[source as usize], W::one());

        let delta: DeviceBuffer<W::Atom> = queue.alloc(n, MemorySpace::Device)?;
        queue.fill(&delta, W::zero()).wait()?;

        let centrality: DeviceBuffer<W::Atom> = queue.alloc(n, MemorySpace::Device)?;
        queue.fill(&centrality, W::zero()).wait()?;

        self.instance = Some(BcInstance {
            source,
            labels,
            sigma,
            delta,
            centrality,
        });
        Ok(())
    }

    /// Drops the per-run state.
    pub fn reset(&mut self) {
        self.instance = None;
    }

    /// Runs the forward and backward phases.
    pub fn run(&mut self) -> Result<()> {
        let instance = self.instance.as_ref().ok_or(Error::NotInitialized("BC"))?;
        let queue = self.graph.queue();
        let n = self.graph.vertex_count();
        let source = instance.source;

        let labels = instance.labels.as_slice();
        let sigma = instance.sigma.as_slice();
        let delta = instance.delta.as_slice();
        let centrality = instance.centrality.as_slice();

        let mut in_frontier: MlbFrontier = MlbFrontier::new(queue, n)?;
        let mut out_frontier: MlbFrontier = MlbFrontier::new(queue, n)?;
        in_frontier.insert(source);

        let mut snapshots: Vec<FrontierState> = Vec::new();

        while !in_frontier.empty()? {
            let event = advance::frontier(
                LoadBalancer::WorkgroupMapped,
                self.graph,
                &in_frontier,
                &out_frontier,
                |src, dst, _edge, _weight| {
                    let candidate = sync::load(&labels[src as usize]) + 1;
                    let mut observed = INVALID_LABEL;
                    let claimed = sync::cas(&labels[dst as usize], &mut observed, candidate);
                    if !claimed && observed != candidate {
                        return false;
                    }
                    let count = sync::load(&sigma[src as usize]);
                    sync::fetch_add(&sigma[dst as usize], count);
                    claimed
                },
            )?;
            if let Some(profiler) = &self.profiler {
                profiler.record(&event, "bc::forward");
            }
            event.wait()?;

            snapshots.push(out_frontier.save_state());
            MlbFrontier::swap(&mut in_frontier, &mut out_frontier);
            out_frontier.clear()?;
        }
        debug!("bc forward pass reached depth {}", snapshots.len());

        // Deepest wavefront first; the loop ends when the stack is drained.
        while let Some(state) = snapshots.pop() {
            in_frontier.load_state(&state);
            let event = advance::frontier_discard(
                LoadBalancer::WorkgroupMapped,
                self.graph,
                &in_frontier,
                |src, dst, _edge, _weight| {
                    if src == source {
                        return false;
                    }
                    let src_label = sync::load(&labels[src as usize]);
                    if src_label == INVALID_LABEL {
                        return false;
                    }
                    if src_label + 1 != sync::load(&labels[dst as usize]) {
                        return false;
                    }
                    let update = sync::load(&sigma[src as usize])
                        / sync::load(&sigma[dst as usize])
                        * (W::one() + sync::load(&delta[dst as usize]));
                    sync::fetch_add(&delta[src as usize], update);
                    sync::fetch_add(&centrality[src as usize], update);
                    false
                },
            )?;
            if let Some(profiler) = &self.profiler {
                profiler.record(&event, "bc::backward");
            }
            event.wait()?;
        }
        Ok(())
    }

    /// Centrality score of `v`.
    pub fn centrality(&self, v: VertexId) -> Result<W> {
        let instance = self.instance.as_ref().ok_or(Error::NotInitialized("BC"))?;
        Ok(sync::load(&instance.centrality.as_slice()[v as usize]))
    }

    /// All centrality scores.
    pub fn centralities(&self) -> Result<Vec<W>> {
        let instance = self.instance.as_ref().ok_or(Error::NotInitialized("BC"))?;
        Ok(instance.centrality.as_slice().iter().map(sync::load).collect())
    }

    /// BFS level of `v` from the source (`u32::MAX` if unreached).
    pub fn level(&self, v: VertexId) -> Result<u32> {
        let instance = self.instance.as_ref().ok_or(Error::NotInitialized("BC"))?;
        Ok(sync::load(&instance.labels.as_slice()[v as usize]))
    }
}
