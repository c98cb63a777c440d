//! Single-source shortest paths.

use std::sync::atomic::AtomicU32;
use std::sync::Arc;

use log::debug;

use crate::device::{DeviceBuffer, MemorySpace};
use crate::error::{Error, Result};
use crate::frontier::MlbFrontier;
use crate::graph::CsrGraph;
use crate::operators::{advance, filter, LoadBalancer};
use crate::profiler::Profiler;
use crate::sync;
use crate::types::{VertexId, Weight, NO_PARENT};

const NEVER_STAMPED: u32 = u32::MAX;

struct SsspInstance<W: Weight> {
    source: VertexId,
    distances: DeviceBuffer<W::Atom>,
    parents: DeviceBuffer<AtomicU32>,
    visited_stamp: DeviceBuffer<AtomicU32>,
}

/// Frontier-based label-correcting shortest paths.
///
/// Relaxation is a single atomic fetch-min per visited edge; an external
/// filter pass stamps vertices with the iteration counter so a vertex
/// dequeued in the current round is not requeued by it. Unreached vertices
/// keep the maximum weight value as their distance.
pub struct Sssp<'g, W: Weight> {
    graph: &'g CsrGraph<W>,
    profiler: Option<Arc<Profiler>>,
    instance: Option<SsspInstance<W>>,
}

impl<'g, W: Weight> Sssp<'g, W> {
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

        let distances: DeviceBuffer<W::Atom> = queue.alloc(n, MemorySpace::Shared)?;
        queue.fill(&distances, W::max_value()).wait()?;
        sync::store(&distances.as_slice()[source as usize], W::zero());

        let parents: DeviceBuffer<AtomicU32> = queue.alloc(n, MemorySpace::Shared)?;
        queue.fill(&parents, NO_PARENT).wait()?;

        let visited_stamp: DeviceBuffer<AtomicU32> = queue.alloc(n, MemorySpace::Shared)?;
        queue.fill(&visited_stamp, NEVER_STAMPED).wait()?;

        self.instance = Some(SsspInstance {
            source,
            distances,
            parents,
            visited_stamp,
        });
        Ok(())
    }

    /// Drops the per-run state.
    pub fn reset(&mut self) {
        self.instance = None;
    }

    /// Runs relaxation until no distance improves.
    pub fn run(&mut self) -> Result<()> {
        let instance = self.instance.as_ref().ok_or(Error::NotInitialized("SSSP"))?;
        let queue = self.graph.queue();
        let n = self.graph.vertex_count();

        let in_frontier: MlbFrontier = MlbFrontier::new(queue, n)?;
        let out_frontier: MlbFrontier = MlbFrontier::new(queue, n)?;
        in_frontier.insert(instance.source);

        let distances = instance.distances.as_slice();
        let parents = instance.parents.as_slice();
        let visited_stamp = instance.visited_stamp.as_slice();

        let mut iter: u32 = 0;
        while !in_frontier.empty()? {
            let event = advance::frontier(
                LoadBalancer::WorkgroupMapped,
                self.graph,
                &in_frontier,
                &out_frontier,
                |src, dst, _edge, weight| {
                    let candidate = sync::load(&distances[src as usize]) + weight;
                    let previous = sync::fetch_min(&distances[dst as usize], candidate);
                    if candidate < previous {
                        // Last relaxer wins; the parent may trail the final
                        // distance, which the benign-race contract allows.
                        sync::store(&parents[dst as usize], src);
                        true
                    } else {
                        false
                    }
                },
            )?;
            if let Some(profiler) = &self.profiler {
                profiler.record(&event, "sssp::advance");
            }
            event.wait()?;

            let event = filter::external(self.graph, &out_frontier, &in_frontier, |vertex| {
                let stamp = &visited_stamp[vertex as usize];
                if sync::load(stamp) == iter {
                    false
                } else {
                    sync::store(stamp, iter);
                    true
                }
            })?;
            if let Some(profiler) = &self.profiler {
                profiler.record(&event, "sssp::filter");
            }
            event.wait()?;

            out_frontier.clear()?;
            iter += 1;
            debug!("sssp iteration {iter} done");
        }
        Ok(())
    }

    /// Distance of `v` from the source.
    pub fn distance(&self, v: VertexId) -> Result<W> {
        let instance = self.instance.as_ref().ok_or(Error::NotInitialized("SSSP"))?;
        Ok(sync::load(&instance.distances.as_slice()[v as usize]))
    }

    /// All distances; unreached vertices hold `W::max_value()`.
    pub fn distances(&self) -> Result<Vec<W>> {
        let instance = self.instance.as_ref().ok_or(Error::NotInitialized("SSSP"))?;
        Ok(instance.distances.as_slice().iter().map(sync::load).collect())
    }

    /// Parent of `v` on a relaxation path (`NO_PARENT` if unreached).
    pub fn parent(&self, v: VertexId) -> Result<VertexId> {
        let instance = self.instance.as_ref().ok_or(Error::NotInitialized("SSSP"))?;
        Ok(sync::load(&instance.parents.as_slice()[v as usize]))
    }

    /// Number of vertices the relaxation reached.
    pub fn visited_vertices(&self) -> Result<usize> {
        let distances = self.distances()?;
        Ok(distances.iter().filter(|&&d| d < W::max_value()).count())
    }

    /// Total out-degree of the reached vertices.
    pub fn visited_edges(&self) -> Result<u64> {
        let distances = self.distances()?;
        Ok(distances
            .iter()
            .enumerate()
            .filter(|(_, &d)| d < W::max_value())
            .map(|(v, _)| self.graph.degree(v as VertexId) as u64)
            .sum())
    }
}
