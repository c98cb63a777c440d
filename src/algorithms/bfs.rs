//! Breadth-first search.

use std::sync::atomic::AtomicU32;
use std::sync::Arc;

use log::debug;

use crate::device::{DeviceBuffer, MemorySpace};
use crate::error::{Error, Result};
use crate::frontier::MlbFrontier;
use crate::graph::CsrGraph;
use crate::operators::advance;
use crate::operators::LoadBalancer;
use crate::profiler::Profiler;
use crate::sync;
use crate::types::{VertexId, Weight, NO_PARENT};

struct BfsInstance {
    source: VertexId,
    distances: DeviceBuffer<AtomicU32>,
    parents: DeviceBuffer<AtomicU32>,
}

/// Level-synchronous BFS from a single source.
///
/// `distance[v]` is the hop count from the source (`vertex_count + 1` for
/// unreached vertices) and `parent[v]` one predecessor on a shortest hop
/// path. Two lanes may race to claim a newly discovered vertex; both observe
/// the sentinel and write the same level, so the distance stays correct even
/// when the parent of record loses the race.
pub struct Bfs<'g, W: Weight> {
    graph: &'g CsrGraph<W>,
    profiler: Option<Arc<Profiler>>,
    instance: Option<BfsInstance>,
}

impl<'g, W: Weight> Bfs<'g, W> {
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

        let distances: DeviceBuffer<AtomicU32> = queue.alloc(n, MemorySpace::Shared)?;
        queue.fill(&distances, (n + 1) as u32).wait()?;
        sync::store(&distances.as_slice()[source as usize], 0);

        let parents: DeviceBuffer<AtomicU32> = queue.alloc(n, MemorySpace::Shared)?;
        queue.fill(&parents, NO_PARENT).wait()?;

        self.instance = Some(BfsInstance {
            source,
            distances,
            parents,
        });
        Ok(())
    }

    /// Drops the per-run state.
    pub fn reset(&mut self) {
        self.instance = None;
    }

    /// Runs the traversal to completion.
    pub fn run(&mut self) -> Result<()> {
        let instance = self.instance.as_ref().ok_or(Error::NotInitialized("BFS"))?;
        let queue = self.graph.queue();
        let n = self.graph.vertex_count();
        let sentinel = (n + 1) as u32;

        let mut in_frontier: MlbFrontier = MlbFrontier::new(queue, n)?;
        let mut out_frontier: MlbFrontier = MlbFrontier::new(queue, n)?;
        in_frontier.insert(instance.source);

        let distances = instance.distances.as_slice();
        let parents = instance.parents.as_slice();

        let mut iter: u32 = 0;
        while !in_frontier.empty()? {
            let level = iter + 1;
            let event = advance::frontier(
                LoadBalancer::WorkgroupMapped,
                self.graph,
                &in_frontier,
                &out_frontier,
                move |src, dst, _edge, _weight| {
                    let distance = &distances[dst as usize];
                    if sync::load(distance) == sentinel {
                        sync::store(distance, level);
                        sync::store(&parents[dst as usize], src);
                        true
                    } else {
                        false
                    }
                },
            )?;
            if let Some(profiler) = &self.profiler {
                profiler.record(&event, "bfs::advance");
            }
            event.wait()?;

            MlbFrontier::swap(&mut in_frontier, &mut out_frontier);
            out_frontier.clear()?;
            iter += 1;
            debug!("bfs level {iter} done");
        }

        if let Some(profiler) = &self.profiler {
            profiler.add_visited_edges(self.visited_edges()?);
        }
        Ok(())
    }

    /// Distance of `v` from the source.
    pub fn distance(&self, v: VertexId) -> Result<u32> {
        let instance = self.instance.as_ref().ok_or(Error::NotInitialized("BFS"))?;
        Ok(sync::load(&instance.distances.as_slice()[v as usize]))
    }

    /// All distances; unreached vertices hold `vertex_count + 1`.
    pub fn distances(&self) -> Result<Vec<u32>> {
        let instance = self.instance.as_ref().ok_or(Error::NotInitialized("BFS"))?;
        Ok(instance.distances.as_slice().iter().map(sync::load).collect())
    }

    /// Parent of `v` on a shortest hop path (`NO_PARENT` if unreached).
    pub fn parent(&self, v: VertexId) -> Result<VertexId> {
        let instance = self.instance.as_ref().ok_or(Error::NotInitialized("BFS"))?;
        Ok(sync::load(&instance.parents.as_slice()[v as usize]))
    }

    /// All parents.
    pub fn parents(&self) -> Result<Vec<VertexId>> {
        let instance = self.instance.as_ref().ok_or(Error::NotInitialized("BFS"))?;
        Ok(instance.parents.as_slice().iter().map(sync::load).collect())
    }

    /// Number of vertices the traversal reached.
    pub fn visited_vertices(&self) -> Result<usize> {
        let distances = self.distances()?;
        let sentinel = (self.graph.vertex_count() + 1) as u32;
        Ok(distances.iter().filter(|&&d| d != sentinel).count())
    }

    /// Total out-degree of the reached vertices.
    pub fn visited_edges(&self) -> Result<u64> {
        let distances = self.distances()?;
        let sentinel = (self.graph.vertex_count() + 1) as u32;
        Ok(distances
            .iter()
            .enumerate()
            .filter(|(_, &d)| d != sentinel)
            .map(|(v, _)| self.graph.degree(v as VertexId) as u64)
            .sum())
    }
}
