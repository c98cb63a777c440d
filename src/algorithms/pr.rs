//! PageRank by push iteration.

use std::sync::Arc;

use log::debug;
use num_traits::Float;

use crate::device::{DeviceBuffer, MemorySpace};
use crate::error::{Error, Result};
use crate::graph::CsrGraph;
use crate::operators::{advance, foreach, LoadBalancer};
use crate::profiler::Profiler;
use crate::sync;
use crate::types::{VertexId, Weight};

/// Damping and convergence parameters.
#[derive(Debug, Clone, Copy)]
pub struct PageRankConfig<W> {
    /// Damping factor.
    pub alpha: W,
    /// L1 convergence threshold between consecutive rank vectors.
    pub tolerance: W,
    /// Hard iteration bound reached when the tolerance is not.
    pub max_iterations: usize,
}

impl<W: Weight + Float> Default for PageRankConfig<W> {
    fn default() -> Self {
        Self {
            alpha: W::from(0.85).expect("damping constant fits the weight type"),
            tolerance: W::from(1e-6).expect("tolerance constant fits the weight type"),
            max_iterations: 100,
        }
    }
}

struct PrInstance<W: Weight> {
    config: PageRankConfig<W>,
    rank: DeviceBuffer<W::Atom>,
    rank_last: DeviceBuffer<W::Atom>,
    inv_out_degree: DeviceBuffer<W>,
    iterations: usize,
}

/// Power iteration with per-edge rank pushes.
///
/// Every iteration pushes `rank_last[src] * inv_out_degree[src]` across each
/// edge with an atomic add, then damps and adds the teleport term. The loop
/// stops when the L1 distance between consecutive rank vectors drops below
/// the tolerance or the iteration bound is reached. Mass of zero-out-degree
/// vertices is not redistributed.
pub struct PageRank<'g, W: Weight + Float> {
    graph: &'g CsrGraph<W>,
    profiler: Option<Arc<Profiler>>,
    instance: Option<PrInstance<W>>,
}

impl<'g, W: Weight + Float> PageRank<'g, W> {
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

    /// Allocates rank state under `config`.
    pub fn init(&mut self, config: PageRankConfig<W>) -> Result<()> {
        let n = self.graph.vertex_count();
        if n == 0 {
            return Err(Error::InvalidInput("pagerank needs a non-empty graph".into()));
        }
        let queue = self.graph.queue();

        let mut reciprocal = Vec::with_capacity(n);
        for v in 0..n {
            let degree = self.graph.degree(v as VertexId);
            reciprocal.push(if degree > 0 {
                W::one() / W::from(degree).expect("degree fits the weight type")
            } else {
                W::zero()
            });
        }
        let inv_out_degree = DeviceBuffer::from_slice(&reciprocal, MemorySpace::Device)?;

        let initial = W::one() / W::from(n).expect("vertex count fits the weight type");
        let rank_last: DeviceBuffer<W::Atom> = queue.alloc(n, MemorySpace::Shared)?;
        queue.fill(&rank_last, initial).wait()?;
        let rank: DeviceBuffer<W::Atom> = queue.alloc(n, MemorySpace::Shared)?;

        self.instance = Some(PrInstance {
            config,
            rank,
            rank_last,
            inv_out_degree,
            iterations: 0,
        });
        Ok(())
    }

    /// Drops the per-run state.
    pub fn reset(&mut self) {
        self.instance = None;
    }

    /// Iterates until convergence or the iteration bound.
    pub fn run(&mut self) -> Result<()> {
        let instance = self.instance.as_mut().ok_or(Error::NotInitialized("PageRank"))?;
        let queue = self.graph.queue().clone();
        let n = self.graph.vertex_count();

        let config = instance.config;
        let vertex_count = W::from(n).expect("vertex count fits the weight type");
        let teleport = (W::one() - config.alpha) / vertex_count;
        let residual = <W::Atom as crate::sync::DeviceAtomic>::new(W::zero());

        loop {
            {
                let rank = instance.rank.as_slice();
                let rank_last = instance.rank_last.as_slice();
                let inv_out_degree = instance.inv_out_degree.as_slice();

                queue.fill(&instance.rank, W::zero()).wait()?;

                let event = advance::vertices_discard(
                    LoadBalancer::WorkgroupMapped,
                    self.graph,
                    |src, dst, _edge, _weight| {
                        let push =
                            sync::load(&rank_last[src as usize]) * inv_out_degree[src as usize];
                        if push != W::zero() {
                            sync::fetch_add(&rank[dst as usize], push);
                        }
                        false
                    },
                )?;
                if let Some(profiler) = &self.profiler {
                    profiler.record(&event, "pr::push");
                }
                event.wait()?;

                sync::store(&residual, W::zero());
                let event = foreach::elements(&queue, n, |v| {
                    let v = v as usize;
                    let damped = teleport + config.alpha * sync::load(&rank[v]);
                    sync::store(&rank[v], damped);
                    let diff = damped - sync::load(&rank_last[v]);
                    sync::fetch_add(&residual, diff.abs());
                });
                if let Some(profiler) = &self.profiler {
                    profiler.record(&event, "pr::damp");
                }
                event.wait()?;
            }

            std::mem::swap(&mut instance.rank, &mut instance.rank_last);
            instance.iterations += 1;

            let l1 = sync::load(&residual);
            debug!("pagerank iteration {}: l1 residual {l1}", instance.iterations);
            if l1 < config.tolerance || instance.iterations >= config.max_iterations {
                break;
            }
        }
        Ok(())
    }

    /// Rank of `v` after the last completed iteration.
    pub fn rank(&self, v: VertexId) -> Result<W> {
        let instance = self.instance.as_ref().ok_or(Error::NotInitialized("PageRank"))?;
        Ok(sync::load(&instance.rank_last.as_slice()[v as usize]))
    }

    /// All ranks after the last completed iteration.
    pub fn ranks(&self) -> Result<Vec<W>> {
        let instance = self.instance.as_ref().ok_or(Error::NotInitialized("PageRank"))?;
        Ok(instance.rank_last.as_slice().iter().map(sync::load).collect())
    }

    /// Iterations the run performed.
    pub fn iterations(&self) -> Result<usize> {
        let instance = self.instance.as_ref().ok_or(Error::NotInitialized("PageRank"))?;
        Ok(instance.iterations)
    }
}
