//! The advance operator.
//!
//! Advance visits, in parallel, every outgoing edge `(src, dst, edge, w)` of
//! each active vertex and evaluates a user functor; destinations for which
//! the functor returns `true` are inserted into the output frontier. Functor
//! invocations are concurrent across lanes: a functor must be idempotent or
//! protect shared state with the [`crate::sync`] primitives, and edge visit
//! order is unspecified.

mod workgroup_mapped;
mod workitem_mapped;

use crate::device::Event;
use crate::error::{Error, Result};
use crate::frontier::{MlbFrontier, MlbView, NoFrontier};
use crate::graph::{CsrGraph, CsrView};
use crate::types::{EdgeId, VertexId, Weight};

/// Strategy distributing edge work across lanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadBalancer {
    /// Degree-proportional three-tier balancing (workgroup / subgroup /
    /// work-item), one kernel for the whole frontier.
    WorkgroupMapped,
    /// One lane per vertex, each walking its own neighbor list.
    WorkitemMapped,
}

/// Where qualifying destinations go.
pub(crate) trait FrontierSink: Copy + Sync {
    fn insert(&self, v: VertexId);
}

impl<const LEVELS: usize> FrontierSink for MlbView<'_, LEVELS> {
    #[inline(always)]
    fn insert(&self, v: VertexId) {
        MlbView::insert(self, v);
    }
}

impl FrontierSink for NoFrontier {
    #[inline(always)]
    fn insert(&self, _v: VertexId) {}
}

/// Walks every outgoing edge of `src`, feeding the functor and the sink.
#[inline(always)]
pub(crate) fn visit_out_edges<W, S, F>(view: CsrView<'_, W>, sink: S, functor: &F, src: VertexId)
where
    W: Weight,
    S: FrontierSink,
    F: Fn(VertexId, VertexId, EdgeId, W) -> bool + Sync,
{
    for (dst, edge) in view.neighbors(src) {
        let weight = view.weight_of(edge);
        if functor(src, dst, edge, weight) {
            sink.insert(dst);
        }
    }
}

/// Advances from the active vertices of `input` into `output`.
pub fn frontier<W, F, const LEVELS: usize>(
    lb: LoadBalancer,
    graph: &CsrGraph<W>,
    input: &MlbFrontier<LEVELS>,
    output: &MlbFrontier<LEVELS>,
    functor: F,
) -> Result<Event>
where
    W: Weight,
    F: Fn(VertexId, VertexId, EdgeId, W) -> bool + Sync,
{
    match lb {
        LoadBalancer::WorkgroupMapped => {
            workgroup_mapped::launch_frontier(graph, input, output.view(), functor)
        }
        LoadBalancer::WorkitemMapped => {
            workitem_mapped::launch_frontier(graph, input, output.view(), functor)
        }
    }
}

/// Advances from the active vertices of `input`, discarding the output set.
pub fn frontier_discard<W, F, const LEVELS: usize>(
    lb: LoadBalancer,
    graph: &CsrGraph<W>,
    input: &MlbFrontier<LEVELS>,
    functor: F,
) -> Result<Event>
where
    W: Weight,
    F: Fn(VertexId, VertexId, EdgeId, W) -> bool + Sync,
{
    match lb {
        LoadBalancer::WorkgroupMapped => {
            workgroup_mapped::launch_frontier(graph, input, NoFrontier, functor)
        }
        LoadBalancer::WorkitemMapped => {
            workitem_mapped::launch_frontier(graph, input, NoFrontier, functor)
        }
    }
}

/// Advances from every vertex of the graph into `output`.
pub fn vertices<W, F, const LEVELS: usize>(
    lb: LoadBalancer,
    graph: &CsrGraph<W>,
    output: &MlbFrontier<LEVELS>,
    functor: F,
) -> Result<Event>
where
    W: Weight,
    F: Fn(VertexId, VertexId, EdgeId, W) -> bool + Sync,
{
    match lb {
        LoadBalancer::WorkgroupMapped => {
            workgroup_mapped::launch_graph(graph, output.view(), functor)
        }
        LoadBalancer::WorkitemMapped => Err(Error::Unsupported(
            "work-item mapped advance over the whole-graph view",
        )),
    }
}

/// Advances from every vertex of the graph, discarding the output set.
pub fn vertices_discard<W, F>(lb: LoadBalancer, graph: &CsrGraph<W>, functor: F) -> Result<Event>
where
    W: Weight,
    F: Fn(VertexId, VertexId, EdgeId, W) -> bool + Sync,
{
    match lb {
        LoadBalancer::WorkgroupMapped => workgroup_mapped::launch_graph(graph, NoFrontier, functor),
        LoadBalancer::WorkitemMapped => Err(Error::Unsupported(
            "work-item mapped advance over the whole-graph view",
        )),
    }
}
