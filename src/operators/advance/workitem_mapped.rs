//! Work-item-mapped advance kernel.
//!
//! One lane per vertex id over the whole domain; live lanes walk their own
//! neighbor lists. Simpler than the workgroup-mapped kernel and adequate for
//! frontiers without high-degree outliers.

use crate::device::Event;
use crate::error::Result;
use crate::frontier::MlbFrontier;
use crate::graph::CsrGraph;
use crate::operators::advance::{visit_out_edges, FrontierSink};
use crate::types::{EdgeId, VertexId, Weight};

pub(super) fn launch_frontier<W, S, F, const LEVELS: usize>(
    graph: &CsrGraph<W>,
    input: &MlbFrontier<LEVELS>,
    sink: S,
    functor: F,
) -> Result<Event>
where
    W: Weight,
    S: FrontierSink,
    F: Fn(VertexId, VertexId, EdgeId, W) -> bool + Sync,
{
    let queue = graph.queue();
    let vertex_count = graph.vertex_count();
    let local = queue.work_group_size();
    let in_view = input.view();
    let graph_view = graph.view();

    Ok(queue.submit_work_groups(vertex_count.div_ceil(local), |group| {
        let base = group.id * local;
        for lane in 0..local {
            let vertex = base + lane;
            if vertex >= vertex_count {
                break;
            }
            let vertex = vertex as VertexId;
            if in_view.check(vertex) {
                visit_out_edges(graph_view, sink, &functor, vertex);
            }
        }
    }))
}
