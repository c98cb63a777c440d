//! Frontier filtering.

use crate::device::Event;
use crate::error::Result;
use crate::frontier::MlbFrontier;
use crate::graph::CsrGraph;
use crate::types::{VertexId, Weight};

/// Copies the members of `input` that satisfy `predicate` into `output`.
///
/// `output` is cleared first. The predicate runs once per member, concurrently
/// across lanes.
pub fn external<W, P, const LEVELS: usize>(
    graph: &CsrGraph<W>,
    input: &MlbFrontier<LEVELS>,
    output: &MlbFrontier<LEVELS>,
    predicate: P,
) -> Result<Event>
where
    W: Weight,
    P: Fn(VertexId) -> bool + Sync,
{
    output.clear()?;

    let queue = graph.queue();
    let vertex_count = graph.vertex_count();
    let local = queue.work_group_size();
    let in_view = input.view();
    let out_view = output.view();

    Ok(queue.submit_work_groups(vertex_count.div_ceil(local), |group| {
        let base = group.id * local;
        for lane in 0..local {
            let vertex = base + lane;
            if vertex >= vertex_count {
                break;
            }
            let vertex = vertex as VertexId;
            if in_view.check(vertex) && predicate(vertex) {
                out_view.insert(vertex);
            }
        }
    }))
}

/// Removes the members of `frontier` that fail `predicate`, in place.
///
/// Removal clears level-0 bits only; upper levels keep over-approximating.
pub fn inplace<W, P, const LEVELS: usize>(
    graph: &CsrGraph<W>,
    frontier: &MlbFrontier<LEVELS>,
    predicate: P,
) -> Result<Event>
where
    W: Weight,
    P: Fn(VertexId) -> bool + Sync,
{
    let queue = graph.queue();
    let vertex_count = graph.vertex_count();
    let local = queue.work_group_size();
    let view = frontier.view();

    Ok(queue.submit_work_groups(vertex_count.div_ceil(local), |group| {
        let base = group.id * local;
        for lane in 0..local {
            let vertex = base + lane;
            if vertex >= vertex_count {
                break;
            }
            let vertex = vertex as VertexId;
            if view.check(vertex) && !predicate(vertex) {
                view.remove(vertex);
            }
        }
    }))
}
