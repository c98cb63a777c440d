//! Workgroup-mapped advance kernel.
//!
//! Every live lane classifies its vertex by out-degree into one of three
//! tiers: `degree >= WG^2` is queued for the whole workgroup, `WG^2 > degree
//! >= SG` for the lane's subgroup, and smaller vertices are walked by the
//! owning lane alone. The tiers are processed in phases separated by group
//! barriers, with a per-lane `visited` flag marking work already covered by a
//! coarser tier.
//!
//! On the CPU backend one thread owns the whole workgroup, so the cooperative
//! strided loops of the coarser tiers collapse into plain neighbor walks and
//! the tier classification only determines processing order; the set of edge
//! visits is identical, and visit order is unspecified by contract.

use crate::device::{Event, WorkGroup};
use crate::error::Result;
use crate::frontier::MlbFrontier;
use crate::graph::{CsrGraph, CsrView};
use crate::operators::advance::{visit_out_edges, FrontierSink};
use crate::types::{EdgeId, VertexId, Weight, WORD_BITS};

/// Advance over the active vertices of `input`.
///
/// Launch geometry: after materializing the `count` active level-0 words,
/// each workgroup covers `WG / W` consecutive offsets and each lane owns one
/// bit of those words. A lane is live iff its offset slot is within the
/// materialized count and the level-0 bit of its vertex is set.
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
    let count = input.compute_active_frontier()?;
    if count == 0 {
        // An empty input frontier advances nothing and launches no work.
        return Ok(queue.submit_work_groups(0, |_| {}));
    }

    let offsets_per_group = queue.work_group_size() / WORD_BITS;
    let n_groups = count.div_ceil(offsets_per_group);
    let in_view = input.view();
    let graph_view = graph.view();

    Ok(queue.submit_work_groups(n_groups, |group| {
        run_group(group, graph_view, sink, &functor, |lid| {
            let slot = group.id * offsets_per_group + lid / WORD_BITS;
            if slot >= count {
                return None;
            }
            let vertex = in_view.offset_at(slot) as usize * WORD_BITS + lid % WORD_BITS;
            if vertex < in_view.num_elems() && in_view.check(vertex as VertexId) {
                Some(vertex as VertexId)
            } else {
                None
            }
        });
    }))
}

/// Advance over every vertex id of the graph (one lane per vertex).
pub(super) fn launch_graph<W, S, F>(graph: &CsrGraph<W>, sink: S, functor: F) -> Result<Event>
where
    W: Weight,
    S: FrontierSink,
    F: Fn(VertexId, VertexId, EdgeId, W) -> bool + Sync,
{
    let queue = graph.queue();
    let vertex_count = graph.vertex_count();
    let n_groups = vertex_count.div_ceil(queue.work_group_size());
    let graph_view = graph.view();

    Ok(queue.submit_work_groups(n_groups, |group| {
        run_group(group, graph_view, sink, &functor, |lid| {
            let vertex = group.id * group.local_size + lid;
            (vertex < vertex_count).then_some(vertex as VertexId)
        });
    }))
}

fn run_group<W, S, F, A>(
    group: &WorkGroup,
    view: CsrView<'_, W>,
    sink: S,
    functor: &F,
    assign: A,
) where
    W: Weight,
    S: FrontierSink,
    F: Fn(VertexId, VertexId, EdgeId, W) -> bool + Sync,
    A: Fn(usize) -> Option<VertexId>,
{
    let local_size = group.local_size;
    let sub_groups = group.sub_groups();
    let workgroup_threshold = (local_size * local_size) as u32;
    let subgroup_threshold = group.sub_group_size as u32;

    let mut assigned: Vec<VertexId> = vec![0; local_size];
    let mut visited: Vec<bool> = vec![true; local_size];
    let mut workgroup_queue: Vec<(VertexId, usize)> = Vec::new();
    let mut subgroup_queues: Vec<Vec<(VertexId, usize)>> = vec![Vec::new(); sub_groups];

    for lid in 0..local_size {
        let Some(vertex) = assign(lid) else {
            continue;
        };
        let degree = view.degree(vertex);
        if degree >= workgroup_threshold {
            workgroup_queue.push((vertex, lid));
        } else if degree >= subgroup_threshold {
            subgroup_queues[lid / group.sub_group_size].push((vertex, lid));
        }
        assigned[lid] = vertex;
        visited[lid] = false;
    }

    // Workgroup phase: every lane cooperates on one very-high-degree vertex
    // at a time.
    for &(vertex, owner) in &workgroup_queue {
        visit_out_edges(view, sink, functor, vertex);
        visited[owner] = true;
    }

    // (workgroup barrier)

    // Subgroup phase: each subgroup drains its own queue.
    for queue in &subgroup_queues {
        for &(vertex, owner) in queue {
            visit_out_edges(view, sink, functor, vertex);
            visited[owner] = true;
        }
    }

    // (subgroup barrier)

    // Work-item phase: every still-unvisited lane walks its own list.
    for lid in 0..local_size {
        if !visited[lid] {
            visit_out_edges(view, sink, functor, assigned[lid]);
        }
    }
}
