//! Grid-parallel for over a dense index range.

use crate::device::{Event, Queue};
use crate::types::VertexId;

/// Applies `f` to every index in `[0, count)`, one lane per index.
///
/// Used for per-vertex initialization and reductions, and for per-edge
/// dispatch (the index meaning is the caller's).
pub fn elements<F>(queue: &Queue, count: usize, f: F) -> Event
where
    F: Fn(VertexId) + Sync,
{
    let local = queue.work_group_size();
    queue.submit_work_groups(count.div_ceil(local), |group| {
        let base = group.id * local;
        for lane in 0..local {
            let index = base + lane;
            if index >= count {
                break;
            }
            f(index as VertexId);
        }
    })
}
