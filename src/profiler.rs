//! Kernel-time accounting.
//!
//! The profiler is an explicit collaborator: drivers that hold one record
//! every kernel event under a tag, and callers ask for a [`ProfilerReport`]
//! at the end of a run. Drivers without a profiler skip all of it.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use serde::Serialize;

use crate::device::Event;

#[derive(Default)]
struct ProfilerInner {
    events: HashMap<String, Vec<Duration>>,
    visited_edges: u64,
}

/// Collects per-tag kernel durations and traversal statistics.
#[derive(Default)]
pub struct Profiler {
    inner: Mutex<ProfilerInner>,
}

impl Profiler {
    /// Creates an empty profiler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `event`'s duration under `tag`.
    pub fn record(&self, event: &Event, tag: &str) {
        let mut inner = self.inner.lock().expect("profiler poisoned");
        inner
            .events
            .entry(tag.to_owned())
            .or_default()
            .push(event.duration());
    }

    /// Adds to the visited-edge statistic reported for the run.
    pub fn add_visited_edges(&self, edges: u64) {
        self.inner.lock().expect("profiler poisoned").visited_edges += edges;
    }

    /// Clears everything recorded so far.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().expect("profiler poisoned");
        inner.events.clear();
        inner.visited_edges = 0;
    }

    /// Snapshot of the recorded activity, sorted by tag.
    pub fn report(&self) -> ProfilerReport {
        let inner = self.inner.lock().expect("profiler poisoned");
        let mut tags: Vec<TagSummary> = inner
            .events
            .iter()
            .map(|(tag, durations)| TagSummary {
                tag: tag.clone(),
                launches: durations.len(),
                total_ms: durations.iter().map(Duration::as_secs_f64).sum::<f64>() * 1e3,
            })
            .collect();
        tags.sort_by(|a, b| a.tag.cmp(&b.tag));
        let total_ms = tags.iter().map(|t| t.total_ms).sum();
        ProfilerReport {
            tags,
            total_ms,
            visited_edges: inner.visited_edges,
        }
    }
}

/// Per-tag kernel-time totals.
#[derive(Debug, Clone, Serialize)]
pub struct TagSummary {
    /// Tag the events were recorded under.
    pub tag: String,
    /// Number of recorded kernel launches.
    pub launches: usize,
    /// Accumulated kernel time in milliseconds.
    pub total_ms: f64,
}

/// Summary of a profiled run.
#[derive(Debug, Clone, Serialize)]
pub struct ProfilerReport {
    /// Per-tag totals, sorted by tag.
    pub tags: Vec<TagSummary>,
    /// Kernel time across all tags in milliseconds.
    pub total_ms: f64,
    /// Edges visited by the traversal, when the driver reports them.
    pub visited_edges: u64,
}

impl std::fmt::Display for ProfilerReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for tag in &self.tags {
            writeln!(
                f,
                "[{}] {} launches, {:.3} ms",
                tag.tag, tag.launches, tag.total_ms
            )?;
        }
        writeln!(f, "total kernel time: {:.3} ms", self.total_ms)?;
        if self.visited_edges > 0 {
            writeln!(f, "visited edges: {}", self.visited_edges)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::Queue;

    #[test]
    fn test_report_aggregates_by_tag() {
        let queue = Queue::with_geometry(64, 32);
        let profiler = Profiler::new();
        for _ in 0..3 {
            let event = queue.submit_work_groups(1, |_| {});
            profiler.record(&event, "advance");
            event.wait().unwrap();
        }
        profiler.add_visited_edges(42);

        let report = profiler.report();
        assert_eq!(report.tags.len(), 1);
        assert_eq!(report.tags[0].launches, 3);
        assert_eq!(report.visited_edges, 42);

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"advance\""));
    }
}
