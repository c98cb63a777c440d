//! Kernel submission and completion events.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crossbeam_utils::CachePadded;
use log::debug;

use crate::device::DeviceBuffer;
use crate::error::{Error, Result};
use crate::sync::DeviceAtomic;
use crate::types::WORD_BITS;

/// Environment variable selecting the workgroup size.
const COMPUTE_UNIT_SIZE_VAR: &str = "COMPUTE_UNIT_SIZE";

const DEFAULT_WORK_GROUP_SIZE: usize = 128;
const DEFAULT_SUB_GROUP_SIZE: usize = 32;

#[derive(Debug, Clone)]
struct DeviceInfo {
    work_group_size: usize,
    sub_group_size: usize,
    max_compute_units: usize,
}

impl DeviceInfo {
    fn from_env() -> Self {
        let work_group_size = std::env::var(COMPUTE_UNIT_SIZE_VAR)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_WORK_GROUP_SIZE);
        let max_compute_units = std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(1);
        Self {
            work_group_size,
            sub_group_size: DEFAULT_SUB_GROUP_SIZE,
            max_compute_units,
        }
    }
}

/// Submission queue for a single emulated device.
///
/// Cloning is cheap; clones share the same device. The host side is strictly
/// single-threaded with respect to one queue: kernels submitted in order form
/// a dependency chain through [`Event::wait`].
#[derive(Debug, Clone)]
pub struct Queue {
    info: Arc<DeviceInfo>,
}

impl Default for Queue {
    fn default() -> Self {
        Self::new()
    }
}

impl Queue {
    /// Creates a queue with geometry taken from the environment
    /// (`COMPUTE_UNIT_SIZE`) and the host CPU.
    ///
    /// # Panics
    ///
    /// Panics if the configured workgroup size is not a positive multiple of
    /// both the bitmap word width and the subgroup size.
    pub fn new() -> Self {
        Self::with_geometry(DeviceInfo::from_env().work_group_size, DEFAULT_SUB_GROUP_SIZE)
    }

    /// Creates a queue with an explicit workgroup/subgroup geometry.
    ///
    /// # Panics
    ///
    /// Panics if `work_group_size` is not a positive multiple of both the
    /// bitmap word width and `sub_group_size`.
    pub fn with_geometry(work_group_size: usize, sub_group_size: usize) -> Self {
        assert!(work_group_size > 0, "work group size must be positive");
        assert!(
            work_group_size % WORD_BITS == 0,
            "work group size {work_group_size} must be a multiple of the bitmap word width {WORD_BITS}"
        );
        assert!(
            sub_group_size > 0 && work_group_size % sub_group_size == 0,
            "work group size {work_group_size} must be a multiple of the subgroup size {sub_group_size}"
        );
        let mut info = DeviceInfo::from_env();
        info.work_group_size = work_group_size;
        info.sub_group_size = sub_group_size;
        Self { info: Arc::new(info) }
    }

    /// Restricts the number of worker threads, mainly for deterministic tests.
    pub fn with_compute_units(mut self, units: usize) -> Self {
        assert!(units > 0, "compute units must be positive");
        Arc::make_mut(&mut self.info).max_compute_units = units;
        self
    }

    /// Lanes per workgroup.
    pub fn work_group_size(&self) -> usize {
        self.info.work_group_size
    }

    /// Lanes per subgroup.
    pub fn sub_group_size(&self) -> usize {
        self.info.sub_group_size
    }

    /// Subgroups per workgroup.
    pub fn max_sub_groups(&self) -> usize {
        self.info.work_group_size / self.info.sub_group_size
    }

    /// Worker threads available to run workgroups.
    pub fn max_compute_units(&self) -> usize {
        self.info.max_compute_units
    }

    /// Allocates `len` default-initialized elements in `space`.
    pub fn alloc<T: Default>(
        &self,
        len: usize,
        space: super::MemorySpace,
    ) -> Result<DeviceBuffer<T>> {
        DeviceBuffer::try_new(len, space)
    }

    /// Submits `kernel` as a grid of `n_groups` workgroups.
    ///
    /// The kernel is invoked once per workgroup and owns all of that group's
    /// lanes; workgroups run concurrently on up to `max_compute_units`
    /// workers, claimed from a shared counter. A panicking workgroup poisons
    /// the launch and surfaces as [`Error::DeviceFailure`] on
    /// [`Event::wait`].
    pub fn submit_work_groups<K>(&self, n_groups: usize, kernel: K) -> Event
    where
        K: Fn(&WorkGroup) + Sync,
    {
        let started = Instant::now();
        if n_groups == 0 {
            return Event::completed(started.elapsed());
        }

        let next_group = CachePadded::new(AtomicUsize::new(0));
        let failure: Mutex<Option<String>> = Mutex::new(None);
        let workers = self.info.max_compute_units.min(n_groups);

        std::thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| loop {
                    let id = next_group.fetch_add(1, Ordering::Relaxed);
                    if id >= n_groups {
                        break;
                    }
                    let group = WorkGroup {
                        id,
                        count: n_groups,
                        local_size: self.info.work_group_size,
                        sub_group_size: self.info.sub_group_size,
                    };
                    if let Err(payload) = catch_unwind(AssertUnwindSafe(|| kernel(&group))) {
                        let message = panic_message(&payload);
                        debug!("workgroup {id} failed: {message}");
                        *failure.lock().expect("failure flag poisoned") = Some(message);
                        break;
                    }
                });
            }
        });

        let failure = failure.into_inner().expect("failure flag poisoned");
        Event {
            duration: started.elapsed(),
            failure,
        }
    }

    /// Fills an atomic buffer with `value` through a device kernel.
    pub fn fill<A: DeviceAtomic>(&self, buffer: &DeviceBuffer<A>, value: A::Value) -> Event {
        let cells = buffer.as_slice();
        let local = self.work_group_size();
        let n_groups = cells.len().div_ceil(local);
        self.submit_work_groups(n_groups, |group| {
            let base = group.id * local;
            for cell in cells.iter().skip(base).take(local) {
                cell.store(value);
            }
        })
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_owned()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "kernel panicked".to_owned()
    }
}

/// One workgroup of a kernel launch.
#[derive(Debug, Clone, Copy)]
pub struct WorkGroup {
    /// Linear id of this workgroup within the grid.
    pub id: usize,
    /// Number of workgroups in the grid.
    pub count: usize,
    /// Lanes per workgroup.
    pub local_size: usize,
    /// Lanes per subgroup.
    pub sub_group_size: usize,
}

impl WorkGroup {
    /// Subgroups in this workgroup.
    pub fn sub_groups(&self) -> usize {
        self.local_size / self.sub_group_size
    }
}

/// Completion handle of a kernel launch.
///
/// The caller must `wait` before reading any memory the kernel touched from
/// the host; on this backend the launch has already run to completion, and
/// `wait` is where kernel failures surface.
#[derive(Debug)]
#[must_use = "kernel failures surface on Event::wait"]
pub struct Event {
    duration: Duration,
    failure: Option<String>,
}

impl Event {
    fn completed(duration: Duration) -> Self {
        Self {
            duration,
            failure: None,
        }
    }

    /// Wall-clock duration of the launch, for profiling.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Waits for completion, surfacing kernel failure.
    pub fn wait(self) -> Result<()> {
        match self.failure {
            None => Ok(()),
            Some(message) => Err(Error::DeviceFailure(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicU32;

    use super::*;
    use crate::device::MemorySpace;
    use crate::sync;

    #[test]
    fn test_every_group_runs_once() {
        let queue = Queue::with_geometry(64, 32);
        let hits = AtomicUsize::new(0);
        let event = queue.submit_work_groups(37, |group| {
            assert!(group.id < 37);
            assert_eq!(group.local_size, 64);
            hits.fetch_add(1, Ordering::Relaxed);
        });
        event.wait().unwrap();
        assert_eq!(hits.load(Ordering::Relaxed), 37);
    }

    #[test]
    fn test_zero_groups_is_a_no_op() {
        let queue = Queue::with_geometry(64, 32);
        queue.submit_work_groups(0, |_| panic!("must not run")).wait().unwrap();
    }

    #[test]
    fn test_kernel_panic_becomes_device_failure() {
        let queue = Queue::with_geometry(64, 32).with_compute_units(1);
        let event = queue.submit_work_groups(4, |group| {
            assert!(group.id != 2, "lane fault");
        });
        let err = event.wait().unwrap_err();
        assert!(err.to_string().contains("device failure"));
    }

    #[test]
    fn test_fill_writes_every_cell() {
        let queue = Queue::with_geometry(64, 32);
        let buffer: DeviceBuffer<AtomicU32> =
            queue.alloc(1000, MemorySpace::Shared).unwrap();
        queue.fill(&buffer, 7).wait().unwrap();
        assert!(buffer.as_slice().iter().all(|c| sync::load(c) == 7));
    }
}
