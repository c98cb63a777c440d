//! Multi-level bitmap frontier.
//!
//! Level 0 is a flat bitmap over the element domain; each level above it
//! records which words of the level below contain any set bit. Insertion
//! touches every level, removal touches level 0 only, so upper levels
//! over-approximate: consumers that enumerate summarized words must gate on
//! the level-0 bit of each specific element.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};

use crossbeam_utils::CachePadded;

use crate::device::{DeviceBuffer, MemorySpace, Queue};
use crate::error::Result;
use crate::types::{AtomicBitmapWord, BitmapWord, VertexId, WORD_BITS};

/// Hierarchical bitmap frontier over a fixed element domain.
///
/// The frontier owns its bitmap words, its offsets buffer and the offsets
/// counter; dropping it releases the memory. `LEVELS` is the bitmap depth
/// (two levels summarize up to `W^2 * W` elements per top-level word).
pub struct MlbFrontier<const LEVELS: usize = 2> {
    queue: Queue,
    num_elems: usize,
    sizes: [usize; LEVELS],
    levels: [DeviceBuffer<AtomicBitmapWord>; LEVELS],
    offsets: DeviceBuffer<AtomicU32>,
    offsets_len: CachePadded<AtomicU32>,
}

/// Host-side snapshot of every bitmap level.
///
/// Used to stack frontier states across kernel launches (the betweenness
/// backward pass replays the forward wavefronts from these).
#[derive(Debug, Clone)]
pub struct FrontierState<const LEVELS: usize = 2> {
    sizes: [usize; LEVELS],
    words: [Vec<BitmapWord>; LEVELS],
}

impl<const LEVELS: usize> MlbFrontier<LEVELS> {
    /// Creates an empty frontier for elements `0..num_elems`.
    ///
    /// # Panics
    ///
    /// Panics if `LEVELS < 2`; the offsets materialization enumerates level-1
    /// summary words.
    pub fn new(queue: &Queue, num_elems: usize) -> Result<Self> {
        assert!(LEVELS >= 2, "the frontier needs at least two bitmap levels");

        let mut sizes = [0usize; LEVELS];
        sizes[0] = num_elems.div_ceil(WORD_BITS);
        for level in 1..LEVELS {
            sizes[level] = sizes[level - 1].div_ceil(WORD_BITS);
        }

        let mut levels = Vec::with_capacity(LEVELS);
        for &size in &sizes {
            levels.push(DeviceBuffer::try_new(size, MemorySpace::Device)?);
        }
        let levels: [DeviceBuffer<AtomicBitmapWord>; LEVELS] = match levels.try_into() {
            Ok(array) => array,
            Err(_) => unreachable!("level count matches LEVELS"),
        };

        Ok(Self {
            queue: queue.clone(),
            num_elems,
            sizes,
            levels,
            offsets: DeviceBuffer::try_new(sizes[0], MemorySpace::Device)?,
            offsets_len: CachePadded::new(AtomicU32::new(0)),
        })
    }

    /// Element domain size the frontier was created for.
    pub fn num_elems(&self) -> usize {
        self.num_elems
    }

    /// Words in `level`.
    pub fn level_size(&self, level: usize) -> usize {
        self.sizes[level]
    }

    /// Kernel-side view of the frontier.
    pub fn view(&self) -> MlbView<'_, LEVELS> {
        MlbView {
            num_elems: self.num_elems,
            levels: std::array::from_fn(|i| self.levels[i].as_slice()),
            offsets: self.offsets.as_slice(),
            offsets_len: &self.offsets_len,
        }
    }

    /// Inserts element `x`.
    pub fn insert(&self, x: VertexId) {
        self.view().insert(x);
        self.invalidate_offsets();
    }

    /// Removes element `x` (level 0 only).
    pub fn remove(&self, x: VertexId) {
        self.view().remove(x);
        self.invalidate_offsets();
    }

    /// Whether element `x` is a member.
    pub fn check(&self, x: VertexId) -> bool {
        self.view().check(x)
    }

    /// Whether the frontier holds no elements.
    ///
    /// A group-parallel OR-reduction over the top-level words; like every
    /// top-level read it over-approximates after removals.
    pub fn empty(&self) -> Result<bool> {
        let top = LEVELS - 1;
        let size = self.sizes[top];
        if size == 0 {
            return Ok(true);
        }
        let view = self.view();
        let local = self.queue.work_group_size();
        let found = AtomicBool::new(false);
        self.queue
            .submit_work_groups(size.div_ceil(local), |group| {
                if found.load(Ordering::Relaxed) {
                    return;
                }
                let base = group.id * local;
                let any = view.levels[top]
                    .iter()
                    .skip(base)
                    .take(local)
                    .any(|word| word.load(Ordering::Relaxed) != 0);
                if any {
                    found.store(true, Ordering::Relaxed);
                }
            })
            .wait()?;
        Ok(!found.load(Ordering::Relaxed))
    }

    /// Number of members (population count of level 0).
    pub fn count(&self) -> Result<usize> {
        let view = self.view();
        let local = self.queue.work_group_size();
        let total = AtomicUsize::new(0);
        self.queue
            .submit_work_groups(self.sizes[0].div_ceil(local), |group| {
                let base = group.id * local;
                let partial: usize = view.levels[0]
                    .iter()
                    .skip(base)
                    .take(local)
                    .map(|word| word.load(Ordering::Relaxed).count_ones() as usize)
                    .sum();
                if partial > 0 {
                    total.fetch_add(partial, Ordering::Relaxed);
                }
            })
            .wait()?;
        Ok(total.load(Ordering::Relaxed))
    }

    /// Clears every level and the offsets counter.
    pub fn clear(&self) -> Result<()> {
        for level in &self.levels {
            self.queue.fill(level, 0).wait()?;
        }
        self.invalidate_offsets();
        Ok(())
    }

    /// Materializes the indices of all level-0 words summarized as non-zero.
    ///
    /// One workgroup inspects a contiguous chunk of level-1 words; each lane
    /// collects the set bits of one word into workgroup-local scratch, then
    /// the group leader reserves a slice of the global offsets buffer with a
    /// device-scope fetch-add and the scratch is copied out. Returns the
    /// number of offsets written.
    ///
    /// Idempotent between mutations: a cached non-zero count is returned
    /// without relaunching. Because upper levels over-approximate, some
    /// enumerated words may have become zero; readers gate on level-0 bits.
    pub fn compute_active_frontier(&self) -> Result<usize> {
        let cached = self.offsets_len.load(Ordering::Relaxed);
        if cached > 0 {
            return Ok(cached as usize);
        }

        let size = self.sizes[1];
        if size == 0 {
            return Ok(0);
        }

        let view = self.view();
        let local = self.queue.work_group_size();
        self.queue
            .submit_work_groups(size.div_ceil(local), |group| {
                let mut scratch: Vec<u32> = Vec::new();
                let base = group.id * local;
                for lane in 0..local {
                    let index = base + lane;
                    if index >= size {
                        break;
                    }
                    let word = view.levels[1][index].load(Ordering::Relaxed);
                    if word == 0 {
                        continue;
                    }
                    for bit in 0..WORD_BITS {
                        if word & ((1 as BitmapWord) << bit) != 0 {
                            scratch.push((index * WORD_BITS + bit) as u32);
                        }
                    }
                }
                if !scratch.is_empty() {
                    let at = view
                        .offsets_len
                        .fetch_add(scratch.len() as u32, Ordering::Relaxed)
                        as usize;
                    for (i, &word_index) in scratch.iter().enumerate() {
                        view.offsets[at + i].store(word_index, Ordering::Relaxed);
                    }
                }
            })
            .wait()?;

        Ok(self.offsets_len.load(Ordering::Relaxed) as usize)
    }

    /// Copies every bitmap level to a host snapshot.
    pub fn save_state(&self) -> FrontierState<LEVELS> {
        FrontierState {
            sizes: self.sizes,
            words: std::array::from_fn(|level| {
                self.levels[level]
                    .as_slice()
                    .iter()
                    .map(|word| word.load(Ordering::Relaxed))
                    .collect()
            }),
        }
    }

    /// Restores a snapshot taken with [`save_state`](Self::save_state).
    ///
    /// Invalidates the cached offsets materialization; the snapshot's active
    /// words need not match the offsets computed for a different state.
    ///
    /// # Panics
    ///
    /// Panics if the snapshot was taken from a frontier of another size.
    pub fn load_state(&self, state: &FrontierState<LEVELS>) {
        assert!(
            state.sizes == self.sizes,
            "frontier state has mismatched level sizes"
        );
        for level in 0..LEVELS {
            for (word, &value) in self.levels[level].as_slice().iter().zip(&state.words[level]) {
                word.store(value, Ordering::Relaxed);
            }
        }
        self.invalidate_offsets();
    }

    /// Element-wise union with `other` at every level.
    ///
    /// # Panics
    ///
    /// Panics if the frontiers cover different element domains.
    pub fn merge(&self, other: &Self) -> Result<()> {
        assert!(self.num_elems == other.num_elems, "frontier domains differ");
        self.combine(other, |word, incoming| {
            if incoming != 0 {
                word.fetch_or(incoming, Ordering::Relaxed);
            }
        })
    }

    /// Element-wise intersection with `other`.
    ///
    /// Upper levels keep the AND of both summaries, an over-approximation of
    /// the intersection's own summary, which readers already tolerate.
    ///
    /// # Panics
    ///
    /// Panics if the frontiers cover different element domains.
    pub fn intersect_with(&self, other: &Self) -> Result<()> {
        assert!(self.num_elems == other.num_elems, "frontier domains differ");
        self.combine(other, |word, incoming| {
            word.fetch_and(incoming, Ordering::Relaxed);
        })
    }

    /// O(1) exchange of the two frontiers' storage.
    pub fn swap(a: &mut Self, b: &mut Self) {
        std::mem::swap(a, b);
    }

    fn combine<F>(&self, other: &Self, op: F) -> Result<()>
    where
        F: Fn(&AtomicBitmapWord, BitmapWord) + Sync,
    {
        let view = self.view();
        let other_view = other.view();
        let local = self.queue.work_group_size();
        for level in 0..LEVELS {
            let size = self.sizes[level];
            if size == 0 {
                continue;
            }
            self.queue
                .submit_work_groups(size.div_ceil(local), |group| {
                    let base = group.id * local;
                    let end = (base + local).min(size);
                    for index in base..end {
                        let incoming = other_view.levels[level][index].load(Ordering::Relaxed);
                        op(&view.levels[level][index], incoming);
                    }
                })
                .wait()?;
        }
        self.invalidate_offsets();
        Ok(())
    }

    fn invalidate_offsets(&self) {
        self.offsets_len.store(0, Ordering::Relaxed);
    }
}

/// Kernel-side view of an [`MlbFrontier`].
pub struct MlbView<'a, const LEVELS: usize> {
    num_elems: usize,
    levels: [&'a [AtomicBitmapWord]; LEVELS],
    offsets: &'a [AtomicU32],
    offsets_len: &'a AtomicU32,
}

impl<const LEVELS: usize> Clone for MlbView<'_, LEVELS> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<const LEVELS: usize> Copy for MlbView<'_, LEVELS> {}

impl<const LEVELS: usize> MlbView<'_, LEVELS> {
    /// Element domain size.
    #[inline(always)]
    pub fn num_elems(&self) -> usize {
        self.num_elems
    }

    /// Sets the bit of `x` at every level.
    ///
    /// Each level write is an atomic OR guarded by a plain read of the same
    /// word: a stale cleared read only costs an extra idempotent OR, and an
    /// observed set bit was necessarily stored by a completed OR.
    ///
    /// # Panics
    ///
    /// Panics if `x` is outside the element domain; tail bits of the last
    /// word must never be set.
    #[inline(always)]
    pub fn insert(&self, x: VertexId) {
        assert!((x as usize) < self.num_elems, "element {x} out of domain");
        let mut pos = x as usize;
        for level in 0..LEVELS {
            let word_index = pos / WORD_BITS;
            let mask = (1 as BitmapWord) << (pos % WORD_BITS);
            // SAFETY: `pos` shrinks by a factor of `WORD_BITS` per level and
            // started inside the domain, so `word_index < sizes[level]`.
            let word = unsafe { self.levels[level].get_unchecked(word_index) };
            if word.load(Ordering::Relaxed) & mask == 0 {
                word.fetch_or(mask, Ordering::Relaxed);
            }
            pos = word_index;
        }
    }

    /// Clears the bit of `x` at level 0 only.
    #[inline(always)]
    pub fn remove(&self, x: VertexId) {
        assert!((x as usize) < self.num_elems, "element {x} out of domain");
        let pos = x as usize;
        let mask = (1 as BitmapWord) << (pos % WORD_BITS);
        self.levels[0][pos / WORD_BITS].fetch_and(!mask, Ordering::Relaxed);
    }

    /// Whether the level-0 bit of `x` is set.
    #[inline(always)]
    pub fn check(&self, x: VertexId) -> bool {
        let pos = x as usize;
        debug_assert!(pos < self.num_elems);
        let mask = (1 as BitmapWord) << (pos % WORD_BITS);
        // SAFETY: callers pass elements inside the domain (debug-asserted).
        let word = unsafe { self.levels[0].get_unchecked(pos / WORD_BITS) };
        word.load(Ordering::Relaxed) & mask != 0
    }

    /// The `slot`-th materialized level-0 word index.
    #[inline(always)]
    pub(crate) fn offset_at(&self, slot: usize) -> u32 {
        self.offsets[slot].load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod word_tests {
    use super::*;

    #[test]
    fn test_level_sizes_round_up() {
        let queue = Queue::with_geometry(WORD_BITS, WORD_BITS.min(32));
        let frontier: MlbFrontier = MlbFrontier::new(&queue, WORD_BITS + 1).unwrap();
        assert_eq!(frontier.level_size(0), 2);
        assert_eq!(frontier.level_size(1), 1);
    }
}
