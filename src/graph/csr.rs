//! Device CSR graph and its kernel-side view.
//!
//! The graph is the single owner of three device buffers; kernels receive a
//! [`CsrView`], a trivially-copyable bundle of slices whose accessors are all
//! pure projections. CSR arrays are read-only after construction, so views
//! need no synchronization.

use crate::device::{DeviceBuffer, MemorySpace, Queue};
use crate::error::Result;
use crate::formats::Csr;
use crate::graph::Properties;
use crate::types::{EdgeId, VertexId, Weight};

/// A CSR graph resident on the device.
pub struct CsrGraph<W> {
    queue: Queue,
    properties: Properties,
    row_offsets: DeviceBuffer<u32>,
    column_indices: DeviceBuffer<VertexId>,
    edge_values: DeviceBuffer<W>,
}

impl<W: Weight> CsrGraph<W> {
    /// Copies `csr` into `space` on `queue`'s device.
    pub fn from_csr(
        queue: &Queue,
        csr: &Csr<W>,
        properties: Properties,
        space: MemorySpace,
    ) -> Result<Self> {
        Ok(Self {
            queue: queue.clone(),
            properties,
            row_offsets: DeviceBuffer::from_slice(csr.row_offsets(), space)?,
            column_indices: DeviceBuffer::from_slice(csr.column_indices(), space)?,
            edge_values: DeviceBuffer::from_slice(csr.edge_values(), space)?,
        })
    }

    /// Queue the graph was built on.
    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    /// Structural flags recorded at build time.
    pub fn properties(&self) -> Properties {
        self.properties
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.row_offsets.len() - 1
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.column_indices.len()
    }

    /// Out-degree of `v`.
    pub fn degree(&self, v: VertexId) -> usize {
        self.view().degree(v) as usize
    }

    /// Kernel-side view of the graph.
    pub fn view(&self) -> CsrView<'_, W> {
        CsrView {
            num_vertices: (self.row_offsets.len() - 1) as u32,
            num_edges: self.column_indices.len() as u32,
            row_offsets: self.row_offsets.as_slice(),
            column_indices: self.column_indices.as_slice(),
            edge_values: self.edge_values.as_slice(),
        }
    }

    /// Explicit host copy of the row offsets.
    pub fn row_offsets_to_host(&self) -> Vec<u32> {
        self.row_offsets.copy_to_host()
    }

    /// Explicit host copy of the column indices.
    pub fn column_indices_to_host(&self) -> Vec<VertexId> {
        self.column_indices.copy_to_host()
    }

    /// Explicit host copy of the edge values.
    pub fn edge_values_to_host(&self) -> Vec<W> {
        self.edge_values.copy_to_host()
    }
}

/// Kernel-side projection of a [`CsrGraph`].
pub struct CsrView<'a, W> {
    num_vertices: u32,
    num_edges: u32,
    row_offsets: &'a [u32],
    column_indices: &'a [VertexId],
    edge_values: &'a [W],
}

impl<W> Clone for CsrView<'_, W> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<W> Copy for CsrView<'_, W> {}

impl<'a, W: Weight> CsrView<'a, W> {
    /// Number of vertices.
    #[inline(always)]
    pub fn vertex_count(&self) -> u32 {
        self.num_vertices
    }

    /// Number of edges.
    #[inline(always)]
    pub fn edge_count(&self) -> u32 {
        self.num_edges
    }

    /// Out-degree of `v`.
    #[inline(always)]
    pub fn degree(&self, v: VertexId) -> u32 {
        let v = v as usize;
        debug_assert!(v + 1 < self.row_offsets.len());
        // SAFETY: construction guarantees `row_offsets` has `num_vertices + 1`
        // entries and callers pass `v < num_vertices`.
        unsafe { self.row_offsets.get_unchecked(v + 1) - self.row_offsets.get_unchecked(v) }
    }

    /// Iterator over the out-neighbors of `v`, yielding `(neighbor, edge)`.
    #[inline]
    pub fn neighbors(&self, v: VertexId) -> Neighbors<'a> {
        let v = v as usize;
        Neighbors {
            column_indices: self.column_indices,
            cursor: self.row_offsets[v] as usize,
            end: self.row_offsets[v + 1] as usize,
        }
    }

    /// Source vertex of `edge`: the largest `v` with `row_offsets[v] <= edge`.
    ///
    /// Binary search over the row offsets; the one O(log V) primitive in hot
    /// paths, used by the per-edge triangle-counting dispatch.
    pub fn source_of(&self, edge: EdgeId) -> VertexId {
        if self.num_vertices == 0 {
            return 0;
        }
        let mut low = 0u32;
        let mut high = self.num_vertices - 1;
        while low <= high {
            let mid = low + (high - low) / 2;
            let m = mid as usize;
            if self.row_offsets[m] <= edge && edge < self.row_offsets[m + 1] {
                return mid;
            } else if self.row_offsets[m] > edge {
                high = mid - 1;
            } else {
                low = mid + 1;
            }
        }
        self.num_vertices
    }

    /// Destination vertex of `edge`.
    #[inline(always)]
    pub fn destination_of(&self, edge: EdgeId) -> VertexId {
        self.column_indices[edge as usize]
    }

    /// Weight of `edge`.
    #[inline(always)]
    pub fn weight_of(&self, edge: EdgeId) -> W {
        self.edge_values[edge as usize]
    }

    /// Merge intersection of the (sorted) neighbor rows of `a` and `b`.
    ///
    /// Calls `f` for every common neighbor and returns the match count.
    pub fn intersect<F: FnMut(VertexId)>(&self, a: VertexId, b: VertexId, mut f: F) -> u32 {
        let mut left = self.neighbors(a);
        let mut right = self.neighbors(b);
        let mut count = 0;

        let mut x = left.next();
        let mut y = right.next();
        while let (Some((u, _)), Some((v, _))) = (x, y) {
            if u < v {
                x = left.next();
            } else if u > v {
                y = right.next();
            } else {
                f(u);
                count += 1;
                x = left.next();
                y = right.next();
            }
        }
        count
    }
}

/// Random-access neighbor iterator yielding `(neighbor, edge id)`.
#[derive(Debug, Clone)]
pub struct Neighbors<'a> {
    column_indices: &'a [VertexId],
    cursor: usize,
    end: usize,
}

impl Iterator for Neighbors<'_> {
    type Item = (VertexId, EdgeId);

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.end {
            return None;
        }
        let edge = self.cursor;
        self.cursor += 1;
        // SAFETY: `cursor < end <= column_indices.len()` by CSR construction.
        let neighbor = unsafe { *self.column_indices.get_unchecked(edge) };
        Some((neighbor, edge as EdgeId))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.cursor;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Neighbors<'_> {}
