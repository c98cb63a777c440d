//! Compressed-sparse-row storage.

use crate::error::{Error, Result};
use crate::types::{VertexId, Weight};

/// A graph in CSR form, immutable after construction.
///
/// For every vertex `v`, the neighbors live in
/// `column_indices[row_offsets[v]..row_offsets[v + 1]]` and are sorted
/// ascending within the row.
#[derive(Debug, Clone, PartialEq)]
pub struct Csr<W> {
    row_offsets: Vec<u32>,
    column_indices: Vec<VertexId>,
    edge_values: Vec<W>,
}

impl<W: Weight> Csr<W> {
    /// Bundles validated CSR arrays.
    ///
    /// Returns [`Error::InvalidInput`] if the offsets are not monotone, do
    /// not start at zero, do not match the index array length, or if any
    /// column index is out of bounds.
    pub fn new(
        row_offsets: Vec<u32>,
        column_indices: Vec<VertexId>,
        edge_values: Vec<W>,
    ) -> Result<Self> {
        if row_offsets.is_empty() {
            return Err(Error::InvalidInput("row offsets must not be empty".into()));
        }
        if row_offsets[0] != 0 {
            return Err(Error::InvalidInput("row offsets must start at zero".into()));
        }
        if row_offsets.windows(2).any(|w| w[0] > w[1]) {
            return Err(Error::InvalidInput("row offsets are not monotone".into()));
        }
        let nnz = *row_offsets.last().expect("offsets non-empty") as usize;
        if nnz != column_indices.len() {
            return Err(Error::InvalidInput(format!(
                "row offsets end at {nnz} but {} column indices are present",
                column_indices.len()
            )));
        }
        if edge_values.len() != column_indices.len() {
            return Err(Error::InvalidInput(format!(
                "{} edge values for {} column indices",
                edge_values.len(),
                column_indices.len()
            )));
        }
        let n = (row_offsets.len() - 1) as u32;
        if let Some(&bad) = column_indices.iter().find(|&&c| c >= n) {
            return Err(Error::InvalidInput(format!(
                "column index {bad} out of bounds for {n} vertices"
            )));
        }
        Ok(Self {
            row_offsets,
            column_indices,
            edge_values,
        })
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.row_offsets.len() - 1
    }

    /// Number of edges (stored nonzeros).
    pub fn edge_count(&self) -> usize {
        self.column_indices.len()
    }

    /// Row-offset array of length `vertex_count + 1`.
    pub fn row_offsets(&self) -> &[u32] {
        &self.row_offsets
    }

    /// Column-index array of length `edge_count`.
    pub fn column_indices(&self) -> &[VertexId] {
        &self.column_indices
    }

    /// Edge-value array of length `edge_count`.
    pub fn edge_values(&self) -> &[W] {
        &self.edge_values
    }

    /// Out-degree of `v`.
    pub fn degree(&self, v: VertexId) -> usize {
        let v = v as usize;
        (self.row_offsets[v + 1] - self.row_offsets[v]) as usize
    }

    /// Neighbor slice of `v`.
    pub fn neighbors(&self, v: VertexId) -> &[VertexId] {
        let v = v as usize;
        &self.column_indices[self.row_offsets[v] as usize..self.row_offsets[v + 1] as usize]
    }

    /// Whether every row is sorted ascending.
    pub fn rows_sorted(&self) -> bool {
        (0..self.vertex_count() as VertexId)
            .all(|v| self.neighbors(v).windows(2).all(|w| w[0] <= w[1]))
    }
}
