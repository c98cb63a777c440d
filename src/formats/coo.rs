//! Coordinate-list storage.

use crate::types::{VertexId, Weight};

/// A graph as parallel `(row, col, value)` vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct Coo<W> {
    rows: Vec<VertexId>,
    cols: Vec<VertexId>,
    values: Vec<W>,
}

impl<W: Weight> Coo<W> {
    /// Bundles parallel coordinate vectors.
    ///
    /// # Panics
    ///
    /// Panics if the three vectors differ in length.
    pub fn new(rows: Vec<VertexId>, cols: Vec<VertexId>, values: Vec<W>) -> Self {
        assert!(
            rows.len() == cols.len() && cols.len() == values.len(),
            "coordinate vectors must have equal lengths"
        );
        Self { rows, cols, values }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row (source vertex) of each entry.
    pub fn rows(&self) -> &[VertexId] {
        &self.rows
    }

    /// Column (destination vertex) of each entry.
    pub fn cols(&self) -> &[VertexId] {
        &self.cols
    }

    /// Value (edge weight) of each entry.
    pub fn values(&self) -> &[W] {
        &self.values
    }

    /// Sorts entries by `(row, col)`, the canonical order for round-trips.
    pub fn sort(&mut self) {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.sort_by_key(|&i| (self.rows[i], self.cols[i]));
        self.rows = order.iter().map(|&i| self.rows[i]).collect();
        self.cols = order.iter().map(|&i| self.cols[i]).collect();
        self.values = order.iter().map(|&i| self.values[i]).collect();
    }
}
