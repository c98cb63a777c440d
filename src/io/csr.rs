//! COO ↔ CSR conversion.

use crate::error::{Error, Result};
use crate::formats::{Coo, Csr};
use crate::types::{VertexId, Weight};

/// Builds a CSR from coordinates, inferring the vertex count from the
/// largest referenced id.
pub fn from_coo<W: Weight>(coo: &Coo<W>) -> Result<Csr<W>> {
    let vertex_count = coo
        .rows()
        .iter()
        .chain(coo.cols())
        .map(|&v| v as usize + 1)
        .max()
        .unwrap_or(0);
    from_coo_with_vertex_count(coo, vertex_count)
}

/// Builds a CSR over exactly `vertex_count` vertices by counting sort.
///
/// Rows are sorted ascending afterwards, repairing unsorted input; entries
/// with equal `(row, col)` are kept as parallel edges.
pub fn from_coo_with_vertex_count<W: Weight>(
    coo: &Coo<W>,
    vertex_count: usize,
) -> Result<Csr<W>> {
    if let Some(&bad) = coo
        .rows()
        .iter()
        .chain(coo.cols())
        .find(|&&v| v as usize >= vertex_count)
    {
        return Err(Error::InvalidInput(format!(
            "vertex {bad} out of bounds for {vertex_count} vertices"
        )));
    }

    let nnz = coo.len();
    let mut row_offsets = vec![0u32; vertex_count + 1];
    for &r in coo.rows() {
        row_offsets[r as usize + 1] += 1;
    }
    for i in 0..vertex_count {
        row_offsets[i + 1] += row_offsets[i];
    }

    let mut column_indices = vec![0 as VertexId; nnz];
    let mut edge_values = vec![W::zero(); nnz];
    let mut cursor: Vec<u32> = row_offsets[..vertex_count].to_vec();
    for i in 0..nnz {
        let r = coo.rows()[i] as usize;
        let at = cursor[r] as usize;
        column_indices[at] = coo.cols()[i];
        edge_values[at] = coo.values()[i];
        cursor[r] += 1;
    }

    // Repair the sorted-row invariant; merge intersection depends on it.
    for v in 0..vertex_count {
        let lo = row_offsets[v] as usize;
        let hi = row_offsets[v + 1] as usize;
        let row = &mut column_indices[lo..hi];
        if row.windows(2).any(|w| w[0] > w[1]) {
            let mut order: Vec<usize> = (0..row.len()).collect();
            order.sort_unstable_by_key(|&i| row[i]);
            let sorted_cols: Vec<VertexId> = order.iter().map(|&i| row[i]).collect();
            let sorted_vals: Vec<W> = order.iter().map(|&i| edge_values[lo + i]).collect();
            row.copy_from_slice(&sorted_cols);
            edge_values[lo..hi].copy_from_slice(&sorted_vals);
        }
    }

    Csr::new(row_offsets, column_indices, edge_values)
}

/// Reads a dense adjacency matrix: a vertex count line, then one row of
/// space-separated values per vertex. Zero entries are absent edges.
pub fn from_matrix<W: Weight, R: std::io::BufRead>(reader: R) -> Result<Csr<W>> {
    let mut lines = reader.lines();
    let n: usize = lines
        .next()
        .ok_or_else(|| Error::InvalidInput("missing matrix size line".into()))??
        .trim()
        .parse()
        .map_err(|_| Error::InvalidInput("malformed matrix size line".into()))?;

    let mut row_offsets = vec![0u32];
    let mut column_indices = Vec::new();
    let mut edge_values = Vec::new();
    for row in 0..n {
        let line = lines
            .next()
            .ok_or_else(|| Error::InvalidInput(format!("missing matrix row {row}")))??;
        let mut read = 0usize;
        for (col, text) in line.split_whitespace().enumerate() {
            let value = W::parse(text)
                .ok_or_else(|| Error::InvalidInput(format!("bad matrix entry `{text}`")))?;
            if value != W::zero() {
                column_indices.push(col as VertexId);
                edge_values.push(value);
            }
            read += 1;
        }
        if read != n {
            return Err(Error::InvalidInput(format!(
                "matrix row {row} has {read} entries, expected {n}"
            )));
        }
        row_offsets.push(column_indices.len() as u32);
    }

    Csr::new(row_offsets, column_indices, edge_values)
}

/// Reads a CSR in plain text: a vertex count line, the `n + 1` row offsets,
/// the column indices and the edge values, all whitespace-separated.
pub fn from_text<W: Weight, R: std::io::BufRead>(reader: R) -> Result<Csr<W>> {
    let mut tokens = Vec::new();
    for line in reader.lines() {
        let line = line?;
        tokens.extend(line.split_whitespace().map(str::to_owned));
    }
    let mut tokens = tokens.into_iter();

    let mut next_number = |what: &str| -> Result<String> {
        tokens
            .next()
            .ok_or_else(|| Error::InvalidInput(format!("missing {what}")))
    };

    let n: usize = next_number("vertex count")?
        .parse()
        .map_err(|_| Error::InvalidInput("malformed vertex count".into()))?;

    let mut row_offsets = Vec::with_capacity(n + 1);
    for i in 0..=n {
        let offset = next_number("row offset")?
            .parse()
            .map_err(|_| Error::InvalidInput(format!("malformed row offset {i}")))?;
        row_offsets.push(offset);
    }
    let nnz = *row_offsets.last().expect("offsets non-empty") as usize;

    let mut column_indices = Vec::with_capacity(nnz);
    for i in 0..nnz {
        let index = next_number("column index")?
            .parse()
            .map_err(|_| Error::InvalidInput(format!("malformed column index {i}")))?;
        column_indices.push(index);
    }

    let mut edge_values = Vec::with_capacity(nnz);
    for i in 0..nnz {
        let text = next_number("edge value")?;
        let value = W::parse(&text)
            .ok_or_else(|| Error::InvalidInput(format!("malformed edge value {i}")))?;
        edge_values.push(value);
    }

    Csr::new(row_offsets, column_indices, edge_values)
}

/// Projects a CSR back into `(row, col, value)` coordinates in row-major
/// order.
pub fn to_coo<W: Weight>(csr: &Csr<W>) -> Coo<W> {
    let nnz = csr.edge_count();
    let mut rows = Vec::with_capacity(nnz);
    for v in 0..csr.vertex_count() {
        let degree = csr.degree(v as VertexId);
        rows.extend(std::iter::repeat(v as VertexId).take(degree));
    }
    Coo::new(rows, csr.column_indices().to_vec(), csr.edge_values().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counting_sort_groups_rows() {
        let coo = Coo::new(vec![2, 0, 1, 0], vec![0, 2, 2, 1], vec![1u32, 2, 3, 4]);
        let csr = from_coo(&coo).unwrap();
        assert_eq!(csr.row_offsets(), &[0, 2, 3, 4]);
        assert_eq!(csr.neighbors(0), &[1, 2]);
        assert_eq!(csr.neighbors(1), &[2]);
        assert_eq!(csr.neighbors(2), &[0]);
        // Weights follow their columns through the repair sort.
        assert_eq!(csr.edge_values(), &[4, 2, 3, 1]);
    }

    #[test]
    fn test_isolated_tail_vertices_are_kept() {
        let coo = Coo::new(vec![0], vec![1], vec![1u32]);
        let csr = from_coo_with_vertex_count(&coo, 6).unwrap();
        assert_eq!(csr.vertex_count(), 6);
        assert_eq!(csr.degree(5), 0);
    }

    #[test]
    fn test_round_trip_through_coo() {
        let coo = Coo::new(vec![0, 0, 1, 2], vec![1, 2, 2, 0], vec![1u32, 2, 3, 4]);
        let csr = from_coo(&coo).unwrap();
        let back = from_coo(&to_coo(&csr)).unwrap();
        assert_eq!(csr, back);
    }

    #[test]
    fn test_coo_sort_does_not_change_the_csr() {
        let mut shuffled = Coo::new(vec![2, 0, 1, 0], vec![0, 2, 2, 1], vec![1u32, 2, 3, 4]);
        let from_shuffled = from_coo(&shuffled).unwrap();
        shuffled.sort();
        assert_eq!(from_coo(&shuffled).unwrap(), from_shuffled);
    }

    #[test]
    fn test_from_matrix_reads_the_sample_graphs() {
        let csr = from_matrix::<u32, _>(crate::io::matrices::SYMMETRIC_6_NODES.as_bytes())
            .unwrap();
        assert_eq!(csr.vertex_count(), 6);
        assert_eq!(csr.edge_count(), 12);
        assert_eq!(csr.neighbors(2), &[0, 1, 3, 4]);

        let csr =
            from_matrix::<u32, _>(crate::io::matrices::TWO_COMPONENTS_6_NODES.as_bytes()).unwrap();
        assert_eq!(csr.degree(5), 0);
    }

    #[test]
    fn test_from_matrix_rejects_ragged_rows() {
        let text = "2\n0 1\n1\n";
        assert!(from_matrix::<u32, _>(text.as_bytes()).is_err());
    }

    #[test]
    fn test_from_text_round_trips_a_small_csr() {
        let text = "3\n0 2 3 3\n1 2 2\n5 6 7\n";
        let csr = from_text::<u32, _>(text.as_bytes()).unwrap();
        assert_eq!(csr.row_offsets(), &[0, 2, 3, 3]);
        assert_eq!(csr.column_indices(), &[1, 2, 2]);
        assert_eq!(csr.edge_values(), &[5, 6, 7]);
    }

    #[test]
    fn test_from_text_rejects_truncated_input() {
        let text = "3\n0 2 3 3\n1 2\n";
        assert!(from_text::<u32, _>(text.as_bytes()).is_err());
    }
}
