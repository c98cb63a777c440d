//! MatrixMarket coordinate reader.

use std::io::BufRead;

use crate::error::{Error, Result};
use crate::formats::Coo;
use crate::types::{VertexId, Weight};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Real,
    Integer,
    Pattern,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Symmetry {
    General,
    Symmetric,
}

#[derive(Debug)]
struct Banner {
    field: Field,
    symmetry: Symmetry,
}

impl Banner {
    fn parse(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        if parts.next() != Some("%%MatrixMarket") {
            return Err(Error::InvalidInput("missing MatrixMarket banner".into()));
        }
        let object = parts.next().unwrap_or_default();
        let format = parts.next().unwrap_or_default();
        let field = parts.next().unwrap_or_default();
        let symmetry = parts.next().unwrap_or_default();

        if object != "matrix" {
            return Err(Error::InvalidInput(format!(
                "unsupported MatrixMarket object `{object}`"
            )));
        }
        if format != "coordinate" {
            return Err(Error::InvalidInput(format!(
                "unsupported MatrixMarket format `{format}`"
            )));
        }
        let field = match field {
            "real" => Field::Real,
            "integer" => Field::Integer,
            "pattern" => Field::Pattern,
            other => {
                return Err(Error::InvalidInput(format!(
                    "unsupported MatrixMarket field `{other}`"
                )))
            }
        };
        let symmetry = match symmetry {
            "general" => Symmetry::General,
            "symmetric" => Symmetry::Symmetric,
            other => {
                return Err(Error::InvalidInput(format!(
                    "unsupported MatrixMarket symmetry `{other}`"
                )))
            }
        };
        Ok(Self { field, symmetry })
    }
}

/// Reads a MatrixMarket coordinate file into COO form.
///
/// Indices are converted from the format's 1-based convention; symmetric
/// matrices have off-diagonal entries mirrored; pattern fields get unit
/// weights. Returns the entries and the declared vertex count.
pub fn from_reader<W: Weight, R: BufRead>(reader: R) -> Result<(Coo<W>, usize)> {
    let mut lines = reader.lines();

    let banner_line = lines
        .next()
        .ok_or_else(|| Error::InvalidInput("empty MatrixMarket file".into()))??;
    let banner = Banner::parse(&banner_line)?;

    let size_line = loop {
        match lines.next() {
            Some(line) => {
                let line = line?;
                if !line.starts_with('%') && !line.trim().is_empty() {
                    break line;
                }
            }
            None => return Err(Error::InvalidInput("missing MatrixMarket size line".into())),
        }
    };
    let mut fields = size_line.split_whitespace();
    let rows: usize = parse_field(fields.next(), "row count")?;
    let cols: usize = parse_field(fields.next(), "column count")?;
    let nnz: usize = parse_field(fields.next(), "nonzero count")?;
    let vertices = rows.max(cols);

    let mut out_rows = Vec::with_capacity(nnz * 2);
    let mut out_cols = Vec::with_capacity(nnz * 2);
    let mut out_values = Vec::with_capacity(nnz * 2);
    let mut read = 0usize;

    for line in lines {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('%') {
            continue;
        }
        let mut fields = trimmed.split_whitespace();
        let u: usize = parse_field(fields.next(), "row index")?;
        let v: usize = parse_field(fields.next(), "column index")?;
        if u == 0 || u > rows || v == 0 || v > cols {
            return Err(Error::InvalidInput(format!(
                "entry ({u}, {v}) out of bounds for a {rows}x{cols} matrix"
            )));
        }
        let w = match banner.field {
            Field::Pattern => W::one(),
            Field::Real | Field::Integer => {
                let text = fields
                    .next()
                    .ok_or_else(|| Error::InvalidInput("missing entry value".into()))?;
                W::parse(text)
                    .ok_or_else(|| Error::InvalidInput(format!("bad entry value `{text}`")))?
            }
        };
        let (u, v) = ((u - 1) as VertexId, (v - 1) as VertexId);
        out_rows.push(u);
        out_cols.push(v);
        out_values.push(w);
        if banner.symmetry == Symmetry::Symmetric && u != v {
            out_rows.push(v);
            out_cols.push(u);
            out_values.push(w);
        }
        read += 1;
    }

    if read != nnz {
        return Err(Error::InvalidInput(format!(
            "size line declares {nnz} entries but {read} were read"
        )));
    }

    Ok((Coo::new(out_rows, out_cols, out_values), vertices))
}

fn parse_field<T: std::str::FromStr>(field: Option<&str>, what: &str) -> Result<T> {
    field
        .and_then(|text| text.parse().ok())
        .ok_or_else(|| Error::InvalidInput(format!("missing or malformed {what}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_general_real() {
        let text = "%%MatrixMarket matrix coordinate real general\n\
                    % a comment\n\
                    3 3 2\n\
                    1 2 1.5\n\
                    3 1 2.5\n";
        let (coo, vertices) = from_reader::<f32, _>(text.as_bytes()).unwrap();
        assert_eq!(vertices, 3);
        assert_eq!(coo.rows(), &[0, 2]);
        assert_eq!(coo.cols(), &[1, 0]);
        assert_eq!(coo.values(), &[1.5, 2.5]);
    }

    #[test]
    fn test_symmetric_pattern_mirrors_off_diagonal() {
        let text = "%%MatrixMarket matrix coordinate pattern symmetric\n\
                    3 3 2\n\
                    2 1\n\
                    3 3\n";
        let (coo, _) = from_reader::<u32, _>(text.as_bytes()).unwrap();
        assert_eq!(coo.rows(), &[1, 0, 2]);
        assert_eq!(coo.cols(), &[0, 1, 2]);
        assert_eq!(coo.values(), &[1, 1, 1]);
    }

    #[test]
    fn test_bad_banner_is_rejected() {
        let text = "%%MatrixMarket matrix array real general\n1 1 1\n";
        assert!(from_reader::<u32, _>(text.as_bytes()).is_err());
    }
}
