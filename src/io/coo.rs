//! Plain-text coordinate-list reader.
//!
//! The format is a header line `<vertices> <vertices> <edges>` followed by
//! one `src dst [weight]` line per edge, with `%`-prefixed comment lines
//! allowed anywhere before the header. Missing weights default to one.

use std::io::BufRead;

use crate::error::{Error, Result};
use crate::formats::Coo;
use crate::types::{VertexId, Weight};

/// Reads a COO graph, returning the entries and the declared vertex count.
///
/// With `undirected`, every edge is inserted in both directions.
pub fn from_reader<W: Weight, R: BufRead>(reader: R, undirected: bool) -> Result<(Coo<W>, usize)> {
    let mut lines = reader.lines();

    let header = loop {
        match lines.next() {
            Some(line) => {
                let line = line?;
                if !line.starts_with('%') && !line.trim().is_empty() {
                    break line;
                }
            }
            None => return Err(Error::InvalidInput("missing COO header line".into())),
        }
    };

    let mut fields = header.split_whitespace();
    let vertices: usize = parse_field(fields.next(), "vertex count")?;
    let _cols: usize = parse_field(fields.next(), "vertex count")?;
    let declared_edges: usize = parse_field(fields.next(), "edge count")?;

    let capacity = declared_edges * if undirected { 2 } else { 1 };
    let mut rows = Vec::with_capacity(capacity);
    let mut cols = Vec::with_capacity(capacity);
    let mut values = Vec::with_capacity(capacity);

    for line in lines {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('%') {
            continue;
        }
        let mut fields = trimmed.split_whitespace();
        let u: VertexId = parse_field(fields.next(), "source vertex")?;
        let v: VertexId = parse_field(fields.next(), "destination vertex")?;
        let w = match fields.next() {
            Some(text) => W::parse(text)
                .ok_or_else(|| Error::InvalidInput(format!("bad edge weight `{text}`")))?,
            None => W::one(),
        };
        if u as usize >= vertices || v as usize >= vertices {
            return Err(Error::InvalidInput(format!(
                "edge ({u}, {v}) out of bounds for {vertices} vertices"
            )));
        }
        rows.push(u);
        cols.push(v);
        values.push(w);
        if undirected {
            rows.push(v);
            cols.push(u);
            values.push(w);
        }
    }

    if rows.len() != capacity {
        return Err(Error::InvalidInput(format!(
            "header declares {declared_edges} edges but {} were read",
            if undirected { rows.len() / 2 } else { rows.len() }
        )));
    }

    Ok((Coo::new(rows, cols, values), vertices))
}

fn parse_field<T: std::str::FromStr>(field: Option<&str>, what: &str) -> Result<T> {
    field
        .and_then(|text| text.parse().ok())
        .ok_or_else(|| Error::InvalidInput(format!("missing or malformed {what}")))
}
