//! Binary CSR on-disk format.
//!
//! Little-endian throughout. The header is two unsigned 64-bit integers,
//! `num_row_offsets` and `num_nonzeros`, followed by the row offsets, the
//! column indices and the edge values back-to-back.

use std::io::{Read, Write};

use zerocopy::byteorder::{LittleEndian, U64};
use zerocopy::{AsBytes, FromBytes, FromZeroes};

use crate::error::{Error, Result};
use crate::formats::Csr;
use crate::types::{VertexId, Weight};

#[derive(Debug, FromZeroes, FromBytes, AsBytes)]
#[repr(C)]
struct Header {
    num_row_offsets: U64<LittleEndian>,
    num_nonzeros: U64<LittleEndian>,
}

/// Writes `csr` in the binary on-disk format.
pub fn write_csr<W: Weight, O: Write>(csr: &Csr<W>, out: &mut O) -> Result<()> {
    let header = Header {
        num_row_offsets: U64::new(csr.row_offsets().len() as u64),
        num_nonzeros: U64::new(csr.edge_count() as u64),
    };
    out.write_all(header.as_bytes())?;

    let mut body =
        Vec::with_capacity(csr.row_offsets().len() * 4 + csr.edge_count() * (4 + W::ENCODED_LEN));
    for &offset in csr.row_offsets() {
        body.extend_from_slice(&offset.to_le_bytes());
    }
    for &col in csr.column_indices() {
        body.extend_from_slice(&col.to_le_bytes());
    }
    let mut scratch = vec![0u8; W::ENCODED_LEN];
    for &value in csr.edge_values() {
        value.write_le(&mut scratch);
        body.extend_from_slice(&scratch);
    }
    out.write_all(&body)?;
    Ok(())
}

/// Reads a CSR in the binary on-disk format.
///
/// Verifies that the body sizes match the header and that the row offsets
/// satisfy the CSR invariant.
pub fn read_csr<W: Weight, R: Read>(input: &mut R) -> Result<Csr<W>> {
    let mut header_bytes = [0u8; std::mem::size_of::<Header>()];
    input
        .read_exact(&mut header_bytes)
        .map_err(|_| Error::InvalidInput("truncated binary CSR header".into()))?;
    let header = Header::read_from(&header_bytes[..]).expect("header size matches");

    let num_row_offsets = header.num_row_offsets.get() as usize;
    let num_nonzeros = header.num_nonzeros.get() as usize;
    if num_row_offsets == 0 {
        return Err(Error::InvalidInput(
            "binary CSR header declares zero row offsets".into(),
        ));
    }

    let row_offsets = read_u32s(input, num_row_offsets, "row offsets")?;
    let column_indices = read_u32s(input, num_nonzeros, "column indices")?;
    let edge_values = read_weights::<W, R>(input, num_nonzeros)?;

    // `Csr::new` re-checks monotonicity, the zero start and the header/body
    // size coherence.
    Csr::new(row_offsets, column_indices, edge_values)
}

fn read_u32s<R: Read>(input: &mut R, count: usize, what: &str) -> Result<Vec<VertexId>> {
    let mut bytes = vec![0u8; count * 4];
    input
        .read_exact(&mut bytes)
        .map_err(|_| Error::InvalidInput(format!("truncated binary CSR {what}")))?;
    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| u32::from_le_bytes(chunk.try_into().expect("chunk of 4")))
        .collect())
}

fn read_weights<W: Weight, R: Read>(input: &mut R, count: usize) -> Result<Vec<W>> {
    let mut bytes = vec![0u8; count * W::ENCODED_LEN];
    input
        .read_exact(&mut bytes)
        .map_err(|_| Error::InvalidInput("truncated binary CSR edge values".into()))?;
    Ok(bytes.chunks_exact(W::ENCODED_LEN).map(W::read_le).collect())
}
