//! Core scalar types shared by every component.
//!
//! Vertex and edge identifiers are fixed at 32 bits; edge weights are a
//! bounded generic so the same drivers run over integer and float weights.
//! The frontier bitmap word width is chosen at build time via the
//! `bitmap-word-32` cargo feature (64-bit words by default).

use std::fmt::{Debug, Display};
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, AtomicU64};

use atomic_float::AtomicF32;

use crate::sync::DeviceAtomic;

/// Identifier of a vertex, an index into the CSR row space.
pub type VertexId = u32;

/// Identifier of an edge, an absolute position in `column_indices`.
pub type EdgeId = u32;

/// Parent marker for vertices that have not been claimed by any traversal.
pub const NO_PARENT: VertexId = VertexId::MAX;

#[cfg(not(feature = "bitmap-word-32"))]
mod word {
    /// One word of a frontier bitmap.
    pub type BitmapWord = u64;
    /// Atomic cell holding one bitmap word.
    pub type AtomicBitmapWord = std::sync::atomic::AtomicU64;
}

#[cfg(feature = "bitmap-word-32")]
mod word {
    /// One word of a frontier bitmap.
    pub type BitmapWord = u32;
    /// Atomic cell holding one bitmap word.
    pub type AtomicBitmapWord = std::sync::atomic::AtomicU32;
}

pub use word::{AtomicBitmapWord, BitmapWord};

/// Number of bits per frontier bitmap word.
pub const WORD_BITS: usize = BitmapWord::BITS as usize;

/// Edge-weight scalar usable inside kernels.
///
/// Each weight type carries its atomic counterpart so per-vertex arrays of
/// weights (distances, sigma, rank) can be mutated lock-free from kernels.
pub trait Weight:
    Copy
    + Send
    + Sync
    + PartialOrd
    + Debug
    + Display
    + FromStr
    + num_traits::Num
    + num_traits::Bounded
    + 'static
{
    /// Atomic cell type whose value type is `Self`.
    type Atom: DeviceAtomic<Value = Self>;

    /// Number of bytes of the on-disk little-endian encoding.
    const ENCODED_LEN: usize;

    /// Parses a weight from graph-file text.
    fn parse(text: &str) -> Option<Self> {
        text.parse().ok()
    }

    /// Writes the little-endian encoding into `out` (`ENCODED_LEN` bytes).
    fn write_le(self, out: &mut [u8]);

    /// Reads a weight from its little-endian encoding (`ENCODED_LEN` bytes).
    fn read_le(bytes: &[u8]) -> Self;
}

impl Weight for u32 {
    type Atom = AtomicU32;

    const ENCODED_LEN: usize = 4;

    fn write_le(self, out: &mut [u8]) {
        out.copy_from_slice(&self.to_le_bytes());
    }

    fn read_le(bytes: &[u8]) -> Self {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(bytes);
        Self::from_le_bytes(raw)
    }
}

impl Weight for u64 {
    type Atom = AtomicU64;

    const ENCODED_LEN: usize = 8;

    fn write_le(self, out: &mut [u8]) {
        out.copy_from_slice(&self.to_le_bytes());
    }

    fn read_le(bytes: &[u8]) -> Self {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Self::from_le_bytes(raw)
    }
}

impl Weight for f32 {
    type Atom = AtomicF32;

    const ENCODED_LEN: usize = 4;

    fn write_le(self, out: &mut [u8]) {
        out.copy_from_slice(&self.to_le_bytes());
    }

    fn read_le(bytes: &[u8]) -> Self {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(bytes);
        Self::from_le_bytes(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_width_matches_feature() {
        assert_eq!(WORD_BITS, BitmapWord::BITS as usize);
        assert!(WORD_BITS == 32 || WORD_BITS == 64);
    }

    #[test]
    fn test_weight_le_round_trip() {
        let mut buf = [0u8; 4];
        3.5f32.write_le(&mut buf);
        assert_eq!(f32::read_le(&buf), 3.5);

        let mut buf = [0u8; 4];
        0xdead_beefu32.write_le(&mut buf);
        assert_eq!(u32::read_le(&buf), 0xdead_beef);
    }

    #[test]
    fn test_weight_parse_defaults() {
        assert_eq!(u32::parse("17"), Some(17));
        assert_eq!(f32::parse("2.25"), Some(2.25));
        assert_eq!(u32::parse("x"), None);
    }
}
