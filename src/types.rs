use serde::{Deserialize, Serialize};
use std::fmt;

/// Row order of every matrix in the crate
pub const BASES: [u8; 4] = *b"ACGT";

/// Number of rows in a count or scoring matrix
pub const ALPHABET_SIZE: usize = BASES.len();

/// Code assigned to any byte outside {A, C, G, T}
pub const AMBIGUOUS: u8 = ALPHABET_SIZE as u8;

const fn build_base_codes() -> [u8; 256] {
    let mut codes = [AMBIGUOUS; 256];
    let mut i = 0;
    while i < ALPHABET_SIZE {
        codes[BASES[i] as usize] = i as u8;
        i += 1;
    }
    codes
}

/// Byte to row index lookup. Lowercase (soft-masked) bases map to [`AMBIGUOUS`].
pub static BASE_CODES: [u8; 256] = build_base_codes();

/// Row index of `base`, or `None` for ambiguous symbols
#[inline]
pub fn base_index(base: u8) -> Option<usize> {
    match BASE_CODES[base as usize] {
        AMBIGUOUS => None,
        code => Some(code as usize),
    }
}

/// DNA strand a hit was reported on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    pub fn symbol(&self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A single motif occurrence.
///
/// Coordinates are 0-based half-open on the parent contig of the scanned
/// sequence, so `end - start` is always the motif width. This matches BED
/// directly; use [`Hit::one_based_start`] for 1-based inclusive intervals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub sequence: String,
    pub start: u64,
    pub end: u64,
    pub motif: String,
    pub score: f64,
    pub strand: Strand,
}

impl Hit {
    /// Start of the hit as a 1-based inclusive coordinate
    pub fn one_based_start(&self) -> u64 {
        self.start + 1
    }

    pub fn width(&self) -> u64 {
        self.end - self.start
    }
}
