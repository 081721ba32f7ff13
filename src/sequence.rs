use crate::error::{MotifError, Result};
use crate::matrix::Background;
use crate::types::{base_index, ALPHABET_SIZE};
use phf::phf_map;

static COMPLEMENT: phf::Map<char, char> = phf_map! {
    'A' => 'T',
    'C' => 'G',
    'G' => 'C',
    'T' => 'A',
    'N' => 'N',
    'a' => 't',
    'c' => 'g',
    'g' => 'c',
    't' => 'a',
    'n' => 'n',
};

/// A named stretch of DNA drawn from a larger contig.
///
/// `start` is the 1-based coordinate of the first base on the parent contig;
/// hits are translated onto that contig in 0-based half-open form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    name: String,
    data: String,
    start: u64,
}

impl Sequence {
    /// Creates a sequence starting at contig position 1
    pub fn new(name: impl Into<String>, data: impl Into<String>) -> Result<Self> {
        Self::with_start(name, data, 1)
    }

    /// Creates a sequence whose first base sits at 1-based `start` on its contig.
    ///
    /// Data must be ASCII so that byte offsets are base offsets.
    ///
    /// # Errors
    /// * `MotifError::InvalidParameter` if `start` is 0
    /// * `MotifError::InvalidSequence` at the first non-ASCII character
    pub fn with_start(
        name: impl Into<String>,
        data: impl Into<String>,
        start: u64,
    ) -> Result<Self> {
        if start == 0 {
            return Err(MotifError::invalid_parameter(
                "start",
                start,
                "sequence coordinates are 1-based",
            ));
        }

        let data = data.into();
        if let Some((position, c)) = data.chars().enumerate().find(|(_, c)| !c.is_ascii()) {
            return Err(MotifError::invalid_sequence(
                position,
                format!("non-ASCII character '{}'", c),
            ));
        }

        Ok(Sequence {
            name: name.into(),
            data,
            start,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.data.as_bytes()
    }

    /// 1-based start on the parent contig
    pub fn start(&self) -> u64 {
        self.start
    }

    /// 0-based start on the parent contig
    pub fn start0(&self) -> u64 {
        self.start - 1
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Generates the reverse complement of a DNA sequence.
///
/// # Arguments
/// * `sequence` - Input DNA sequence string
///
/// # Returns
/// * `Result<String>` - The reverse complement where A ↔ T, C ↔ G and N stays N.
///   Case is preserved.
///
/// # Errors
/// * Returns `MotifError::InvalidSequence` for any other character
pub fn reverse_complement(sequence: &str) -> Result<String> {
    let length = sequence.chars().count();
    sequence
        .chars()
        .rev()
        .enumerate()
        .map(|(i, c)| {
            COMPLEMENT.get(&c).copied().ok_or_else(|| {
                MotifError::invalid_sequence(length - 1 - i, format!("cannot complement '{}'", c))
            })
        })
        .collect()
}

/// Fraction of G and C among the bases of `sequence` (0.0 when empty)
pub fn gc_content(sequence: &str) -> f64 {
    if sequence.is_empty() {
        return 0.0;
    }
    let gc_count = sequence
        .bytes()
        .filter(|b| matches!(b.to_ascii_uppercase(), b'G' | b'C'))
        .count() as f64;
    gc_count / sequence.len() as f64
}

/// Estimates a background distribution from base composition.
///
/// Counts A, C, G and T case-insensitively across all sequences, adds one
/// pseudocount per base so no frequency is zero, and normalises.
///
/// # Errors
/// * Returns `MotifError::InvalidBackground` if no unambiguous base is found
pub fn base_composition<'a, I>(sequences: I) -> Result<Background>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts = [0u64; ALPHABET_SIZE];
    for sequence in sequences {
        for b in sequence.bytes() {
            if let Some(index) = base_index(b.to_ascii_uppercase()) {
                counts[index] += 1;
            }
        }
    }

    let observed: u64 = counts.iter().sum();
    if observed == 0 {
        return Err(MotifError::invalid_background(
            "no A, C, G or T found in the input sequences",
        ));
    }

    let total = (observed + ALPHABET_SIZE as u64) as f64;
    let mut frequencies = [0.0; ALPHABET_SIZE];
    for (f, &count) in frequencies.iter_mut().zip(counts.iter()) {
        *f = (count + 1) as f64 / total;
    }
    Background::new(frequencies)
}
