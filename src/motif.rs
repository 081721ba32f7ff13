use crate::config::MotifConfig;
use crate::error::Result;
use crate::matrix::{Background, CountMatrix, ScoringMatrix};
use crate::threshold::Calibrator;
use ndarray::Array2;

/// Mismatches tolerated when deriving the score scaling factor
const MISMATCH_TOLERANCE: f64 = 6.0;

/// Information (bits) assumed lost across the tolerated mismatches
const MISMATCH_BITS: f64 = 13.2;

/// A calibrated binding motif.
///
/// Holds the forward and reverse-complement scoring matrices together with
/// the score threshold shared by both strands. Read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Motif {
    id: String,
    matrix: ScoringMatrix,
    complement: ScoringMatrix,
    background: Background,
    threshold: f64,
    pvalue: Option<f64>,
    max_score: f64,
    consensus: String,
}

impl Motif {
    /// Builds a motif from raw counts and calibrates its threshold.
    ///
    /// # Arguments
    /// * `id` - Motif identifier reported on every hit
    /// * `counts` - Base counts per position
    /// * `config` - Background, pseudocount, p-value and bucket resolution
    ///
    /// # Errors
    /// Any invalid parameter in `config` or an unusable count matrix; see
    /// [`MotifError::is_configuration`](crate::error::MotifError::is_configuration).
    ///
    /// # Example
    /// ```
    /// use tfbs_scan::config::MotifConfig;
    /// use tfbs_scan::matrix::CountMatrix;
    /// use tfbs_scan::motif::Motif;
    ///
    /// let pfm = CountMatrix::from_rows(&[
    ///     vec![6, 4, 0, 5, 5, 4],
    ///     vec![0, 0, 2, 0, 0, 0],
    ///     vec![0, 0, 3, 0, 0, 0],
    ///     vec![0, 2, 1, 1, 1, 2],
    /// ])
    /// .unwrap();
    /// let motif = Motif::from_counts("test_pfm", &pfm, &MotifConfig::default()).unwrap();
    /// assert_eq!(motif.consensus(), "AAGAAA");
    /// ```
    pub fn from_counts(
        id: impl Into<String>,
        counts: &CountMatrix,
        config: &MotifConfig,
    ) -> Result<Self> {
        config.validate()?;
        let matrix = ScoringMatrix::from_counts(counts, &config.background, config.pseudocount)?;
        let calibrator = Calibrator::with_resolution(config.resolution)?;
        let threshold = calibrator.threshold(&matrix, &config.background, config.pvalue)?;

        let mut motif = Self::with_threshold(id, matrix, config.background, threshold);
        motif.pvalue = Some(config.pvalue);
        Ok(motif)
    }

    /// Calibrates a pre-built scoring matrix at `pvalue` with the default resolution
    pub fn with_pvalue(
        id: impl Into<String>,
        matrix: ScoringMatrix,
        background: Background,
        pvalue: f64,
    ) -> Result<Self> {
        let threshold = Calibrator::default().threshold(&matrix, &background, pvalue)?;
        let mut motif = Self::with_threshold(id, matrix, background, threshold);
        motif.pvalue = Some(pvalue);
        Ok(motif)
    }

    /// Wraps a scoring matrix with an explicit raw score threshold
    pub fn with_threshold(
        id: impl Into<String>,
        matrix: ScoringMatrix,
        background: Background,
        threshold: f64,
    ) -> Self {
        let complement = matrix.complement();
        let max_score = matrix.max_score();
        let consensus = matrix.consensus();

        Motif {
            id: id.into(),
            matrix,
            complement,
            background,
            threshold,
            pvalue: None,
            max_score,
            consensus,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Forward strand scoring matrix
    pub fn matrix(&self) -> &ScoringMatrix {
        &self.matrix
    }

    /// Reverse strand scoring matrix
    pub fn complement(&self) -> &ScoringMatrix {
        &self.complement
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// p-value the threshold was calibrated at, if any
    pub fn pvalue(&self) -> Option<f64> {
        self.pvalue
    }

    pub fn width(&self) -> usize {
        self.matrix.width()
    }

    pub fn max_score(&self) -> f64 {
        self.max_score
    }

    pub fn min_score(&self) -> f64 {
        self.matrix.min_score()
    }

    pub fn consensus(&self) -> &str {
        &self.consensus
    }

    /// Per-cell information content in bits
    pub fn information_content(&self) -> Array2<f64> {
        self.matrix.information_content(&self.background)
    }

    pub fn total_information(&self) -> f64 {
        self.information_content().sum()
    }

    /// Score lost per bit of mismatch between the consensus and the threshold.
    ///
    /// `(max_score - threshold) / (total_information * 6 / 13.2)`; `None` for a
    /// motif carrying no information.
    pub fn scaling_factor(&self) -> Option<f64> {
        let mismatch_bits = self.total_information() * MISMATCH_TOLERANCE / MISMATCH_BITS;
        if mismatch_bits <= 0.0 {
            return None;
        }
        Some((self.max_score - self.threshold) / mismatch_bits)
    }
}
