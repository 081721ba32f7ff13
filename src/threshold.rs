//! Exact p-value to score threshold conversion.
//!
//! Scores are discretised into buckets of width `resolution` (floor rounding)
//! and the per-column score distributions under the background model are
//! convolved into the distribution of the total window score.

use crate::config::{validate_pvalue, validate_resolution, DEFAULT_RESOLUTION};
use crate::error::Result;
use crate::matrix::{Background, ScoringMatrix};
use crate::types::ALPHABET_SIZE;
use log::debug;

/// Relative slack when comparing accumulated probability mass with a p-value
const MASS_TOLERANCE: f64 = 1e-9;

/// Converts p-values to score thresholds for a fixed bucket resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibrator {
    resolution: f64,
}

impl Default for Calibrator {
    fn default() -> Self {
        Calibrator {
            resolution: DEFAULT_RESOLUTION,
        }
    }
}

impl Calibrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a calibrator with a custom bucket width.
    ///
    /// Coarser buckets shrink the distribution (and the work) at the cost of
    /// threshold precision, which is only guaranteed to within `resolution`.
    pub fn with_resolution(resolution: f64) -> Result<Self> {
        validate_resolution(resolution)?;
        Ok(Calibrator { resolution })
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    #[inline]
    fn bucket(&self, score: f64) -> i64 {
        (score / self.resolution).floor() as i64
    }

    /// Distribution of a single column: mass `background[b]` at the bucket of
    /// `matrix[b][column]`, collapsed by bucket. `-inf` cells carry no mass.
    fn column_distribution(
        &self,
        matrix: &ScoringMatrix,
        background: &Background,
        column: usize,
    ) -> Vec<(i64, f64)> {
        let mut masses: Vec<(i64, f64)> = Vec::with_capacity(ALPHABET_SIZE);
        for b in 0..ALPHABET_SIZE {
            let score = matrix.get(b, column);
            if !score.is_finite() {
                continue;
            }
            let bucket = self.bucket(score);
            match masses.iter_mut().find(|(existing, _)| *existing == bucket) {
                Some((_, mass)) => *mass += background.get(b),
                None => masses.push((bucket, background.get(b))),
            }
        }
        masses
    }

    /// Distribution of the total score of a width-W window under `background`
    pub fn distribution(
        &self,
        matrix: &ScoringMatrix,
        background: &Background,
    ) -> ScoreDistribution {
        let mut offset: i64 = 0;
        let mut masses = vec![1.0];

        for column in 0..matrix.width() {
            let column_masses = self.column_distribution(matrix, background, column);
            let low = column_masses.iter().map(|(b, _)| *b).min().unwrap_or(0);
            let high = column_masses.iter().map(|(b, _)| *b).max().unwrap_or(0);

            let mut next = vec![0.0; masses.len() + (high - low) as usize];
            for (i, &mass) in masses.iter().enumerate() {
                if mass == 0.0 {
                    continue;
                }
                for &(bucket, column_mass) in &column_masses {
                    next[i + (bucket - low) as usize] += mass * column_mass;
                }
            }

            offset += low;
            masses = next;
        }

        ScoreDistribution {
            offset,
            masses,
            resolution: self.resolution,
        }
    }

    /// Smallest threshold whose background tail probability is at most `pvalue`.
    ///
    /// # Errors
    /// * `MotifError::InvalidParameter` if `pvalue` is not in (0, 1]
    pub fn threshold(
        &self,
        matrix: &ScoringMatrix,
        background: &Background,
        pvalue: f64,
    ) -> Result<f64> {
        validate_pvalue(pvalue)?;

        let distribution = self.distribution(matrix, background);
        let mut threshold = distribution.threshold_bucket(pvalue) as f64 * self.resolution;
        if pvalue < best_window_probability(matrix, background) {
            // Even the best window is too likely: no window may pass.
            let top = (matrix.max_score() / self.resolution).floor();
            let above_max = (top + 1.0) * self.resolution;
            threshold = threshold.max(above_max);
        }

        debug!(
            "calibrated threshold {:.4} for p = {:e} (width {}, {} buckets)",
            threshold,
            pvalue,
            matrix.width(),
            distribution.masses.len()
        );

        Ok(threshold)
    }
}

/// Convenience wrapper using the default resolution
///
/// # Example
/// ```
/// use tfbs_scan::matrix::{Background, CountMatrix, ScoringMatrix};
/// use tfbs_scan::threshold::threshold_from_pvalue;
///
/// let bg = Background::uniform();
/// let pfm = CountMatrix::from_rows(&[vec![10, 0], vec![0, 10], vec![0, 0], vec![0, 0]]).unwrap();
/// let pwm = ScoringMatrix::from_counts(&pfm, &bg, 0.8).unwrap();
///
/// let strict = threshold_from_pvalue(&pwm, &bg, 0.01).unwrap();
/// let loose = threshold_from_pvalue(&pwm, &bg, 0.5).unwrap();
/// assert!(strict >= loose);
/// ```
pub fn threshold_from_pvalue(
    matrix: &ScoringMatrix,
    background: &Background,
    pvalue: f64,
) -> Result<f64> {
    Calibrator::default().threshold(matrix, background, pvalue)
}

/// Discrete distribution of window scores, indexed by bucket
#[derive(Debug, Clone)]
pub struct ScoreDistribution {
    offset: i64,
    masses: Vec<f64>,
    resolution: f64,
}

impl ScoreDistribution {
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Lowest bucket with mass, in score units
    pub fn min_score(&self) -> Option<f64> {
        self.masses
            .iter()
            .position(|m| *m > 0.0)
            .map(|i| (self.offset + i as i64) as f64 * self.resolution)
    }

    /// Highest bucket with mass, in score units
    pub fn max_score(&self) -> Option<f64> {
        self.masses
            .iter()
            .rposition(|m| *m > 0.0)
            .map(|i| (self.offset + i as i64) as f64 * self.resolution)
    }

    /// Probability mass over finite scores; below 1 only when some cell is `-inf`
    pub fn total_mass(&self) -> f64 {
        self.masses.iter().sum()
    }

    /// `P(S >= score)` on the bucketed score scale
    pub fn survival(&self, score: f64) -> f64 {
        let first = (score / self.resolution).ceil() as i64 - self.offset;
        if first <= 0 {
            return self.total_mass();
        }
        self.masses.iter().skip(first as usize).sum()
    }

    /// `min { s : P(S >= s) <= pvalue }` over integer buckets.
    ///
    /// Walks buckets top-down accumulating mass; the answer sits one bucket
    /// above the first bucket whose inclusion pushes the tail past `pvalue`,
    /// or at the bottom of the range when the whole tail fits.
    fn threshold_bucket(&self, pvalue: f64) -> i64 {
        let limit = pvalue * (1.0 + MASS_TOLERANCE);
        let mut survival = 0.0;

        for (i, &mass) in self.masses.iter().enumerate().rev() {
            if mass <= 0.0 {
                continue;
            }
            survival += mass;
            if survival > limit {
                return self.offset + i as i64 + 1;
            }
        }

        self.offset
    }
}

/// Background probability of the highest scoring window(s)
fn best_window_probability(matrix: &ScoringMatrix, background: &Background) -> f64 {
    matrix
        .column_maxima()
        .iter()
        .enumerate()
        .map(|(column, &best)| {
            (0..ALPHABET_SIZE)
                .filter(|&b| matrix.get(b, column) == best)
                .map(|b| background.get(b))
                .sum::<f64>()
        })
        .product()
}
