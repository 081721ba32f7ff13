//! Count matrices, background distributions and log-odds scoring matrices.
//!
//! Every matrix is stored as a 4 x W [`Array2`] whose rows follow the
//! [`BASES`](crate::types::BASES) order A, C, G, T.

use crate::config::validate_pseudocount;
use crate::error::{MotifError, Result};
use crate::types::{base_index, ALPHABET_SIZE, BASES};
use ndarray::{s, Array2};

const BACKGROUND_TOLERANCE: f64 = 1e-6;

/// Null-model base frequencies in A, C, G, T order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Background([f64; ALPHABET_SIZE]);

impl Background {
    /// Creates a background distribution.
    ///
    /// # Errors
    /// * `MotifError::InvalidBackground` if an entry is not a positive finite
    ///   number or the entries do not sum to 1 within 1e-6
    pub fn new(frequencies: [f64; ALPHABET_SIZE]) -> Result<Self> {
        for (base, &f) in BASES.iter().zip(frequencies.iter()) {
            if !f.is_finite() || f <= 0.0 {
                return Err(MotifError::invalid_background(format!(
                    "frequency of {} must be positive, got {}",
                    *base as char, f
                )));
            }
        }

        let total: f64 = frequencies.iter().sum();
        if (total - 1.0).abs() > BACKGROUND_TOLERANCE {
            return Err(MotifError::invalid_background(format!(
                "frequencies must sum to 1, got {}",
                total
            )));
        }

        Ok(Background(frequencies))
    }

    /// Same as [`Background::new`] but for an unsized slice
    pub fn from_slice(frequencies: &[f64]) -> Result<Self> {
        let frequencies: [f64; ALPHABET_SIZE] = frequencies.try_into().map_err(|_| {
            MotifError::invalid_background(format!(
                "expected {} frequencies, got {}",
                ALPHABET_SIZE,
                frequencies.len()
            ))
        })?;
        Self::new(frequencies)
    }

    pub fn uniform() -> Self {
        Background([0.25; ALPHABET_SIZE])
    }

    pub fn frequencies(&self) -> &[f64; ALPHABET_SIZE] {
        &self.0
    }

    #[inline]
    pub fn get(&self, base: usize) -> f64 {
        self.0[base]
    }
}

impl Default for Background {
    fn default() -> Self {
        Self::uniform()
    }
}

/// Observed base counts per motif position (PFM)
#[derive(Debug, Clone, PartialEq)]
pub struct CountMatrix {
    counts: Array2<f64>,
}

impl CountMatrix {
    /// Builds a count matrix from four rows (A, C, G, T) of equal length.
    ///
    /// # Arguments
    /// * `rows` - One row of counts per base, each `W` entries long
    ///
    /// # Errors
    /// * `MotifError::InvalidMatrix` if there are not exactly 4 rows, the rows
    ///   are empty or ragged, or any count is negative or non-finite
    ///
    /// # Example
    /// ```
    /// use tfbs_scan::matrix::CountMatrix;
    ///
    /// let pfm = CountMatrix::from_rows(&[
    ///     vec![6, 4, 0],
    ///     vec![0, 0, 2],
    ///     vec![0, 0, 3],
    ///     vec![0, 2, 1],
    /// ])
    /// .unwrap();
    /// assert_eq!(pfm.width(), 3);
    /// ```
    pub fn from_rows<T>(rows: &[Vec<T>]) -> Result<Self>
    where
        T: Copy + Into<f64>,
    {
        if rows.len() != ALPHABET_SIZE {
            return Err(MotifError::invalid_matrix(format!(
                "expected {} rows, got {}",
                ALPHABET_SIZE,
                rows.len()
            )));
        }

        let width = rows[0].len();
        if rows.iter().any(|row| row.len() != width) {
            return Err(MotifError::invalid_matrix(
                "all rows should be the same length",
            ));
        }

        let counts: Array2<f64> =
            Array2::from_shape_fn((ALPHABET_SIZE, width), |(b, c)| rows[b][c].into());
        Self::from_array(counts)
    }

    /// Wraps a 4 x W array of counts after validating it
    pub fn from_array(counts: Array2<f64>) -> Result<Self> {
        if counts.nrows() != ALPHABET_SIZE {
            return Err(MotifError::invalid_matrix(format!(
                "expected {} rows, got {}",
                ALPHABET_SIZE,
                counts.nrows()
            )));
        }
        if counts.ncols() == 0 {
            return Err(MotifError::invalid_matrix("motif width must be at least 1"));
        }
        if let Some(((b, c), v)) = counts
            .indexed_iter()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            return Err(MotifError::invalid_matrix(format!(
                "count for {} at column {} must be a non-negative number, got {}",
                BASES[b] as char, c, v
            )));
        }

        Ok(CountMatrix { counts })
    }

    pub fn counts(&self) -> &Array2<f64> {
        &self.counts
    }

    pub fn width(&self) -> usize {
        self.counts.ncols()
    }

    /// Computes the position probability matrix (PPM).
    ///
    /// Each cell receives `background[b] * pseudocount` extra mass before the
    /// column is normalised to sum to 1.
    ///
    /// # Errors
    /// * `MotifError::InvalidParameter` if `pseudocount` is negative
    /// * `MotifError::InvalidMatrix` if a column has no mass to normalise
    pub fn probabilities(&self, background: &Background, pseudocount: f64) -> Result<Array2<f64>> {
        validate_pseudocount(pseudocount)?;

        let mut ppm = self.counts.clone();
        for (b, mut row) in ppm.rows_mut().into_iter().enumerate() {
            row += background.get(b) * pseudocount;
        }

        for (c, mut column) in ppm.columns_mut().into_iter().enumerate() {
            let total = column.sum();
            if total <= 0.0 {
                return Err(MotifError::invalid_matrix(format!(
                    "column {} has no counts and no pseudocount",
                    c
                )));
            }
            column /= total;
        }

        Ok(ppm)
    }
}

/// Log-odds scoring matrix (PWM); immutable once built
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringMatrix {
    values: Array2<f64>,
}

impl ScoringMatrix {
    /// Builds a log2-odds matrix from counts: `log2(PPM[b][c] / background[b])`.
    ///
    /// Cells are finite whenever the PPM is positive everywhere, which holds
    /// for any positive pseudocount. Zero probabilities give `-inf`.
    ///
    /// # Errors
    /// Same as [`CountMatrix::probabilities`].
    pub fn from_counts(
        counts: &CountMatrix,
        background: &Background,
        pseudocount: f64,
    ) -> Result<Self> {
        let mut values = counts.probabilities(background, pseudocount)?;
        for (b, mut row) in values.rows_mut().into_iter().enumerate() {
            let expected = background.get(b);
            row.mapv_inplace(|p| (p / expected).log2());
        }
        Ok(ScoringMatrix { values })
    }

    /// Wraps a pre-computed 4 x W log-odds array.
    ///
    /// `-inf` cells are accepted (impossible bases); `NaN` and `+inf` are not.
    pub fn from_array(values: Array2<f64>) -> Result<Self> {
        if values.nrows() != ALPHABET_SIZE {
            return Err(MotifError::invalid_matrix(format!(
                "expected {} rows, got {}",
                ALPHABET_SIZE,
                values.nrows()
            )));
        }
        if values.ncols() == 0 {
            return Err(MotifError::invalid_matrix("motif width must be at least 1"));
        }
        if values.iter().any(|v| v.is_nan() || *v == f64::INFINITY) {
            return Err(MotifError::invalid_matrix(
                "scores must be finite or negative infinity",
            ));
        }
        if values
            .columns()
            .into_iter()
            .any(|column| column.iter().all(|v| *v == f64::NEG_INFINITY))
        {
            return Err(MotifError::invalid_matrix(
                "every column needs at least one finite score",
            ));
        }
        Ok(ScoringMatrix { values })
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn width(&self) -> usize {
        self.values.ncols()
    }

    #[inline]
    pub fn get(&self, base: usize, column: usize) -> f64 {
        self.values[[base, column]]
    }

    /// Best score of every column
    pub fn column_maxima(&self) -> Vec<f64> {
        self.values
            .columns()
            .into_iter()
            .map(|column| column.iter().copied().fold(f64::NEG_INFINITY, f64::max))
            .collect()
    }

    /// Sum of the per-column maxima
    pub fn max_score(&self) -> f64 {
        self.column_maxima().iter().sum()
    }

    /// Sum of the per-column minima
    pub fn min_score(&self) -> f64 {
        self.values
            .columns()
            .into_iter()
            .map(|column| column.iter().copied().fold(f64::INFINITY, f64::min))
            .sum()
    }

    /// Highest scoring base of each column; ties go to the earlier base (A < C < G < T)
    pub fn consensus(&self) -> String {
        self.values
            .columns()
            .into_iter()
            .map(|column| {
                let mut best = 0;
                for b in 1..ALPHABET_SIZE {
                    if column[b] > column[best] {
                        best = b;
                    }
                }
                BASES[best] as char
            })
            .collect()
    }

    /// Matrix scoring the opposite strand when read left to right.
    ///
    /// Reverses both axes: column order flips the orientation and row order
    /// maps A<->T and C<->G.
    pub fn complement(&self) -> ScoringMatrix {
        ScoringMatrix {
            values: self.values.slice(s![..;-1, ..;-1]).to_owned(),
        }
    }

    /// Recovers the probability matrix the scores were derived from
    pub fn probabilities(&self, background: &Background) -> Array2<f64> {
        let mut ppm = self.values.clone();
        for (b, mut row) in ppm.rows_mut().into_iter().enumerate() {
            let expected = background.get(b);
            row.mapv_inplace(|score| expected * score.exp2());
        }
        ppm
    }

    /// Information content matrix: `PPM * log2(PPM / background)`, in bits
    pub fn information_content(&self, background: &Background) -> Array2<f64> {
        let mut icm = self.probabilities(background);
        icm.zip_mut_with(&self.values, |p, &score| {
            *p = if *p > 0.0 { *p * score } else { 0.0 };
        });
        icm
    }

    /// Scores one window of exactly `width` bytes.
    ///
    /// Returns `None` on a length mismatch and `-inf` if the window holds any
    /// symbol outside {A, C, G, T}.
    pub fn score_window(&self, window: &[u8]) -> Option<f64> {
        if window.len() != self.width() {
            return None;
        }
        let mut score = 0.0;
        for (c, &base) in window.iter().enumerate() {
            match base_index(base) {
                Some(b) => score += self.values[[b, c]],
                None => return Some(f64::NEG_INFINITY),
            }
        }
        Some(score)
    }
}
