use crate::error::{MotifError, Result};
use crate::matrix::Background;

/// Pseudocount mass spread over each column according to the background
pub const DEFAULT_PSEUDOCOUNT: f64 = 0.8;

/// Default significance cutoff for calibrated thresholds
pub const DEFAULT_PVALUE: f64 = 1e-4;

/// Width of one score bucket in the exact score distribution.
///
/// A power of two, so bucket indices convert back to scores without rounding.
pub const DEFAULT_RESOLUTION: f64 = 1.0 / 128.0;

/// Windows scanned between two polls of a cancellation flag
pub const DEFAULT_CANCEL_CHECK_INTERVAL: usize = 4096;

/// Parameters used to turn a count matrix into a calibrated motif.
///
/// # Examples
///
/// ```rust
/// use tfbs_scan::config::MotifConfig;
///
/// let config = MotifConfig::default().with_pvalue(1e-3).with_pseudocount(1.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MotifConfig {
    /// Null-model base frequencies, A, C, G, T order.
    pub background: Background,

    /// Smoothing mass added to each column, split according to `background`.
    pub pseudocount: f64,

    /// Target probability of a background window scoring at or above threshold.
    pub pvalue: f64,

    /// Score bucket width used by the exact threshold calibration.
    pub resolution: f64,
}

impl Default for MotifConfig {
    fn default() -> Self {
        Self {
            background: Background::uniform(),
            pseudocount: DEFAULT_PSEUDOCOUNT,
            pvalue: DEFAULT_PVALUE,
            resolution: DEFAULT_RESOLUTION,
        }
    }
}

impl MotifConfig {
    pub fn with_background(mut self, background: Background) -> Self {
        self.background = background;
        self
    }

    pub fn with_pseudocount(mut self, pseudocount: f64) -> Self {
        self.pseudocount = pseudocount;
        self
    }

    pub fn with_pvalue(mut self, pvalue: f64) -> Self {
        self.pvalue = pvalue;
        self
    }

    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    /// Check every scalar parameter. The background is validated on construction.
    pub fn validate(&self) -> Result<()> {
        validate_pseudocount(self.pseudocount)?;
        validate_pvalue(self.pvalue)?;
        validate_resolution(self.resolution)
    }
}

/// Options that change how the scan engine walks a sequence, never what it reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// Abandon a window once the best possible remaining columns cannot reach threshold.
    pub prune: bool,

    /// Number of windows between two polls of the cancellation flag.
    pub cancel_check_interval: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            prune: true,
            cancel_check_interval: DEFAULT_CANCEL_CHECK_INTERVAL,
        }
    }
}

impl ScanOptions {
    pub fn with_pruning(mut self, prune: bool) -> Self {
        self.prune = prune;
        self
    }

    pub fn with_cancel_check_interval(mut self, interval: usize) -> Self {
        self.cancel_check_interval = interval.max(1);
        self
    }
}

pub(crate) fn validate_pseudocount(pseudocount: f64) -> Result<()> {
    if !pseudocount.is_finite() || pseudocount < 0.0 {
        return Err(MotifError::invalid_parameter(
            "pseudocount",
            pseudocount,
            "must be a finite number >= 0",
        ));
    }
    Ok(())
}

pub(crate) fn validate_pvalue(pvalue: f64) -> Result<()> {
    if pvalue.is_nan() || pvalue <= 0.0 || pvalue > 1.0 {
        return Err(MotifError::invalid_parameter(
            "pvalue",
            pvalue,
            "must be in (0, 1]",
        ));
    }
    Ok(())
}

pub(crate) fn validate_resolution(resolution: f64) -> Result<()> {
    if !resolution.is_finite() || resolution <= 0.0 {
        return Err(MotifError::invalid_parameter(
            "resolution",
            resolution,
            "must be a finite number > 0",
        ));
    }
    Ok(())
}
