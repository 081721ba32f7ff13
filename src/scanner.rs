//! Multi-motif, two-strand scanning of DNA sequences.
//!
//! A [`ScanEngine`] is built once from calibrated motifs and is read-only
//! afterwards, so a single engine can be shared by reference across threads
//! scanning different sequences.

use crate::config::ScanOptions;
use crate::error::{MotifError, Result};
use crate::matrix::{Background, ScoringMatrix};
use crate::motif::Motif;
use crate::sequence::Sequence;
use crate::types::{Hit, Strand, ALPHABET_SIZE, AMBIGUOUS, BASE_CODES};
use log::{debug, info, warn};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};

/// Float slack for the early-exit bound; pruning must never drop a real hit
const PRUNE_SLACK: f64 = 1e-9;

/// One motif on one strand, laid out column-major for the hot loop
#[derive(Debug, Clone)]
struct StrandMatrix {
    motif: usize,
    strand: Strand,
    columns: Vec<[f64; ALPHABET_SIZE]>,
    /// Best achievable score of columns `c..W`; `W + 1` entries ending in 0
    best_suffix: Vec<f64>,
    threshold: f64,
}

impl StrandMatrix {
    fn new(motif: usize, strand: Strand, matrix: &ScoringMatrix, threshold: f64) -> Self {
        let width = matrix.width();
        let columns: Vec<[f64; ALPHABET_SIZE]> = (0..width)
            .map(|c| std::array::from_fn(|b| matrix.get(b, c)))
            .collect();

        let maxima = matrix.column_maxima();
        let mut best_suffix = vec![0.0; width + 1];
        for c in (0..width).rev() {
            best_suffix[c] = best_suffix[c + 1] + maxima[c];
        }

        StrandMatrix {
            motif,
            strand,
            columns,
            best_suffix,
            threshold,
        }
    }

    fn width(&self) -> usize {
        self.columns.len()
    }

    /// Score of an encoded window, or `None` if it holds an ambiguous base or
    /// (with pruning) provably cannot reach the threshold.
    #[inline]
    fn score(&self, window: &[u8], prune: bool) -> Option<f64> {
        let mut score = 0.0;
        for (c, &code) in window.iter().enumerate() {
            if code == AMBIGUOUS {
                return None;
            }
            score += self.columns[c][code as usize];
            if prune && score + self.best_suffix[c + 1] + PRUNE_SLACK < self.threshold {
                return None;
            }
        }
        Some(score)
    }
}

/// Registered motifs ready to scan sequences on both strands
#[derive(Debug, Clone)]
pub struct ScanEngine {
    motifs: Vec<Motif>,
    matrices: Vec<StrandMatrix>,
    background: Background,
    options: ScanOptions,
}

impl ScanEngine {
    /// Registers calibrated motifs for scanning.
    ///
    /// Each motif contributes a forward and a reverse-complement matrix that
    /// share the motif's threshold. Motifs are scanned in the order given.
    ///
    /// # Example
    /// ```
    /// use tfbs_scan::config::MotifConfig;
    /// use tfbs_scan::matrix::{Background, CountMatrix};
    /// use tfbs_scan::motif::Motif;
    /// use tfbs_scan::scanner::ScanEngine;
    /// use tfbs_scan::sequence::Sequence;
    ///
    /// let pfm = CountMatrix::from_rows(&[
    ///     vec![9, 0, 0, 0, 9],
    ///     vec![0, 9, 0, 0, 0],
    ///     vec![0, 0, 9, 0, 0],
    ///     vec![0, 0, 0, 9, 0],
    /// ])
    /// .unwrap();
    /// let config = MotifConfig::default().with_pvalue(1e-3);
    /// let motif = Motif::from_counts("ACGTA", &pfm, &config).unwrap();
    /// let engine = ScanEngine::register(vec![motif], Background::uniform());
    ///
    /// let hits = engine.scan(&Sequence::new("chr1", "TTACGTATT").unwrap());
    /// assert_eq!(hits[0].start, 2);
    /// assert_eq!(hits[0].end, 7);
    /// ```
    pub fn register(motifs: Vec<Motif>, background: Background) -> Self {
        let mut matrices = Vec::with_capacity(motifs.len() * 2);
        for (i, motif) in motifs.iter().enumerate() {
            if motif.background() != &background {
                warn!(
                    "motif {} was calibrated against {:?}, engine background is {:?}",
                    motif.id(),
                    motif.background().frequencies(),
                    background.frequencies()
                );
            }
            debug!(
                "registering motif {} (width {}, threshold {:.3}, max score {:.3})",
                motif.id(),
                motif.width(),
                motif.threshold(),
                motif.max_score()
            );
            matrices.push(StrandMatrix::new(
                i,
                Strand::Forward,
                motif.matrix(),
                motif.threshold(),
            ));
            matrices.push(StrandMatrix::new(
                i,
                Strand::Reverse,
                motif.complement(),
                motif.threshold(),
            ));
        }

        info!("registered {} motifs for scanning", motifs.len());

        ScanEngine {
            motifs,
            matrices,
            background,
            options: ScanOptions::default(),
        }
    }

    /// Replaces the scan options; only available before the engine is shared
    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    pub fn motifs(&self) -> &[Motif] {
        &self.motifs
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.motifs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.motifs.is_empty()
    }

    /// Scans one sequence with every registered motif on both strands.
    ///
    /// Hits are grouped by motif (registration order), then strand (forward
    /// first), then ascending position. Windows containing anything other
    /// than uppercase A, C, G or T never produce hits.
    pub fn scan(&self, sequence: &Sequence) -> Vec<Hit> {
        self.scan_until(sequence, || false).unwrap_or_default()
    }

    /// Same as [`ScanEngine::scan`], polling `cancel` between windows.
    ///
    /// # Errors
    /// * `MotifError::Cancelled` once `cancel` is observed set
    pub fn scan_cancellable(&self, sequence: &Sequence, cancel: &AtomicBool) -> Result<Vec<Hit>> {
        self.scan_until(sequence, || cancel.load(Ordering::Relaxed))
            .ok_or_else(|| {
                warn!("scan of {} cancelled", sequence.name());
                MotifError::Cancelled
            })
    }

    /// Scans many sequences in parallel; results keep the input order
    pub fn scan_all(&self, sequences: &[Sequence]) -> Vec<Vec<Hit>> {
        sequences
            .par_iter()
            .map(|sequence| self.scan(sequence))
            .collect()
    }

    fn scan_until<F>(&self, sequence: &Sequence, should_stop: F) -> Option<Vec<Hit>>
    where
        F: Fn() -> bool,
    {
        let codes: Vec<u8> = sequence
            .as_bytes()
            .iter()
            .map(|&b| BASE_CODES[b as usize])
            .collect();
        let interval = self.options.cancel_check_interval.max(1);
        let mut windows = 0usize;
        let mut hits = Vec::new();

        for matrix in &self.matrices {
            let width = matrix.width();
            if codes.len() < width {
                continue;
            }

            let motif = &self.motifs[matrix.motif];
            for (position, window) in codes.windows(width).enumerate() {
                windows += 1;
                if windows % interval == 0 && should_stop() {
                    return None;
                }

                let Some(score) = matrix.score(window, self.options.prune) else {
                    continue;
                };
                if score >= matrix.threshold {
                    let start = sequence.start0() + position as u64;
                    hits.push(Hit {
                        sequence: sequence.name().to_string(),
                        start,
                        end: start + width as u64,
                        motif: motif.id().to_string(),
                        score,
                        strand: matrix.strand,
                    });
                }
            }
        }

        debug!(
            "scanned {} ({} bp): {} hits",
            sequence.name(),
            sequence.len(),
            hits.len()
        );

        Some(hits)
    }
}
