//! Exact p-value calibrated transcription factor binding site scanning in Rust

pub mod config;
pub mod error;
pub mod matrix;
pub mod motif;
pub mod scanner;
pub mod sequence;
pub mod table;
pub mod threshold;
pub mod types;

pub use error::{MotifError, Result};
pub use matrix::{Background, CountMatrix, ScoringMatrix};
pub use motif::Motif;
pub use scanner::ScanEngine;
pub use sequence::Sequence;
pub use types::{Hit, Strand};
