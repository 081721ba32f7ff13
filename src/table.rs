use crate::error::Result;
use crate::types::Hit;
use polars::prelude::*;

/// Converts scan hits into a Polars DataFrame.
///
/// # Arguments
/// * `hits` - Hits in the order returned by the scan engine
///
/// # Returns
/// * `Result<DataFrame>` - One row per hit with columns:
///   - "sequence": Name of the scanned sequence
///   - "start", "end": 0-based half-open contig coordinates
///   - "motif": Motif identifier
///   - "score": Log-odds score of the window
///   - "strand": "+" or "-"
///
/// # Errors
/// * Returns `MotifError::DataError` if DataFrame creation fails
pub fn hits_to_dataframe(hits: &[Hit]) -> Result<DataFrame> {
    let sequences: Vec<&str> = hits.iter().map(|h| h.sequence.as_str()).collect();
    let starts: Vec<u64> = hits.iter().map(|h| h.start).collect();
    let ends: Vec<u64> = hits.iter().map(|h| h.end).collect();
    let motifs: Vec<&str> = hits.iter().map(|h| h.motif.as_str()).collect();
    let scores: Vec<f64> = hits.iter().map(|h| h.score).collect();
    let strands: Vec<String> = hits.iter().map(|h| h.strand.to_string()).collect();

    let df = DataFrame::new(vec![
        Column::new("sequence".into(), sequences),
        Column::new("start".into(), starts),
        Column::new("end".into(), ends),
        Column::new("motif".into(), motifs),
        Column::new("score".into(), scores),
        Column::new("strand".into(), strands),
    ])?;

    Ok(df)
}

/// Summarises a hit table per motif and strand.
///
/// # Arguments
/// * `df` - DataFrame produced by [`hits_to_dataframe`]
///
/// # Returns
/// * `Result<DataFrame>` - Columns "motif", "strand", "hits" (row count) and
///   "best_score", in order of first appearance
///
/// # Errors
/// * Returns `MotifError::DataError` if required columns are missing
pub fn hit_summary(df: &DataFrame) -> Result<DataFrame> {
    let summary = df
        .clone()
        .lazy()
        .group_by_stable([col("motif"), col("strand")])
        .agg([
            len().alias("hits"),
            col("score").max().alias("best_score"),
        ])
        .collect()?;

    Ok(summary)
}
