mod common;

use std::sync::atomic::AtomicBool;
use tfbs_scan::config::{MotifConfig, ScanOptions};
use tfbs_scan::matrix::Background;
use tfbs_scan::motif::Motif;
use tfbs_scan::scanner::ScanEngine;
use tfbs_scan::sequence::{reverse_complement, Sequence};
use tfbs_scan::types::{Hit, Strand};
use tfbs_scan::MotifError;

fn test_motif(pvalue: f64) -> Motif {
    let config = MotifConfig::default().with_pvalue(pvalue);
    Motif::from_counts("test_pfm", &common::test_pfm(), &config).unwrap()
}

fn ebox_motif(pvalue: f64) -> Motif {
    let config = MotifConfig::default().with_pvalue(pvalue);
    Motif::from_counts("ebox", &common::ebox_pfm(), &config).unwrap()
}

/// Motif that accepts every unambiguous window
fn permissive_motif() -> Motif {
    let motif = test_motif(1e-3);
    Motif::with_threshold("any", motif.matrix().clone(), Background::uniform(), f64::NEG_INFINITY)
}

#[test]
fn test_self_match() {
    let motif = test_motif(1e-3);
    let max_score = motif.max_score();
    let engine = ScanEngine::register(vec![motif], Background::uniform());

    let hits = engine.scan(&Sequence::new("seq1", "CCCCAAGAAACCCC").unwrap());
    let hit = hits
        .iter()
        .find(|h| h.strand == Strand::Forward && h.start == 4)
        .expect("consensus should be reported");

    assert_eq!(hit.end, 10);
    assert_eq!(hit.sequence, "seq1");
    assert_eq!(hit.motif, "test_pfm");
    assert!((hit.score - max_score).abs() < 1e-9);
}

#[test]
fn test_near_consensus_window_reported() {
    // AATAAA scores just above the calibrated threshold at p = 1e-3
    let motif = test_motif(1e-3);
    let score = motif.matrix().score_window(b"AATAAA").unwrap();
    assert!(score >= motif.threshold());
    assert!(score < motif.max_score());

    let engine = ScanEngine::register(vec![motif], Background::uniform());
    let hits = engine.scan(&Sequence::new("near", "AATAAA").unwrap());
    assert!(hits
        .iter()
        .any(|h| h.strand == Strand::Forward && h.start == 0));
}

#[test]
fn test_strand_symmetry() {
    let motif = test_motif(1e-3);
    let engine = ScanEngine::register(vec![motif.clone()], Background::uniform());

    let forward = engine.scan(&Sequence::new("fwd", motif.consensus()).unwrap());
    let rc = reverse_complement(motif.consensus()).unwrap();
    let reverse = engine.scan(&Sequence::new("rev", rc).unwrap());

    let forward_hit = forward.iter().find(|h| h.strand == Strand::Forward).unwrap();
    let reverse_hit = reverse.iter().find(|h| h.strand == Strand::Reverse).unwrap();

    assert_eq!(reverse_hit.start, 0);
    assert_eq!(reverse_hit.end, 6);
    assert!((forward_hit.score - reverse_hit.score).abs() < 1e-9);
}

#[test]
fn test_short_sequence() {
    let engine = ScanEngine::register(vec![permissive_motif()], Background::uniform());
    assert!(engine.scan(&Sequence::new("short", "AAGAA").unwrap()).is_empty());
    assert!(engine.scan(&Sequence::new("empty", "").unwrap()).is_empty());

    let exact = engine.scan(&Sequence::new("exact", "AAGAAA").unwrap());
    assert_eq!(exact.len(), 2);
}

#[test]
fn test_ambiguous_windows_rejected() {
    let engine = ScanEngine::register(vec![permissive_motif()], Background::uniform());

    let hits = engine.scan(&Sequence::new("masked", "AAGNAAAGAAA").unwrap());
    let starts: Vec<(Strand, u64)> = hits.iter().map(|h| (h.strand, h.start)).collect();
    assert_eq!(
        starts,
        vec![
            (Strand::Forward, 4),
            (Strand::Forward, 5),
            (Strand::Reverse, 4),
            (Strand::Reverse, 5),
        ]
    );
    assert!(hits.iter().all(|h| h.start > 3));

    // soft-masked bases count as ambiguous
    assert!(engine.scan(&Sequence::new("lower", "aagaaa").unwrap()).is_empty());
    assert!(engine.scan(&Sequence::new("n", "NNNNNNNNNN").unwrap()).is_empty());
}

#[test]
fn test_pvalue_one_reports_every_window() {
    let config = MotifConfig::default().with_pvalue(1.0);
    let motif = Motif::from_counts("all", &common::test_pfm(), &config).unwrap();
    let engine = ScanEngine::register(vec![motif], Background::uniform());

    let sequence = common::random_dna(40, 7);
    let hits = engine.scan(&Sequence::new("random", sequence).unwrap());
    assert_eq!(hits.len(), 2 * (40 - 6 + 1));
}

#[test]
fn test_unreachable_threshold_reports_nothing() {
    let motif = test_motif(1e-9);
    assert!(motif.threshold() > motif.max_score());
    let engine = ScanEngine::register(vec![motif], Background::uniform());
    assert!(engine.scan(&Sequence::new("consensus", "AAGAAAAAGAAA").unwrap()).is_empty());
}

#[test]
fn test_genomic_coordinates() {
    let engine = ScanEngine::register(vec![test_motif(1e-3)], Background::uniform());
    let sequence = Sequence::with_start("chr2", "CCCCAAGAAACCCC", 1001).unwrap();
    let hits = engine.scan(&sequence);

    let hit = hits.iter().find(|h| h.strand == Strand::Forward).unwrap();
    assert_eq!(hit.start, 1004);
    assert_eq!(hit.end, 1010);
    assert_eq!(hit.one_based_start(), 1005);
    assert_eq!(hit.width(), 6);

    assert!(Sequence::with_start("chr2", "ACGT", 0).is_err());
}

#[test]
fn test_hit_order() {
    let engine = ScanEngine::register(
        vec![permissive_motif(), ebox_motif(1.0)],
        Background::uniform(),
    );
    let hits = engine.scan(&Sequence::new("random", common::random_dna(200, 11)).unwrap());

    let key = |h: &Hit| {
        let motif = if h.motif == "any" { 0 } else { 1 };
        let strand = if h.strand == Strand::Forward { 0 } else { 1 };
        (motif, strand, h.start)
    };
    let keys: Vec<_> = hits.iter().map(key).collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
    assert_eq!(hits.len(), 2 * (200 - 6 + 1) + 2 * (200 - 8 + 1));
}

#[test]
fn test_pruning_matches_naive_scan() {
    let motifs = vec![test_motif(1e-2), ebox_motif(1e-3)];
    let pruned = ScanEngine::register(motifs.clone(), Background::uniform());
    let naive = ScanEngine::register(motifs.clone(), Background::uniform())
        .with_options(ScanOptions::default().with_pruning(false));

    for seed in 0..5 {
        let mut data = common::random_dna(5000, seed);
        data.insert_str(1000, "CACGTGAC");
        data.insert_str(2500, "NNNN");
        let sequence = Sequence::new(format!("seq{}", seed), data.clone()).unwrap();

        let fast = pruned.scan(&sequence);
        assert_eq!(fast, naive.scan(&sequence));

        // brute force over every window with the public scoring matrices
        let bytes = data.as_bytes();
        let mut expected = 0;
        for motif in &motifs {
            for matrix in [motif.matrix(), motif.complement()] {
                expected += bytes
                    .windows(motif.width())
                    .filter(|w| matrix.score_window(w).unwrap() >= motif.threshold())
                    .count();
            }
        }
        assert_eq!(fast.len(), expected);
    }
}

#[test]
fn test_scan_all_keeps_input_order() {
    let motifs = vec![test_motif(1e-2), ebox_motif(1e-2)];
    let engine = ScanEngine::register(motifs, Background::uniform());
    let sequences: Vec<Sequence> = (0..16)
        .map(|i| Sequence::new(format!("seq{}", i), common::random_dna(1000, i)).unwrap())
        .collect();

    let parallel = engine.scan_all(&sequences);
    assert_eq!(parallel.len(), sequences.len());
    for (sequence, hits) in sequences.iter().zip(parallel.iter()) {
        assert_eq!(hits, &engine.scan(sequence));
        assert!(hits.iter().all(|h| h.sequence == sequence.name()));
    }
}

#[test]
fn test_cancellation() {
    let engine = ScanEngine::register(vec![test_motif(1e-2)], Background::uniform())
        .with_options(ScanOptions::default().with_cancel_check_interval(1));
    let sequence = Sequence::new("chr1", common::random_dna(2000, 3)).unwrap();

    let cancel = AtomicBool::new(true);
    let result = engine.scan_cancellable(&sequence, &cancel);
    assert!(matches!(result, Err(MotifError::Cancelled)));

    let cancel = AtomicBool::new(false);
    let hits = engine.scan_cancellable(&sequence, &cancel).unwrap();
    assert_eq!(hits, engine.scan(&sequence));
}

#[test]
fn test_engine_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ScanEngine>();

    let engine = ScanEngine::register(vec![test_motif(1e-2)], Background::uniform());
    assert_eq!(engine.len(), 1);
    assert!(!engine.is_empty());
    assert_eq!(engine.motifs()[0].id(), "test_pfm");

    let sequence = Sequence::new("shared", common::random_dna(500, 5)).unwrap();
    let expected = engine.scan(&sequence);
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4).map(|_| scope.spawn(|| engine.scan(&sequence))).collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}
