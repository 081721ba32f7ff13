#![allow(dead_code)]

use tfbs_scan::matrix::CountMatrix;

/// Six-column count matrix with consensus AAGAAA
pub fn test_pfm() -> CountMatrix {
    CountMatrix::from_rows(&[
        vec![6, 4, 0, 5, 5, 4],
        vec![0, 0, 2, 0, 0, 0],
        vec![0, 0, 3, 0, 0, 0],
        vec![0, 2, 1, 1, 1, 2],
    ])
    .unwrap()
}

/// Eight-column count matrix with consensus CACGTGAC
pub fn ebox_pfm() -> CountMatrix {
    CountMatrix::from_rows(&[
        vec![1, 18, 0, 0, 0, 1, 15, 2],
        vec![17, 0, 20, 0, 1, 0, 2, 16],
        vec![1, 1, 0, 20, 0, 19, 1, 1],
        vec![1, 1, 0, 0, 19, 0, 2, 1],
    ])
    .unwrap()
}

/// Deterministic pseudo-random DNA (64-bit LCG)
pub fn random_dna(length: usize, seed: u64) -> String {
    let mut state = seed;
    (0..length)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            b"ACGT"[(state >> 62) as usize] as char
        })
        .collect()
}
