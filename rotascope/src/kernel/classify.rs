//! Majority-vote direction classification (C6 Step 6, §4.6, §9).
//!
//! Each adjacent pair of resampled points casts one vote in `{-1, 0, +1}`
//! via [`rotascope_common::direction::classify_step`]. The window's overall
//! direction is whichever of clockwise/anticlockwise/unclassifiable
//! collected the most votes; the documented tie-break (§9 Open Question 1)
//! favors the smaller signed value, so an exact `cw == ccw` tie resolves to
//! anticlockwise (`-1`) over clockwise (`+1`), and either tying with
//! unclassifiable resolves to `0`.

use rotascope_common::direction::classify_step;

/// Cast one vote per adjacent sample pair and return the majority verdict
/// (`-1`, `0`, or `+1`), tie-breaking toward the smaller value.
pub fn majority_vote(east: &[f64], up: &[f64]) -> i8 {
    let n = east.len();
    debug_assert_eq!(n, up.len());
    if n < 2 {
        return 0;
    }

    let mut cw = 0u32;
    let mut ccw = 0u32;
    let mut neither = 0u32;

    for i in 0..n - 1 {
        let vote = classify_step(east[i + 1] - east[i], up[i + 1] - up[i], east[i], up[i]);
        match vote {
            1 => cw += 1,
            -1 => ccw += 1,
            _ => neither += 1,
        }
    }

    let candidates = [(-1i8, ccw), (0i8, neither), (1i8, cw)];
    let max_votes = candidates.iter().map(|&(_, v)| v).max().unwrap_or(0);
    candidates
        .iter()
        .filter(|&&(_, v)| v == max_votes)
        .map(|&(value, _)| value)
        .min()
        .unwrap_or(0)
}
