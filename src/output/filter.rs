//! Post-processing of finished word counts
//!
//! This module applies the caller-side filters to a job's words:
//! - Dropping an ignore list
//! - Keeping only words below a count percentile

use crate::state::WordCounts;

/// Removes every ignored word; words not present are skipped
pub fn drop_ignored<S: AsRef<str>>(words: &mut WordCounts, ignore: &[S]) {
    for word in ignore {
        words.remove(word.as_ref());
    }
}

/// Computes the `p`-th percentile of `values` (0..=100)
///
/// Uses linear interpolation between the two nearest ranks. Returns `None` for
/// an empty slice.
///
/// # Example
///
/// ```
/// use word_ripple::output::percentile;
///
/// assert_eq!(percentile(&[1, 2, 3, 4], 50.0), Some(2.5));
/// ```
pub fn percentile(values: &[u64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable();

    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let low = sorted[lower] as f64;
    let high = sorted[upper] as f64;

    Some(low + (high - low) * (rank - lower as f64))
}

/// Keeps only the words whose count is strictly below the `p`-th percentile
pub fn below_percentile(words: WordCounts, p: f64) -> WordCounts {
    let counts: Vec<u64> = words.values().copied().collect();
    let Some(threshold) = percentile(&counts, p) else {
        return words;
    };

    words
        .into_iter()
        .filter(|(_, count)| (*count as f64) < threshold)
        .collect()
}
