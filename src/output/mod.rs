//! Output module for finished jobs
//!
//! This module shapes a job's word counts for the caller:
//! - Ignore-list and percentile filtering
//! - JSON rendering

mod filter;

pub use filter::{below_percentile, drop_ignored, percentile};

use crate::state::WordCounts;
use std::collections::BTreeMap;

/// Renders word counts as a pretty JSON object, keys in sorted order
pub fn render_json(words: &WordCounts) -> serde_json::Result<String> {
    let sorted: BTreeMap<&str, u64> = words.iter().map(|(w, c)| (w.as_str(), *c)).collect();
    serde_json::to_string_pretty(&sorted)
}
