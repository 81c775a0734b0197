//! Job identity and terminal result definitions
//!
//! This module defines how jobs are keyed and what a finished job reports.

use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Word counts accumulated for a job (insertion order is irrelevant)
pub type WordCounts = HashMap<String, u64>;

/// Opaque identifier of one crawl-and-aggregate job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobKey(Uuid);

impl JobKey {
    /// Creates a fresh random key
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobKey {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Terminal value produced exactly once per job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobResult {
    /// Every task finished without error
    Success { words: WordCounts },

    /// The first error recorded for the job
    Failure { error: String },
}

impl JobResult {
    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns the word counts of a successful job
    pub fn words(&self) -> Option<&WordCounts> {
        match self {
            Self::Success { words } => Some(words),
            Self::Failure { .. } => None,
        }
    }

    /// Returns the error message of a failed job
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error } => Some(error),
        }
    }

    /// Converts into the word counts, or the error message on failure
    pub fn into_words(self) -> Result<WordCounts, String> {
        match self {
            Self::Success { words } => Ok(words),
            Self::Failure { error } => Err(error),
        }
    }
}
