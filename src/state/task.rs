//! Units of fetch work tracked per job

use std::fmt;

/// Handle the job store uses to track one outstanding task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub(crate) u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

/// What a task fetches for its batch of titles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Page extracts, merged into the job's word counts
    Words,

    /// Linked titles, discovered at the given crawl level (1 = seed's links)
    Links { level: u32 },
}

/// A registered unit of fetch work, ready to hand to the worker pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub kind: TaskKind,
    pub titles: Vec<String>,
}

/// How a link batch expands into follow-up tasks
#[derive(Debug, Clone, Copy)]
pub struct Expansion {
    /// Titles per follow-up task
    pub batch_size: usize,

    /// Level of the link tasks to schedule, `None` once the depth limit is reached
    pub next_level: Option<u32>,
}
