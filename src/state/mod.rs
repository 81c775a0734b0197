//! State module for tracking crawl jobs
//!
//! This module provides the per-job bookkeeping shared by all in-flight fetch tasks.
//!
//! # Components
//!
//! - `JobStore`: Outstanding tasks, discovered links, word counts and results for every job
//! - `JobKey` / `JobResult`: Job identity and its terminal value
//! - `Task`: A registered unit of fetch work

mod job_result;
mod job_state;
mod task;

// Re-export main types
pub use job_result::{JobKey, JobResult, WordCounts};
pub use job_state::JobStore;
pub use task::{Expansion, Task, TaskId, TaskKind};
