//! Crawler coordinator - job orchestration logic
//!
//! This module turns a job request into fetch tasks and folds their results back:
//! - Submitting the seed word and link tasks for a new job
//! - Merging word batches into the job's counts
//! - Expanding link batches into follow-up tasks, one level deeper each time
//! - Collapsing fetch failures into the job's single error

use crate::config::{Config, EngineConfig};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::pool::{TaskFailure, WorkerPool};
use crate::state::{Expansion, JobKey, JobResult, JobStore, Task, TaskId, TaskKind, WordCounts};
use crate::{FetchResult, RippleError, UNKNOWN_ERROR};
use std::sync::Arc;

/// Main crawl coordinator structure
///
/// Cheap to clone; clones share the same jobs, client and worker pool.
///
/// # Lifecycle of a job
///
/// 1. `submit` registers the seed tasks and returns the job's key
/// 2. Task completions merge into the [`JobStore`] and may spawn more tasks
/// 3. The job becomes terminal when no tasks remain or the first error is recorded
/// 4. The caller observes the result with `query` or `wait`, then calls `cleanup`
///
/// Tasks already dispatched when a job fails still run to completion; their
/// results are dropped by the store. The crawl as a whole has no deadline, only
/// each request has a timeout.
#[derive(Clone)]
pub struct Coordinator {
    shared: Arc<Shared>,
}

struct Shared {
    store: JobStore,
    fetcher: Fetcher,
    pool: WorkerPool,
    batch_size: usize,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// Must be called from within a tokio runtime; tasks are spawned onto it.
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(RippleError)` - HTTP client could not be built, or no runtime is running
    pub fn new(config: &Config) -> Result<Self, RippleError> {
        let fetcher = Fetcher::new(&config.api)?;
        Self::with_fetcher(&config.engine, fetcher)
    }

    /// Creates a coordinator around an existing fetcher
    pub fn with_fetcher(config: &EngineConfig, fetcher: Fetcher) -> Result<Self, RippleError> {
        let pool = WorkerPool::new(config.workers as usize)?;
        tracing::debug!("Worker pool ready with {} workers", pool.size());

        Ok(Self {
            shared: Arc::new(Shared {
                store: JobStore::new(),
                fetcher,
                pool,
                batch_size: (config.batch_size as usize).max(1),
            }),
        })
    }

    /// Starts counting the words of `article` and of everything within `depth` link hops
    ///
    /// Every call starts an independent crawl, even for the same article.
    pub fn submit(&self, article: &str, depth: u32) -> JobKey {
        let key = JobKey::new();
        let store = &self.shared.store;
        store.create(key, article);

        let seed = vec![article.to_string()];
        let mut tasks = Vec::with_capacity(2);
        tasks.extend(store.register(key, TaskKind::Words, seed.clone()));
        if depth > 0 {
            tasks.extend(store.register(key, TaskKind::Links { level: 1 }, seed));
        }

        tracing::info!("Job {} started for '{}' (depth {})", key, article, depth);
        for task in tasks {
            self.shared.dispatch(key, depth, task);
        }

        key
    }

    /// Returns the job's terminal result without blocking
    pub fn query(&self, key: JobKey) -> Option<JobResult> {
        self.shared.store.query(key)
    }

    /// Waits for the job's terminal result
    ///
    /// Resolves to `None` for unknown or cleaned-up jobs.
    pub async fn wait(&self, key: JobKey) -> Option<JobResult> {
        self.shared.store.wait(key).await
    }

    /// Forgets the job entirely; safe to call more than once
    pub fn cleanup(&self, key: JobKey) {
        self.shared.store.cleanup(key);
    }

    /// Returns true while the engine holds any state for the job
    pub fn is_tracked(&self, key: JobKey) -> bool {
        self.shared.store.is_tracked(key)
    }
}

impl Shared {
    fn dispatch(self: &Arc<Self>, key: JobKey, max_depth: u32, task: Task) {
        let Task { id, kind, titles } = task;
        let fetcher = self.fetcher.clone();
        let owner = Arc::clone(self);

        match kind {
            TaskKind::Words => self.pool.submit(
                async move { fetcher.fetch_words(&titles).await },
                move |outcome| owner.merge_words(key, id, outcome),
            ),
            TaskKind::Links { level } => self.pool.submit(
                async move { fetcher.fetch_links(&titles).await },
                move |outcome| owner.merge_links(key, id, level, max_depth, outcome),
            ),
        }
    }

    fn merge_words(
        &self,
        key: JobKey,
        task: TaskId,
        outcome: Result<FetchResult<WordCounts>, TaskFailure>,
    ) {
        tracing::debug!("Merge words for {} ({})", key, task);
        match settle(outcome) {
            Ok(words) => self.store.record_word_batch(key, task, words),
            Err(error) => self.store.record_error(key, task, error),
        }
    }

    fn merge_links(
        self: &Arc<Self>,
        key: JobKey,
        task: TaskId,
        level: u32,
        max_depth: u32,
        outcome: Result<FetchResult<Vec<String>>, TaskFailure>,
    ) {
        tracing::debug!("Merge links for {} ({}, level {})", key, task, level);
        let links = match settle(outcome) {
            Ok(links) => links,
            Err(error) => return self.store.record_error(key, task, error),
        };

        let expansion = Expansion {
            batch_size: self.batch_size,
            next_level: (level < max_depth).then_some(level + 1),
        };
        let planned = self.store.record_link_batch(key, task, links, expansion);
        if !planned.is_empty() {
            tracing::debug!("Job {} spawning {} tasks from level {}", key, planned.len(), level);
        }

        for next in planned {
            self.dispatch(key, max_depth, next);
        }
    }
}

/// Reduces a task outcome to its value or the message its job should fail with
fn settle<T>(outcome: Result<FetchResult<T>, TaskFailure>) -> Result<T, String> {
    match outcome {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(e.job_message()),
        Err(failure) => {
            tracing::error!("Task failed: {}", failure);
            Err(UNKNOWN_ERROR.to_string())
        }
    }
}
