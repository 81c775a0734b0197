use crate::state::job_result::{JobKey, JobResult, WordCounts};
use crate::state::task::{Expansion, Task, TaskId, TaskKind};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

/// Per-job bookkeeping for every crawl, behind one lock
///
/// The store tracks, for each job:
/// - the tasks still outstanding
/// - the titles already discovered (crawl-wide, not per level)
/// - the accumulated word counts
/// - the terminal result, once produced
///
/// A job is live while it has a task set. Producing the result drops the task
/// set, links and counts, so completions arriving afterwards find nothing to
/// update and are ignored.
///
/// The lock is never held across an await point; network I/O and backoff
/// happen outside it.
#[derive(Debug, Default)]
pub struct JobStore {
    jobs: Mutex<Jobs>,

    /// Signalled whenever a job reaches a terminal result or is cleaned up
    changed: Notify,
}

#[derive(Debug, Default)]
struct Jobs {
    tasks: HashMap<JobKey, HashSet<TaskId>>,
    links: HashMap<JobKey, HashSet<String>>,
    words: HashMap<JobKey, WordCounts>,
    results: HashMap<JobKey, JobResult>,
    next_task: u64,
}

impl Jobs {
    fn register(&mut self, key: JobKey, kind: TaskKind, titles: Vec<String>) -> Option<Task> {
        let tasks = self.tasks.get_mut(&key)?;
        let id = TaskId(self.next_task);
        self.next_task += 1;
        tasks.insert(id);
        Some(Task { id, kind, titles })
    }

    /// Removes a finished task; false when the job is no longer live
    fn complete(&mut self, key: JobKey, task: TaskId) -> bool {
        match self.tasks.get_mut(&key) {
            Some(tasks) => {
                tasks.remove(&task);
                true
            }
            None => false,
        }
    }

    fn fail(&mut self, key: JobKey, error: String) -> bool {
        if self.results.contains_key(&key) {
            return false;
        }
        self.results.insert(key, JobResult::Failure { error });
        self.words.remove(&key);
        self.links.remove(&key);
        self.tasks.remove(&key);
        true
    }

    fn finish(&mut self, key: JobKey) -> bool {
        if self.results.contains_key(&key) {
            return false;
        }
        match self.tasks.get(&key) {
            Some(tasks) if tasks.is_empty() => {}
            _ => return false,
        }

        let words = self.words.remove(&key).unwrap_or_default();
        self.results.insert(key, JobResult::Success { words });
        self.links.remove(&key);
        self.tasks.remove(&key);
        true
    }
}

impl JobStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Jobs> {
        // Every mutation leaves the maps consistent, so a poisoned lock is still usable
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Initializes empty accumulators for a job
    ///
    /// The seed title counts as discovered, so links back to it are not fetched again.
    pub fn create(&self, key: JobKey, seed: &str) {
        let mut jobs = self.lock();
        jobs.tasks.insert(key, HashSet::new());
        jobs.links.insert(key, HashSet::from([seed.to_string()]));
        jobs.words.insert(key, WordCounts::new());
    }

    /// Registers a new outstanding task for a live job
    ///
    /// Returns `None` if the job already has a result or was cleaned up.
    pub fn register(&self, key: JobKey, kind: TaskKind, titles: Vec<String>) -> Option<Task> {
        self.lock().register(key, kind, titles)
    }

    /// Adds a batch of word counts and retires the task that produced them
    pub fn record_word_batch(&self, key: JobKey, task: TaskId, counts: WordCounts) {
        let mut jobs = self.lock();
        if !jobs.complete(key, task) {
            return;
        }

        if let Some(total) = jobs.words.get_mut(&key) {
            for (word, count) in counts {
                *total.entry(word).or_insert(0) += count;
            }
        }

        let finished = jobs.finish(key);
        drop(jobs);
        if finished {
            self.changed.notify_waiters();
        }
    }

    /// Merges newly fetched links and retires the task that produced them
    ///
    /// Titles not seen before by this job are split into batches; each batch
    /// gets a word task and, if `expansion.next_level` is set, a link task.
    /// The follow-up tasks are registered before the finishing task is
    /// retired, so the job cannot be observed as done in between.
    ///
    /// # Returns
    ///
    /// The registered follow-up tasks, for the caller to dispatch. Empty if
    /// the job is no longer live or nothing new was discovered.
    pub fn record_link_batch<I>(
        &self,
        key: JobKey,
        task: TaskId,
        links: I,
        expansion: Expansion,
    ) -> Vec<Task>
    where
        I: IntoIterator<Item = String>,
    {
        let mut jobs = self.lock();
        if !jobs.complete(key, task) {
            return Vec::new();
        }

        let fresh: Vec<String> = match jobs.links.get_mut(&key) {
            Some(seen) => links
                .into_iter()
                .filter(|link| seen.insert(link.clone()))
                .collect(),
            None => Vec::new(),
        };

        let mut planned = Vec::new();
        for batch in fresh.chunks(expansion.batch_size.max(1)) {
            planned.extend(jobs.register(key, TaskKind::Words, batch.to_vec()));
            if let Some(level) = expansion.next_level {
                planned.extend(jobs.register(key, TaskKind::Links { level }, batch.to_vec()));
            }
        }

        let finished = jobs.finish(key);
        drop(jobs);
        if finished {
            self.changed.notify_waiters();
        }

        planned
    }

    /// Fails the job, unless it already has a result (first error wins)
    pub fn record_error(&self, key: JobKey, task: TaskId, error: String) {
        let mut jobs = self.lock();
        if !jobs.complete(key, task) {
            return;
        }

        let failed = jobs.fail(key, error);
        drop(jobs);
        if failed {
            self.changed.notify_waiters();
        }
    }

    /// Returns the terminal result, or `None` while the job is still running
    pub fn query(&self, key: JobKey) -> Option<JobResult> {
        self.lock().results.get(&key).cloned()
    }

    /// Waits until the job has a terminal result
    ///
    /// Resolves to `None` if the job is unknown or gets cleaned up first.
    pub async fn wait(&self, key: JobKey) -> Option<JobResult> {
        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let jobs = self.lock();
                if let Some(result) = jobs.results.get(&key) {
                    return Some(result.clone());
                }
                if !jobs.tasks.contains_key(&key) {
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Discards everything held for the job; safe to repeat
    pub fn cleanup(&self, key: JobKey) {
        {
            let mut jobs = self.lock();
            jobs.results.remove(&key);
            jobs.words.remove(&key);
            jobs.links.remove(&key);
            jobs.tasks.remove(&key);
        }
        self.changed.notify_waiters();
    }

    /// Returns true while any per-job mapping still holds the key
    pub fn is_tracked(&self, key: JobKey) -> bool {
        let jobs = self.lock();
        jobs.tasks.contains_key(&key)
            || jobs.links.contains_key(&key)
            || jobs.words.contains_key(&key)
            || jobs.results.contains_key(&key)
    }

    /// Number of tasks still outstanding for the job
    pub fn outstanding(&self, key: JobKey) -> usize {
        self.lock().tasks.get(&key).map_or(0, HashSet::len)
    }
}
