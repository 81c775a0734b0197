//! Fixed-size worker pool for fetch tasks
//!
//! Tasks are spawned onto the tokio runtime the pool was created in. A global
//! semaphore caps how many of them do work at once; the rest wait for a permit.
//! Every task ends by handing its outcome to a completion callback, which runs
//! on the same worker after the permit is released.

use futures::FutureExt;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::runtime::{Handle, TryCurrentError};
use tokio::sync::Semaphore;

/// A task that ended without producing its output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    pub message: String,
}

impl TaskFailure {
    fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "task panicked".to_string()
        };
        Self { message }
    }
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task failed: {}", self.message)
    }
}

/// Runs tasks with bounded concurrency and a completion callback each
#[derive(Debug)]
pub struct WorkerPool {
    /// Global semaphore for limiting concurrent tasks
    permits: Arc<Semaphore>,

    runtime: Handle,

    size: usize,
}

impl WorkerPool {
    /// Creates a pool of `size` workers on the current tokio runtime
    ///
    /// # Returns
    ///
    /// * `Ok(WorkerPool)` - Pool bound to the current runtime
    /// * `Err(TryCurrentError)` - Called outside a tokio runtime
    pub fn new(size: usize) -> Result<Self, TryCurrentError> {
        let size = size.max(1);
        Ok(Self {
            permits: Arc::new(Semaphore::new(size)),
            runtime: Handle::try_current()?,
            size,
        })
    }

    /// Number of workers
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of workers currently idle
    pub fn idle(&self) -> usize {
        self.permits.available_permits()
    }

    /// Submits a task; `done` receives its output once it has run
    ///
    /// A panic inside `work` is reported to `done` as a [`TaskFailure`], so
    /// every submitted task gets exactly one completion.
    pub fn submit<W, T, D>(&self, work: W, done: D)
    where
        W: Future<Output = T> + Send + 'static,
        T: Send + 'static,
        D: FnOnce(Result<T, TaskFailure>) + Send + 'static,
    {
        let permits = Arc::clone(&self.permits);

        self.runtime.spawn(async move {
            let outcome = match permits.acquire_owned().await {
                Ok(_permit) => AssertUnwindSafe(work)
                    .catch_unwind()
                    .await
                    .map_err(TaskFailure::from_panic),
                Err(_) => Err(TaskFailure {
                    message: "worker pool closed".to_string(),
                }),
            };
            done(outcome);
        });
    }
}
