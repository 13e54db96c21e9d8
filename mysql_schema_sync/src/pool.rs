//! Bounded worker pool
//!
//! One pool is built by the dispatcher and shared by every parse and
//! diff/apply task in the run. Concurrency is capped at `workers`; pending
//! submissions are capped at `queue_capacity`, and a full queue rejects
//! the submission outright instead of buffering it.

use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::error::{Error, Result};

/// Worker pool sizing, constructed once and passed down
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get() / 2)
        .unwrap_or(1)
        .max(1)
}

fn default_queue_capacity() -> usize {
    20
}

/// Shared bounded task pool
pub struct WorkerPool {
    workers: Arc<Semaphore>,
    slots: Arc<Semaphore>,
}

impl WorkerPool {
    pub fn new(config: &PoolConfig) -> Self {
        let workers = config.workers.max(1);
        Self {
            workers: Arc::new(Semaphore::new(workers)),
            slots: Arc::new(Semaphore::new(workers + config.queue_capacity)),
        }
    }

    /// Submit a task to the pool.
    ///
    /// At most `workers` tasks run at once; up to `queue_capacity` more may
    /// be waiting. Beyond that the submission is rejected with
    /// [`Error::PoolSaturated`].
    pub fn submit<F, T>(&self, task: F) -> Result<JoinHandle<T>>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let slot = Arc::clone(&self.slots)
            .try_acquire_owned()
            .map_err(|_| Error::PoolSaturated)?;
        let workers = Arc::clone(&self.workers);

        Ok(tokio::spawn(async move {
            let _slot = slot;
            // neither semaphore is ever closed
            let _running = workers
                .acquire_owned()
                .await
                .expect("worker semaphore closed");
            task.await
        }))
    }
}
