//! Rayon thread pool configuration for batch runs.
//!
//! Use [WorkerPool::build] to get a pool with a fixed number of threads, or rely on Rayon's
//! default (all CPU cores).

use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};

/// How many worker threads compute trials in parallel mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerPool {
    /// Number of worker threads. If 0, use Rayon default (num_cpus).
    pub workers: usize,
}

impl WorkerPool {
    /// Use exactly `n` worker threads.
    pub fn with_workers(n: usize) -> Self {
        Self { workers: n }
    }

    /// Build the pool this configuration asks for. `None` means the global Rayon pool
    /// ([workers](WorkerPool::workers) is 0). Build once and reuse it for every chunk of a batch.
    pub fn build(&self) -> Result<Option<ThreadPool>, ThreadPoolBuildError> {
        if self.workers == 0 {
            return Ok(None);
        }
        ThreadPoolBuilder::new().num_threads(self.workers).build().map(Some)
    }
}
