//! Shared worker pool for per-file loading.

use std::fmt;
use std::sync::Arc;

use crate::error::{SpectraError, SpectraResult};

/// Cloneable handle to a rayon thread pool.
///
/// Every clone shares the same threads. The threads exit once the last handle
/// is dropped, so whoever owns the pool (the table coordinator) must outlive the
/// sessions that borrow it.
#[derive(Clone)]
pub struct WorkerPool {
    inner: Arc<rayon::ThreadPool>,
}

impl WorkerPool {
    /// Build a pool with `threads` workers, or one per core when `None`.
    pub fn new(threads: Option<usize>) -> SpectraResult<Self> {
        let mut builder =
            rayon::ThreadPoolBuilder::new().thread_name(|i| format!("vp-loader-{i}"));
        if let Some(n) = threads {
            builder = builder.num_threads(n.max(1));
        }
        let pool = builder
            .build()
            .map_err(|e| SpectraError::Pool(e.to_string()))?;
        tracing::info!(threads = pool.current_num_threads(), "worker pool started");
        Ok(Self {
            inner: Arc::new(pool),
        })
    }

    pub fn threads(&self) -> usize {
        self.inner.current_num_threads()
    }

    /// Run `op` inside the pool; parallel iterators used by `op` run on its workers.
    pub fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        self.inner.install(op)
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("threads", &self.threads())
            .finish()
    }
}
