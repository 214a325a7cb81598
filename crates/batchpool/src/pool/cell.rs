use super::{config::PoolConfig, manager::WorkerPool, stats::Statistics};
use crate::{Error, Result, Task};
use std::sync::{Arc, OnceLock};

/// Initialize-once home for the application's [`WorkerPool`].
///
/// Owned by the composition root and passed by reference to whoever needs the
/// pool. Until [`init`](Self::init) succeeds every accessor fails with
/// [`Error::NotInitialized`] and has no side effect.
#[derive(Debug, Default)]
pub struct PoolCell {
    pool: OnceLock<Arc<WorkerPool>>,
}

impl PoolCell {
    pub const fn new() -> Self {
        Self {
            pool: OnceLock::new(),
        }
    }

    /// Constructs the pool on first call; later calls return the existing
    /// pool and ignore `config`.
    ///
    /// # Errors
    ///
    /// Propagates [`WorkerPool::new`] failures. The cell stays empty, so a
    /// later call may retry with a different configuration.
    pub fn init(&self, config: PoolConfig) -> Result<Arc<WorkerPool>> {
        if let Some(pool) = self.pool.get() {
            #[cfg(feature = "tracing")]
            tracing::debug!("Worker pool already initialized, ignoring {config:?}");
            return Ok(Arc::clone(pool));
        }

        let pool = Arc::new(WorkerPool::new(config)?);

        // A racing initializer may have won; its pool is the one everyone
        // sees, and ours shuts its dispatch loop down when dropped here.
        Ok(Arc::clone(self.pool.get_or_init(|| pool)))
    }

    /// Returns the pool.
    ///
    /// # Errors
    ///
    /// [`Error::NotInitialized`] if [`init`](Self::init) has not succeeded.
    pub fn get(&self) -> Result<Arc<WorkerPool>> {
        self.pool.get().cloned().ok_or(Error::NotInitialized)
    }

    pub fn is_initialized(&self) -> bool {
        self.pool.get().is_some()
    }

    /// Submits `task` to the pool.
    ///
    /// # Errors
    ///
    /// [`Error::NotInitialized`] without running or counting the task, or any
    /// error from [`WorkerPool::submit`].
    pub fn submit<T: Task>(&self, task: T) -> Result<()> {
        self.pool
            .get()
            .ok_or(Error::NotInitialized)?
            .submit(task)
    }

    /// # Errors
    ///
    /// [`Error::NotInitialized`] if the pool has not been built.
    pub fn statistics(&self) -> Result<Statistics> {
        self.pool
            .get()
            .map(|pool| pool.statistics())
            .ok_or(Error::NotInitialized)
    }

    /// Application teardown: drains every outstanding task, then closes the
    /// pool. A no-op when the pool was never built.
    pub async fn close_pool(&self) {
        let Some(pool) = self.pool.get() else {
            #[cfg(feature = "tracing")]
            tracing::debug!("Worker pool never initialized, nothing to close");
            return;
        };

        #[cfg(feature = "tracing")]
        tracing::info!("Waiting for all tasks to finish ({})", pool.statistics());
        pool.await_all().await;
        pool.close().await;
    }
}
