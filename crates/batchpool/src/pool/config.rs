use crate::{Error, Result};
use core::time::Duration;
use tokio::sync::Semaphore;

/// Construction-time settings for a [`WorkerPool`](crate::WorkerPool).
///
/// `capacity` is the steady-state concurrency ceiling: at most that many tasks
/// run at once. Submissions beyond it wait in a FIFO queue holding up to
/// `queue_capacity` tasks; once the queue is full further submissions are
/// rejected rather than blocking the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    pub capacity: usize,
    pub queue_capacity: usize,
    /// How long [`close`](crate::WorkerPool::close) waits for the dispatch
    /// loop to acknowledge shutdown before releasing capacity anyway.
    pub shutdown_timeout: Duration,
}

impl PoolConfig {
    pub const DEFAULT_CAPACITY: usize = 10;
    pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;
    pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

    pub const fn new(capacity: usize) -> Self {
        Self {
            capacity,
            queue_capacity: Self::DEFAULT_QUEUE_CAPACITY,
            shutdown_timeout: Self::DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    #[must_use]
    pub const fn with_shutdown_timeout(mut self, shutdown_timeout: Duration) -> Self {
        self.shutdown_timeout = shutdown_timeout;
        self
    }

    /// Checks that the pool can actually be built from these settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the capacity is zero or exceeds the
    /// semaphore limit, or if the queue capacity is zero.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::InvalidConfig {
                reason: "capacity must be greater than 0".to_string(),
            });
        }

        if self.capacity > Semaphore::MAX_PERMITS {
            return Err(Error::InvalidConfig {
                reason: format!(
                    "capacity {} exceeds maximum ({})",
                    self.capacity,
                    Semaphore::MAX_PERMITS
                ),
            });
        }

        if self.queue_capacity == 0 {
            return Err(Error::InvalidConfig {
                reason: "queue capacity must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
