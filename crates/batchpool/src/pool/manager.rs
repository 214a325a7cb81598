//! Bounded-concurrency task pool.
//!
//! This module defines the [`WorkerPool`] struct, which runs submitted
//! [`Task`]s on the current Tokio runtime while never executing more than
//! `capacity` of them at once. Submissions go through a bounded FIFO queue to a
//! single dispatch loop (see [`dispatch_loop`]) that admits tasks as execution
//! slots free up.
//!
//! The pool only schedules. A task's outcome is the task's business: the pool
//! logs it and moves on, never retrying or cancelling anything.
//!
//! Alongside the queue the pool tracks three live counters: tasks waiting for
//! a slot, tasks running, and tasks pending completion. The pending count
//! backs [`WorkerPool::await_all`].

use super::{
    config::PoolConfig,
    request::{Ticket, WorkRequest},
    stats::Statistics,
    worker::dispatch_loop,
};
use crate::{Error, Result, Task};
use core::time::Duration;
use portable_atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::{
    runtime::Handle,
    sync::{Semaphore, mpsc, mpsc::error::TrySendError, oneshot, watch},
    time::timeout,
};

/// Counters shared between the pool, its dispatch loop and in-flight tickets.
pub(crate) struct PoolState {
    pub(crate) capacity: usize,
    pub(crate) running: AtomicUsize,
    pub(crate) queued: AtomicUsize,
    /// Tasks submitted but not yet finished. Watched by `await_all`.
    pub(crate) pending: watch::Sender<usize>,
}

impl PoolState {
    fn new(capacity: usize) -> Self {
        let (pending, _) = watch::channel(0);
        Self {
            capacity,
            running: AtomicUsize::new(0),
            queued: AtomicUsize::new(0),
            pending,
        }
    }

    fn snapshot(&self) -> Statistics {
        Statistics::new(
            self.capacity,
            self.running.load(Ordering::Acquire),
            self.queued.load(Ordering::Acquire),
        )
    }
}

/// A fixed-capacity pool of concurrently executing tasks.
///
/// Safe to share across request handlers behind an [`Arc`]; every method takes
/// `&self`.
pub struct WorkerPool {
    state: Arc<PoolState>,
    queue: mpsc::Sender<WorkRequest>,
    slots: Arc<Semaphore>,
    closed: AtomicBool,
    shutdown_timeout: Duration,
}

impl WorkerPool {
    /// Builds a pool and spawns its dispatch loop on the current runtime.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidConfig`] if `config` fails validation.
    /// - [`Error::Runtime`] if called outside a Tokio runtime.
    pub fn new(config: PoolConfig) -> Result<Self> {
        config.validate()?;

        let runtime = Handle::try_current().map_err(|e| Error::Runtime {
            context: format!("worker pool requires a Tokio runtime: {e}"),
        })?;

        let (queue, rx) = mpsc::channel(config.queue_capacity);
        let slots = Arc::new(Semaphore::new(config.capacity));
        runtime.spawn(dispatch_loop(rx, Arc::clone(&slots)));

        #[cfg(feature = "tracing")]
        tracing::info!(
            "Worker pool started with capacity {} and queue capacity {}",
            config.capacity,
            config.queue_capacity
        );

        Ok(Self {
            state: Arc::new(PoolState::new(config.capacity)),
            queue,
            slots,
            closed: AtomicBool::new(false),
            shutdown_timeout: config.shutdown_timeout,
        })
    }

    pub fn capacity(&self) -> usize {
        self.state.capacity
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Enqueues `task` for execution.
    ///
    /// Never waits: the task is either accepted into the queue or handed back
    /// as an error, in which case it is dropped without running.
    ///
    /// # Errors
    ///
    /// - [`Error::PoolClosed`] if the pool has been closed.
    /// - [`Error::SubmissionRejected`] if the queue is full.
    pub fn submit<T: Task>(&self, task: T) -> Result<()> {
        self.submit_boxed(Box::new(task))
    }

    /// Like [`submit`](Self::submit) for an already boxed task.
    ///
    /// # Errors
    ///
    /// See [`submit`](Self::submit).
    pub fn submit_boxed(&self, task: Box<dyn Task>) -> Result<()> {
        if self.is_closed() {
            return Err(Error::PoolClosed);
        }

        // Counted before the enqueue attempt; a rejected request drops its
        // ticket, which takes the count back out.
        let ticket = Ticket::issue(&self.state);

        match self.queue.try_send(WorkRequest::Run { task, ticket }) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                #[cfg(feature = "tracing")]
                tracing::warn!("Rejecting task: submission queue is full");
                Err(Error::SubmissionRejected {
                    reason: format!(
                        "submission queue is full ({} tasks waiting)",
                        self.queue.max_capacity()
                    ),
                })
            }
            Err(TrySendError::Closed(_)) => Err(Error::PoolClosed),
        }
    }

    /// Enqueues `task`, waiting for queue space when the queue is full.
    ///
    /// The queue bound becomes backpressure on the caller instead of a
    /// rejection. The task is still counted as pending while the caller waits.
    ///
    /// # Errors
    ///
    /// [`Error::PoolClosed`] if the pool is closed before or while waiting.
    /// The task is dropped without running.
    pub async fn submit_wait<T: Task>(&self, task: T) -> Result<()> {
        self.submit_boxed_wait(Box::new(task)).await
    }

    /// Like [`submit_wait`](Self::submit_wait) for an already boxed task.
    ///
    /// # Errors
    ///
    /// See [`submit_wait`](Self::submit_wait).
    pub async fn submit_boxed_wait(&self, task: Box<dyn Task>) -> Result<()> {
        if self.is_closed() {
            return Err(Error::PoolClosed);
        }

        let ticket = Ticket::issue(&self.state);

        // Fails only once the dispatch loop has dropped its receiver.
        self.queue
            .send(WorkRequest::Run { task, ticket })
            .await
            .map_err(|_| Error::PoolClosed)
    }

    /// Waits until every task submitted so far has finished.
    ///
    /// Returns immediately when nothing is pending. The wait can be repeated
    /// for each drain cycle.
    pub async fn await_all(&self) {
        let mut pending = self.state.pending.subscribe();
        // `self` keeps the sender alive, so this cannot observe a closed
        // channel.
        let _ = pending.wait_for(|pending| *pending == 0).await;
    }

    /// Non-blocking occupancy snapshot.
    pub fn statistics(&self) -> Statistics {
        self.state.snapshot()
    }

    /// Closes the pool. Irreversible and idempotent.
    ///
    /// - Refuses new submissions.
    /// - Asks the dispatch loop to stop once the tasks ahead of the request
    ///   have been admitted, waiting up to the configured shutdown timeout.
    /// - Releases the pool's capacity; anything still waiting for a slot is
    ///   discarded. Tasks already running are left to finish.
    ///
    /// Does not wait for running tasks; call [`await_all`](Self::await_all)
    /// first to drain.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        #[cfg(feature = "tracing")]
        tracing::info!("Closing worker pool ({})", self.statistics());

        let (tx, rx) = oneshot::channel();
        let stopped = timeout(self.shutdown_timeout, async {
            self.queue
                .send(WorkRequest::Shutdown { response: tx })
                .await
                .ok()?;
            rx.await.ok()
        })
        .await;

        match stopped {
            Ok(Some(())) => {
                #[cfg(feature = "tracing")]
                tracing::debug!("Dispatch loop shutdown acknowledged");
            }
            Ok(None) => {
                #[cfg(feature = "tracing")]
                tracing::debug!("Dispatch loop had already stopped");
            }
            Err(_) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    "Dispatch loop shutdown timed out after {:?}",
                    self.shutdown_timeout
                );
            }
        }

        self.slots.close();
        #[cfg(feature = "tracing")]
        tracing::info!("Worker pool closed");
    }
}

impl core::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("statistics", &self.statistics())
            .field("closed", &self.is_closed())
            .finish()
    }
}
