//! Fan-out/fan-in of chunked batches over a [`WorkerPool`].
//!
//! Each batch gets its own result channel sized to its chunk count, so
//! concurrent batches on one pool never see each other's outcomes. Every chunk
//! puts exactly one [`ChunkOutcome`] on that channel:
//!
//! - the chunk's task sends it after the work function returns, or
//! - the dispatcher sends a rejection outcome itself when the pool refuses
//!   the task.
//!
//! Chunks are enqueued with [`WorkerPool::submit_wait`], so a batch larger than
//! the pool's queue waits for room instead of being rejected. Only a closed
//! pool refuses a chunk.
//!
//! Receiving exactly `len(chunks)` outcomes is therefore the only completion
//! barrier. Outcomes arrive in completion order, not submission order. No
//! chunk is retried, and one failure never cancels or short-circuits the
//! others.

use super::types::{BatchSummary, ChunkOutcome, DataChunk, SumReport};
use crate::{Error, Result, WorkerPool, task_fn};
use core::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Splits batches into pool tasks and aggregates their outcomes.
#[derive(Clone, Debug)]
pub struct BatchDispatcher {
    pool: Arc<WorkerPool>,
}

impl BatchDispatcher {
    pub const fn new(pool: Arc<WorkerPool>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    /// Runs `process` on every chunk and fails the batch if any chunk fails.
    ///
    /// # Errors
    ///
    /// [`Error::BatchFailed`] carrying the number of failed chunks and the
    /// first failure to arrive, once every chunk has finished. Submission
    /// rejections count as chunk failures.
    pub async fn collect_errors<F, Fut>(
        &self,
        chunks: Vec<DataChunk>,
        process: F,
    ) -> Result<BatchSummary>
    where
        F: Fn(DataChunk) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let outcomes = self
            .fan_out(chunks, move |_index, chunk| process(chunk))
            .await;
        let total = outcomes.len();

        let mut failed = 0;
        let mut first_error = None;
        for outcome in outcomes {
            if let Err(e) = outcome.result {
                failed += 1;
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(source) => {
                #[cfg(feature = "tracing")]
                tracing::warn!("{failed} of {total} chunks failed, first: {source}");
                Err(Error::BatchFailed {
                    failed,
                    total,
                    source: Box::new(source),
                })
            }
            None => Ok(BatchSummary { chunks: total }),
        }
    }

    /// Runs `process` on every chunk and sums the values it returns.
    ///
    /// Failed chunks contribute nothing to the sum but set the report's error,
    /// which ends up holding the last failure to arrive. A chunk whose value
    /// would overflow the total is left out and counted as failed.
    pub async fn accumulate_sum<F, Fut>(&self, chunks: Vec<Vec<i64>>, process: F) -> SumReport
    where
        F: Fn(usize, Vec<i64>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<i64>> + Send + 'static,
    {
        let outcomes = self.fan_out(chunks, process).await;

        let mut report = SumReport {
            chunks: outcomes.len(),
            ..SumReport::default()
        };
        for outcome in outcomes {
            match outcome.result {
                Ok(value) => match report.sum.checked_add(value) {
                    Some(sum) => report.sum = sum,
                    None => {
                        report.failed += 1;
                        report.error = Some(Error::ChunkProcessing {
                            chunk: outcome.index,
                            reason: "batch sum overflowed".to_string(),
                        });
                    }
                },
                Err(e) => {
                    report.failed += 1;
                    report.error = Some(e);
                }
            }
        }

        #[cfg(feature = "tracing")]
        if let Some(e) = &report.error {
            tracing::warn!(
                "{} of {} chunks failed, last: {e}",
                report.failed,
                report.chunks
            );
        }
        report
    }

    /// Submits one task per input and gathers exactly one outcome per input.
    async fn fan_out<I, R, F, Fut>(&self, inputs: Vec<I>, process: F) -> Vec<ChunkOutcome<R>>
    where
        I: Send + 'static,
        R: Send + 'static,
        F: Fn(usize, I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R>> + Send + 'static,
    {
        let total = inputs.len();
        if total == 0 {
            return Vec::new();
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("Dispatching {total} chunks ({})", self.pool.statistics());

        let (results_tx, mut results_rx) = mpsc::channel(total);
        let process = Arc::new(process);

        for (index, input) in inputs.into_iter().enumerate() {
            let task_tx = results_tx.clone();
            let process = Arc::clone(&process);

            let task = task_fn(move || async move {
                let result = process(index, input).await;
                let status = match &result {
                    Ok(_) => Ok(()),
                    Err(e) => Err(e.clone()),
                };
                // One slot per chunk, so this never waits.
                if task_tx.send(ChunkOutcome { index, result }).await.is_err() {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("Batch for chunk {index} no longer listening");
                }
                status
            });

            if let Err(e) = self.pool.submit_wait(task).await {
                #[cfg(feature = "tracing")]
                tracing::warn!("Error submitting chunk {index} to worker pool: {e}");
                // The rejected task was dropped unsent, so its slot is free.
                if results_tx
                    .try_send(ChunkOutcome {
                        index,
                        result: Err(e),
                    })
                    .is_err()
                {
                    #[cfg(feature = "tracing")]
                    tracing::error!("Failed to record rejection for chunk {index}");
                }
            }
        }
        // Only task-held senders remain; if they all vanish the channel closes.
        drop(results_tx);

        let mut outcomes = Vec::with_capacity(total);
        let mut reported = vec![false; total];
        while outcomes.len() < total {
            let Some(outcome) = results_rx.recv().await else {
                break;
            };
            reported[outcome.index] = true;
            outcomes.push(outcome);
        }

        // A task dropped without reporting (panicked, or discarded by a
        // closing pool) still owes the batch an outcome.
        for (index, _) in reported.iter().enumerate().filter(|(_, seen)| !**seen) {
            #[cfg(feature = "tracing")]
            tracing::warn!("Chunk {index} finished without reporting an outcome");
            outcomes.push(ChunkOutcome {
                index,
                result: Err(Error::ChannelError {
                    context: format!("chunk {index} finished without reporting an outcome"),
                }),
            });
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("Batch of {total} chunks complete ({})", self.pool.statistics());
        outcomes
    }
}
