//! Error types for the task pool and batch dispatcher.
//!
//! This module defines the central `Error` enum, which captures every
//! recoverable and reportable failure in the pool, the chunker and the
//! dispatcher. Errors are `Clone` so a single chunk failure can be both logged
//! by the pool and reported through a batch's result channel.
//!
//! ## Error Cases
//! - `NotInitialized`: the pool was used before it was constructed.
//! - `InvalidConfig`: the pool configuration was rejected at construction.
//! - `Runtime`: no Tokio runtime was available to host the pool.
//! - `SubmissionRejected`: the pool's queue refused a task.
//! - `PoolClosed`: a task was submitted after the pool was closed.
//! - `ChunkProcessing`: a chunk's work function failed.
//! - `ChannelError`: an internal result channel failed or a task vanished
//!   without reporting.
//! - `InvalidChunkSize`: a chunk size was zero or negative.
//! - `InvalidRequest`: a batch request was malformed or exceeded bounds.
//! - `BatchFailed`: at least one chunk of a batch failed.

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the pool and dispatcher.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// The pool has not been initialized.
    #[error("worker pool not initialized")]
    NotInitialized,

    /// The pool configuration is invalid.
    #[error("Invalid pool configuration: {reason}")]
    InvalidConfig { reason: String },

    /// No async runtime could host the pool.
    #[error("Runtime error: {context}")]
    Runtime { context: String },

    /// The pool refused to enqueue a task (e.g. its queue is saturated).
    #[error("Task submission rejected: {reason}")]
    SubmissionRejected { reason: String },

    /// The pool is closed and accepts no more work.
    #[error("Worker pool is closed")]
    PoolClosed,

    /// A chunk's work function reported a failure.
    #[error("Chunk {chunk} failed: {reason}")]
    ChunkProcessing { chunk: usize, reason: String },

    /// Internal channel send/receive failure.
    #[error("Channel error: {context}")]
    ChannelError { context: String },

    /// The requested chunk size cannot split anything.
    #[error("Invalid chunk size {size}: must be greater than 0")]
    InvalidChunkSize { size: i64 },

    /// The batch request was invalid or exceeded constraints.
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// One or more chunks of a batch failed; `source` is the first failure
    /// observed.
    #[error("{failed} of {total} chunks failed: {source}")]
    BatchFailed {
        failed: usize,
        total: usize,
        source: Box<Error>,
    },
}
