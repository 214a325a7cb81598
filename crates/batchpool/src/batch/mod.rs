//! Batch dispatch on top of the pool.
//!
//! - [`dispatcher`] - [`BatchDispatcher`] and its two aggregation policies.
//! - [`types`] - chunk and report types.

pub mod dispatcher;
pub mod types;

pub use dispatcher::BatchDispatcher;
pub use types::{BatchSummary, ChunkOutcome, DataChunk, SumReport};
