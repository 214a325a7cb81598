//! Bounded task execution.
//!
//! ## Structure
//!
//! - [`config`] - construction settings ([`PoolConfig`]).
//! - [`manager`] - the pool itself ([`WorkerPool`]).
//! - [`cell`] - initialize-once ownership ([`PoolCell`]).
//! - [`stats`] - occupancy snapshots ([`Statistics`]).
//! - `worker` - the dispatch loop admitting queued tasks.
//! - `request` - queue messages and per-task accounting.

pub mod cell;
pub mod config;
pub mod manager;
mod request;
pub mod stats;
mod worker;

#[cfg(test)]
mod tests;

pub use cell::PoolCell;
pub use config::PoolConfig;
pub use manager::WorkerPool;
pub use stats::Statistics;
