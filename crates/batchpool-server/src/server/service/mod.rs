//! HTTP service over the shared worker pool.
//!
//! This module turns JSON requests into pool work and pool outcomes back into
//! JSON responses.
//!
//! ## Structure
//!
//! - [`handler`] - axum router, shared state and route handlers.
//! - [`types`] - request and response bodies.
//! - [`processor`] - per-chunk work functions run on the pool.
//! - [`error`] - mapping of pool errors onto HTTP responses.

pub mod error;
pub mod handler;
pub mod processor;
pub mod types;
