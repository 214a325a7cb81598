//! HTTP routes over the shared worker pool.
//!
//! ## Routes
//!
//! - `POST /api/single-task` - fire-and-forget demo task.
//! - `POST /api/pre-batch-process` - grouped batch, fails if any chunk fails.
//! - `POST /api/post-batch-process` - flat batch, sums every chunk.
//! - `GET /api/get-workerpool-stats` - pool occupancy snapshot.
//! - `GET /health` - `200` while serving, `503` once shutdown has begun.
//!
//! Every batch request is validated before any chunk is submitted. The
//! request's `concurrency` field is logged but the pool capacity is the only
//! concurrency limit.

use super::{
    error::ApiError,
    processor::{process_data_chunk, process_sum_chunk, run_single_task},
    types::{
        MessageResponse, PostBatchRequest, PostBatchResponse, PreBatchRequest, StatsResponse,
    },
};
use crate::server::config::ServerConfig;
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    routing::{get, post},
};
use batchpool::{
    BatchDispatcher, ChunkSize, DataChunk, Error, PoolCell, split_flat, split_grouped, task_fn,
};
use portable_atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

// Longest JSON rendering of one `i64` plus its separator.
const MAX_BYTES_PER_VALUE: usize = 21;
// Room for field names and chunk envelopes.
const BODY_OVERHEAD: usize = 64 * 1024;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ServerConfig>,
    pool: Arc<PoolCell>,
    shutdown: CancellationToken,
    task_seq: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(config: ServerConfig, pool: Arc<PoolCell>, shutdown: CancellationToken) -> Self {
        Self {
            config: Arc::new(config),
            pool,
            shutdown,
            task_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    fn check_batch_len(&self, len: usize) -> Result<(), Error> {
        if len > self.config.max_batch_len {
            return Err(Error::InvalidRequest {
                reason: format!(
                    "batch of {len} values exceeds maximum allowed ({})",
                    self.config.max_batch_len
                ),
            });
        }
        Ok(())
    }

    fn body_limit(&self) -> usize {
        self.config
            .max_batch_len
            .saturating_mul(MAX_BYTES_PER_VALUE)
            .saturating_add(BODY_OVERHEAD)
    }
}

pub fn router(state: AppState) -> Router {
    let body_limit = state.body_limit();

    Router::new()
        .route("/api/single-task", post(single_task))
        .route("/api/pre-batch-process", post(pre_batch_process))
        .route("/api/post-batch-process", post(post_batch_process))
        .route("/api/get-workerpool-stats", get(workerpool_stats))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn single_task(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let pool = state.pool.get()?;
    let param = state.task_seq.fetch_add(1, Ordering::Relaxed) + 1;
    let delay = state.config.work_delay;

    pool.submit(task_fn(move || run_single_task(param, delay)))?;
    tracing::debug!("Submitted task {param} ({})", pool.statistics());

    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse::new("Task submitted")),
    ))
}

async fn pre_batch_process(
    State(state): State<AppState>,
    Json(req): Json<PreBatchRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let chunk_size = ChunkSize::try_from(req.chunk_size)?;
    let total = req.total_len();
    state.check_batch_len(total)?;
    let pool = state.pool.get()?;

    tracing::info!(
        total_data = req.total_data,
        concurrency = req.concurrency,
        "Pre-batch request: {total} values in {} groups, chunk size {}",
        req.data.len(),
        chunk_size.get()
    );

    let chunks = DataChunk::numbered(split_grouped(&req.data, chunk_size));
    let delay = state.config.work_delay;
    let summary = BatchDispatcher::new(pool)
        .collect_errors(chunks, move |chunk| process_data_chunk(chunk, delay))
        .await?;

    tracing::info!("Pre-batch request processed {} chunks", summary.chunks);
    Ok(Json(MessageResponse::new("Data processed successfully")))
}

async fn post_batch_process(
    State(state): State<AppState>,
    Json(req): Json<PostBatchRequest>,
) -> Result<Json<PostBatchResponse>, ApiError> {
    let chunk_size = ChunkSize::try_from(req.chunk_size)?;
    state.check_batch_len(req.data.len())?;
    let pool = state.pool.get()?;

    tracing::info!(
        concurrency = req.concurrency,
        "Post-batch request: {} values, chunk size {}",
        req.data.len(),
        chunk_size.get()
    );

    let chunks = split_flat(&req.data, chunk_size);
    let delay = state.config.work_delay;
    let report = BatchDispatcher::new(pool)
        .accumulate_sum(chunks, move |index, chunk| {
            process_sum_chunk(index, chunk, delay)
        })
        .await;

    Ok(Json(PostBatchResponse {
        result: report.sum,
        error: report.error.map(|e| e.to_string()),
    }))
}

async fn workerpool_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let stats = state.pool.statistics()?;
    Ok(Json(StatsResponse {
        message: "Worker pool statistics".to_string(),
        stats,
    }))
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<MessageResponse>) {
    if state.shutdown.is_cancelled() {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(MessageResponse::new("shutting down")),
        )
    } else {
        (StatusCode::OK, Json(MessageResponse::new("ok")))
    }
}
