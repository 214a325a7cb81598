//! HTTP mapping of [`batchpool::Error`].
//!
//! ## Status codes
//!
//! - `400`: invalid chunk size or request payload.
//! - `503`: the pool refused the work (queue full or shutting down).
//! - `500`: anything else. Batch and chunk failures carry a fixed message so
//!   per-chunk details stay in the logs.

use super::types::MessageResponse;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use batchpool::Error;

/// Error returned by every handler.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::InvalidChunkSize { .. } | Error::InvalidRequest { .. } => {
                StatusCode::BAD_REQUEST
            }
            Error::SubmissionRejected { .. } | Error::PoolClosed => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Error::NotInitialized
            | Error::InvalidConfig { .. }
            | Error::Runtime { .. }
            | Error::ChannelError { .. }
            | Error::ChunkProcessing { .. }
            | Error::BatchFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match &self.0 {
            Error::BatchFailed { .. } | Error::ChunkProcessing { .. } => {
                "Errors occurred during processing".to_string()
            }
            Error::NotInitialized | Error::Runtime { .. } | Error::ChannelError { .. } => {
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        } else {
            tracing::warn!("Request rejected: {}", self.0);
        }

        (
            status,
            Json(MessageResponse {
                message: self.message(),
            }),
        )
            .into_response()
    }
}
