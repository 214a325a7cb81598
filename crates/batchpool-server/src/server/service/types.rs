use batchpool::{DataChunk, Statistics};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/pre-batch-process`.
///
/// `data` holds pre-grouped integers; the groups are flattened and re-split
/// into chunks of `chunk_size`. `total_data` and `concurrency` are accepted
/// for compatibility and only logged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreBatchRequest {
    #[serde(default)]
    pub total_data: i64,
    #[serde(alias = "chunkSize")]
    pub chunk_size: i64,
    #[serde(default)]
    pub concurrency: i64,
    #[serde(default)]
    pub data: Vec<DataChunk>,
}

impl PreBatchRequest {
    /// Number of integers across every group.
    pub fn total_len(&self) -> usize {
        self.data.iter().map(|chunk| chunk.data.len()).sum()
    }
}

/// Body of `POST /api/post-batch-process`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostBatchRequest {
    #[serde(default)]
    pub data: Vec<i64>,
    #[serde(alias = "chunkSize")]
    pub chunk_size: i64,
    #[serde(default)]
    pub concurrency: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Combined outcome of an accumulate-and-sum batch.
///
/// `result` sums every chunk that succeeded, even when `error` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostBatchResponse {
    pub result: i64,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub message: String,
    pub stats: Statistics,
}
