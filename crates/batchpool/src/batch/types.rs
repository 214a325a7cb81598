use crate::{Error, Result};

/// A numbered slice of batch input.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataChunk {
    #[cfg_attr(feature = "serde", serde(default))]
    pub chunk_id: u64,
    pub data: Vec<i64>,
}

impl DataChunk {
    pub const fn new(chunk_id: u64, data: Vec<i64>) -> Self {
        Self { chunk_id, data }
    }

    /// Numbers `chunks` by position, starting at 0.
    pub fn numbered(chunks: Vec<Vec<i64>>) -> Vec<Self> {
        chunks
            .into_iter()
            .zip(0_u64..)
            .map(|(data, chunk_id)| Self::new(chunk_id, data))
            .collect()
    }
}

impl AsRef<[i64]> for DataChunk {
    fn as_ref(&self) -> &[i64] {
        &self.data
    }
}

/// What one chunk produced, tagged with its submission index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkOutcome<R> {
    pub index: usize,
    pub result: Result<R>,
}

/// Successful result of [`BatchDispatcher::collect_errors`].
///
/// [`BatchDispatcher::collect_errors`]: crate::BatchDispatcher::collect_errors
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub chunks: usize,
}

/// Result of [`BatchDispatcher::accumulate_sum`].
///
/// `sum` covers every chunk whose value fit into the total, whether or not
/// another chunk failed. `failed` counts the rest, including a chunk whose
/// value would overflow the total. `error` holds the last failure observed.
///
/// [`BatchDispatcher::accumulate_sum`]: crate::BatchDispatcher::accumulate_sum
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SumReport {
    pub sum: i64,
    pub error: Option<Error>,
    pub chunks: usize,
    pub failed: usize,
}

impl SumReport {
    pub const fn has_error(&self) -> bool {
        self.error.is_some()
    }
}
