//! Work functions run on the pool for each endpoint.
//!
//! Each one sleeps for the configured delay first to stand in for real I/O.

use batchpool::{DataChunk, Error, Result};
use core::time::Duration;

/// Logs a grouped chunk. Never fails.
pub async fn process_data_chunk(chunk: DataChunk, delay: Duration) -> Result<()> {
    tokio::time::sleep(delay).await;
    tracing::info!("Processing chunk {}: {:?}", chunk.chunk_id, chunk.data);
    Ok(())
}

/// Sums a flat chunk.
///
/// # Errors
///
/// [`Error::ChunkProcessing`] if the sum overflows `i64`.
pub async fn process_sum_chunk(index: usize, chunk: Vec<i64>, delay: Duration) -> Result<i64> {
    tokio::time::sleep(delay).await;

    let sum = chunk
        .iter()
        .try_fold(0_i64, |acc, &value| acc.checked_add(value))
        .ok_or_else(|| Error::ChunkProcessing {
            chunk: index,
            reason: "chunk sum overflowed".to_string(),
        })?;

    tracing::trace!("Chunk {index} of {} values summed to {sum}", chunk.len());
    Ok(sum)
}

pub async fn run_single_task(param: u64, delay: Duration) -> Result<()> {
    tokio::time::sleep(delay).await;
    tracing::info!("Executing task with param: {param}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sums_chunk() {
        let sum = process_sum_chunk(0, vec![1, -2, 30], Duration::ZERO).await;
        assert_eq!(sum, Ok(29));
        assert_eq!(process_sum_chunk(1, Vec::new(), Duration::ZERO).await, Ok(0));
    }

    #[tokio::test]
    async fn overflow_fails_the_chunk() {
        let err = process_sum_chunk(4, vec![i64::MAX, 1], Duration::ZERO)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ChunkProcessing { chunk: 4, .. }));
    }

    #[tokio::test]
    async fn grouped_chunks_always_succeed() {
        let chunk = DataChunk::new(7, vec![1, 2, 3]);
        assert_eq!(process_data_chunk(chunk, Duration::ZERO).await, Ok(()));
    }
}
