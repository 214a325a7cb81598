use batchpool::PoolCell;
use core::time::Duration;
use std::sync::Arc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Logs a pool snapshot every `every` until `shutdown` is cancelled.
pub async fn stats_monitor(pool: Arc<PoolCell>, every: Duration, shutdown: CancellationToken) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            () = shutdown.cancelled() => break,
            _ = ticker.tick() => match pool.statistics() {
                Ok(stats) if stats.running > 0 => {
                    tracing::info!("{} tasks running ({stats})", stats.running);
                }
                Ok(stats) => tracing::debug!("No tasks running ({stats})"),
                Err(e) => tracing::warn!("Error reading worker pool statistics: {e}"),
            },
        }
    }

    tracing::debug!("Statistics monitor stopped");
}
