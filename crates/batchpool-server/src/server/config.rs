use anyhow::bail;
use batchpool::PoolConfig;
use clap::{Parser, ValueEnum};
use core::time::Duration;

/// Output format of the console log layer.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, human readable output.
    #[default]
    Pretty,
    /// One JSON object per event, for log shippers.
    Json,
}

/// Runtime configuration for the `batchpool-server` binary.
///
/// All values are parsed from CLI arguments or environment variables (a
/// `.env` file is loaded first), with defaults suitable for a local run.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "batchpool-server",
    version,
    about = "An HTTP service for bounded, chunked batch processing"
)]
pub struct CliArgs {
    /// Address to listen on.
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("0.0.0.0:8080"))]
    pub server_addr: String,

    /// Maximum number of tasks the worker pool runs at once.
    ///
    /// Every request shares this ceiling; the per-request `concurrency` field
    /// is informational only.
    ///
    /// Environment variable: `POOL_SIZE`
    #[arg(long, env = "POOL_SIZE", default_value_t = PoolConfig::DEFAULT_CAPACITY)]
    pub pool_size: usize,

    /// Number of accepted tasks allowed to wait for a free slot.
    ///
    /// Submissions beyond this are rejected and reported per chunk rather than
    /// blocking the request.
    ///
    /// Environment variable: `QUEUE_CAPACITY`
    #[arg(long, env = "QUEUE_CAPACITY", default_value_t = PoolConfig::DEFAULT_QUEUE_CAPACITY)]
    pub queue_capacity: usize,

    /// Seconds to wait for the dispatch loop to acknowledge shutdown.
    ///
    /// Environment variable: `SHUTDOWN_TIMEOUT_SECS`
    #[arg(
        long,
        env = "SHUTDOWN_TIMEOUT_SECS",
        default_value_t = PoolConfig::DEFAULT_SHUTDOWN_TIMEOUT.as_secs()
    )]
    pub shutdown_timeout_secs: u64,

    /// Maximum number of integers accepted in a single batch request.
    ///
    /// Environment variable: `MAX_BATCH_LEN`
    #[arg(long, env = "MAX_BATCH_LEN", default_value_t = 1_000_000)]
    pub max_batch_len: usize,

    /// Simulated latency of every chunk and single task, in milliseconds.
    ///
    /// Environment variable: `WORK_DELAY_MS`
    #[arg(long, env = "WORK_DELAY_MS", default_value_t = 500)]
    pub work_delay_ms: u64,

    /// Interval between pool statistics log lines, in seconds. `0` disables
    /// the monitor.
    ///
    /// Environment variable: `STATS_INTERVAL_SECS`
    #[arg(long, env = "STATS_INTERVAL_SECS", default_value_t = 0)]
    pub stats_interval_secs: u64,

    /// Console log format.
    ///
    /// Environment variable: `LOG_FORMAT`
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server_addr: String,
    pub pool_size: usize,
    pub queue_capacity: usize,
    pub shutdown_timeout: Duration,
    pub max_batch_len: usize,
    pub work_delay: Duration,
    pub stats_interval: Option<Duration>,
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Pool settings derived from this configuration.
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig::new(self.pool_size)
            .with_queue_capacity(self.queue_capacity)
            .with_shutdown_timeout(self.shutdown_timeout)
    }
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.pool_size == 0 {
            bail!("POOL_SIZE must be greater than 0");
        }

        if args.queue_capacity == 0 {
            bail!("QUEUE_CAPACITY must be greater than 0");
        }

        if args.max_batch_len == 0 {
            bail!("MAX_BATCH_LEN must be greater than 0");
        }

        let config = Self {
            server_addr: args.server_addr,
            pool_size: args.pool_size,
            queue_capacity: args.queue_capacity,
            shutdown_timeout: Duration::from_secs(args.shutdown_timeout_secs),
            max_batch_len: args.max_batch_len,
            work_delay: Duration::from_millis(args.work_delay_ms),
            stats_interval: (args.stats_interval_secs > 0)
                .then(|| Duration::from_secs(args.stats_interval_secs)),
            log_format: args.log_format,
        };

        // Catches anything the pool itself refuses, e.g. a capacity above the
        // semaphore limit.
        if let Err(e) = config.pool_config().validate() {
            bail!("invalid pool settings: {e}");
        }

        Ok(config)
    }
}
