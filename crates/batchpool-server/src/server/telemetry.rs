//! # Logging
//!
//! Console logging through `tracing-subscriber`.
//!
//! - Filtering follows `RUST_LOG` and defaults to `info`. Per-batch pool
//!   statistics are emitted at `debug`, per-task events at `trace`:
//!
//! ```bash
//! RUST_LOG=batchpool=debug,info cargo run
//! ```
//!
//! - `LOG_FORMAT=pretty` (default) prints multi-line, human readable events;
//!   `LOG_FORMAT=json` prints one JSON object per line.

use super::config::LogFormat;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_telemetry(format: LogFormat) -> anyhow::Result<()> {
    let registry = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()));

    let layer = tracing_subscriber::fmt::layer()
        .with_thread_ids(true)
        .with_line_number(true)
        .with_target(false)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_file(true);

    match format {
        LogFormat::Pretty => registry.with(layer.pretty()).try_init()?,
        LogFormat::Json => registry.with(layer.json()).try_init()?,
    }

    Ok(())
}
