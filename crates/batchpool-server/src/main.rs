#![doc = include_str!("../README.md")]

mod server;

use batchpool::PoolCell;
use clap::Parser;
use server::config::{CliArgs, ServerConfig};
use server::monitor::stats_monitor;
use server::service::handler::{AppState, router};
use server::telemetry::init_telemetry;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = ServerConfig::try_from(args)?;

    init_telemetry(config.log_format)?;

    let pool = Arc::new(PoolCell::new());
    pool.init(config.pool_config())?;

    let shutdown = CancellationToken::new();
    let monitor = config.stats_interval.map(|every| {
        tokio::spawn(stats_monitor(Arc::clone(&pool), every, shutdown.clone()))
    });

    let listener = TcpListener::bind(&config.server_addr).await?;
    log_startup_info(&config);

    let app = router(AppState::new(config, Arc::clone(&pool), shutdown.clone()));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    // HTTP connections are drained; now let accepted pool work finish.
    pool.close_pool().await;

    if let Some(monitor) = monitor {
        if let Err(e) = monitor.await {
            tracing::warn!("Statistics monitor ended abnormally: {e}");
        }
    }

    tracing::info!("Service gracefully terminated");
    Ok(())
}

fn log_startup_info(config: &ServerConfig) {
    if cfg!(debug_assertions) {
        tracing::info!(
            "Starting batch service on {} with full config: {:#?}",
            config.server_addr,
            config
        );
    } else {
        tracing::info!(
            "Starting batch service on {} with {} pool slots",
            config.server_addr,
            config.pool_size
        );
    }
}

/// Resolves on Ctrl+C or SIGTERM after cancelling `shutdown`, which flips the
/// health endpoint and stops the statistics monitor.
async fn shutdown_signal(shutdown: CancellationToken) {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C signal"),
        () = terminate => tracing::info!("Received SIGTERM signal"),
    }

    tracing::info!("Termination request received, finishing in-flight requests...");
    shutdown.cancel();
}
