use anyhow::Result;
use clap::Parser;
use kale_pool_client::cli::{self, Args};
use kale_pool_client::client::ApiClient;
use kale_pool_client::config::AppConfig;
use kale_pool_client::metrics;
use kale_pool_client::utils::logging;
use tokio::signal;
use tracing::debug;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Phase 1: Load configuration, then apply flag overrides
    let mut config = match &args.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    args.apply_overrides(&mut config);
    config.validate()?;

    // Phase 2: Initialize logging
    logging::init(&config.logging)?;
    debug!("kale-pool v{}", env!("CARGO_PKG_VERSION"));

    // Phase 3: Build the client
    let client = ApiClient::from_config(&config)?;
    debug!(
        "Backend {} / pooler {} (timeout {}ms, {} retries)",
        client.base_url(),
        client.pooler_base_url(),
        config.api.timeout_ms,
        config.api.max_retries
    );

    // Phase 4: Run the command; a signal drops it mid-flight
    let result = cli::run_until(cli::run(args.command, &client, &config), shutdown_signal()).await;

    if args.metrics {
        eprint!("{}", metrics::gather_metrics());
    }

    result
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            debug!("Received Ctrl+C signal");
        },
        _ = terminate => {
            debug!("Received SIGTERM signal");
        },
    }
}
