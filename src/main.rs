//! ip2country
//!
//! Answers "which city and country does this IP belong to" over HTTP.
//!
//! # Architecture Overview
//!
//! ```text
//!     GET /api/v1/find-country?ip=...
//!     ───────────────────────────────┐
//!                                    ▼
//!                         ┌─────────────────────┐
//!                         │  http (axum server) │  request id, trace, timeout
//!                         └──────────┬──────────┘
//!                                    ▼
//!                         ┌─────────────────────┐
//!                         │  request pipeline   │  empty ip → 400
//!                         └──────────┬──────────┘
//!                                    ▼
//!                         ┌─────────────────────┐
//!                         │  admission gate     │  over limit → 429
//!                         │  (global, 1s window)│
//!                         └──────────┬──────────┘
//!                                    ▼
//!                         ┌─────────────────────┐
//!                         │  lookup store       │  miss → 404, error → 500
//!                         │  (CSV snapshot)     │  hit  → 200 JSON
//!                         └─────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use ip2country::config::load_config;
use ip2country::lifecycle::{shutdown_signal, startup, Shutdown};
use ip2country::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "ip2country")]
#[command(about = "IP to city/country lookup service", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. PORT, RATE_LIMIT and IP_DB_PATH override it.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    init_logging(&config.observability.log_level);

    tracing::info!("ip2country v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        rate_limit = config.rate_limit.requests_per_second,
        database = %config.database.path,
        watch = config.database.watch,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        trigger.trigger();
    });

    startup::run(config, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
