//! Luma server entry point.
//!
//! Loads configuration, builds the similarity oracle and grouping engine,
//! and serves the HTTP API until Ctrl-C.

mod cli;

use clap::Parser;

use luma_api::{start_server, AppState};
use luma_core::config::LumaConfig;

use crate::cli::CliArgs;

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl-C"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config is read before tracing so the file's log level can apply.
    let config_file = args.resolve_config_path();
    let mut config = LumaConfig::load_or_default(&config_file);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(
                args.resolve_log_filter(&config.general.log_level),
            )
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting Luma v{}", env!("CARGO_PKG_VERSION"));
    if config_file.exists() {
        tracing::info!(path = %config_file.display(), "Configuration loaded");
    } else {
        tracing::info!(path = %config_file.display(), "No configuration file, using defaults");
    }

    config.general.host = args.resolve_host(&config.general.host);
    config.general.port = args.resolve_port(config.general.port);

    let state = AppState::from_config(config.clone());
    tracing::info!(
        oracle = state.engine.oracle_name(),
        merge_policy = ?state.engine.merge_policy(),
        max_candidates = config.oracle.max_candidates,
        "Grouping engine ready"
    );

    start_server(&config, state, shutdown_signal()).await?;

    tracing::info!("Luma stopped");
    Ok(())
}
