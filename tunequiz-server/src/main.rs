//! Tunequiz Server
//!
//! Serves the quiz, search and playlist API plus the OAuth sign-in routes.
//!
//! # Running
//!
//! ```bash
//! cargo run -p tunequiz-server -- --bind 127.0.0.1:3000
//! # or after install:
//! tunequiz --config server.toml
//! ```

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use tunequiz_server::{AppState, ServerConfig, load_config, start_server};

#[derive(Parser)]
#[command(name = "tunequiz")]
#[command(author, version, about = "Quiz-driven playlist builder for YouTube and Spotify", long_about = None)]
struct Cli {
    /// Configuration file (defaults to server.toml in the config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on, overriding the configuration
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }

    let level = if cli.verbose { "debug" } else { config.log_level.as_str() };
    init_logging(level);

    info!("Starting Tunequiz server...");
    match &config.config_path {
        Some(path) => info!("Loaded configuration from {:?}", path),
        None => info!("No configuration file found, using defaults"),
    }

    run_server(config).await
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt().with_env_filter(filter).with_target(false).init();
}

async fn run_server(config: ServerConfig) -> Result<()> {
    let state = AppState::from_config(&config)?;

    let server_handle = start_server(config.bind_addr, state).await?;

    info!("Server running. Press Ctrl+C to stop.");

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, stopping server...");

    server_handle.stop().await?;

    info!("Server stopped");
    Ok(())
}
