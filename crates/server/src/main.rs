//! HTTP server exposing `GET /recommend`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use server::{AppConfig, RecommendationService};

#[derive(Parser)]
#[command(name = "reco-server")]
#[command(about = "Serve multi-source asset recommendations over HTTP")]
struct Cli {
    /// Path to the TOML config file (defaults to $RECO_CONFIG, then config/reco.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,server=debug,pipeline=debug")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if config.services.get("search").is_none() {
        warn!("No search service configured; every recommendation will fail");
    }

    let address = config.bind_address();
    let service = RecommendationService::new(Arc::new(config))
        .context("Failed to create HTTP transport")?;

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    tokio::select! {
        result = server::serve(listener, Arc::new(service)) => {
            result.context("Server error")?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
        }
    }

    Ok(())
}
