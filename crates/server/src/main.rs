//! # sweeper-server
//!
//! HTTP server exposing a sweeper session: upload files, clean them and
//! download the result.

mod error;
mod routes;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use sweeper_core::{Pipeline, SweeperConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sweeper-server")]
#[command(author, version, about = "HTTP server for sweeper sessions", long_about = None)]
struct Args {
    /// Configuration file (YAML); defaults to $SWEEPER_CONFIG
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Address to listen on, overriding the configuration
    #[arg(short, long, value_name = "ADDR")]
    bind: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = SweeperConfig::discover(args.config.as_deref())
        .context("Failed to load configuration")?;
    let addr = args.bind.unwrap_or_else(|| config.server.bind.clone());

    let app = routes::create_router(routes::AppState::new(Pipeline::new(config)));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "sweeper-server listening");
    println!("sweeper-server listening on {addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
