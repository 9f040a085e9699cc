//! `scout` command-line entry point.

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::{debug, info};
use scout_rs::config::{LayeredConfig, LayeredConfigOptions, ScoutConfig};
use scout_rs::{build_services, init_logging, spawn_cache_refresher};
use std::path::PathBuf;
use std::time::Duration;
use tokio::net::TcpListener;

/// Device status and food record API.
#[derive(Parser)]
#[command(name = "scout", version)]
struct Cli {
    /// Extra scout.json5 files applied after the default layers
    #[arg(long, global = true)]
    config: Vec<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API (default)
    Serve {
        /// Listen address, overriding server.bind
        #[arg(long)]
        bind: Option<String>,
    },
    /// Print the config layers and the effective config
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let layered = load_config(&cli.config)?;
    debug!("layered config loaded (layers={})", layered.layers.len());

    match cli.command.unwrap_or(Command::Serve { bind: None }) {
        Command::Serve { bind } => serve(layered.config, bind).await,
        Command::CheckConfig => check_config(&layered),
    }
}

fn load_config(runtime_paths: &[PathBuf]) -> anyhow::Result<LayeredConfig> {
    let cwd = std::env::current_dir().context("cwd")?;
    info!("loading layered config from cwd: {}", cwd.display());
    let options = runtime_paths
        .iter()
        .fold(LayeredConfigOptions::new(&cwd), |options, path| {
            options.with_runtime_path(path)
        });
    ScoutConfig::load_layered_with_options(options).context("failed to load layered config")
}

async fn serve(mut config: ScoutConfig, bind: Option<String>) -> anyhow::Result<()> {
    if let Some(bind) = bind {
        config.server.bind = bind;
        config.validate().context("invalid --bind")?;
    }
    let addr = config.bind_addr()?;
    let services = build_services(&config)?;
    let refresher = services.cache.map(|cache| {
        spawn_cache_refresher(
            cache,
            Duration::from_secs(config.cache.refresh_interval_secs),
        )
    });

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let result = scout_rs::server::serve(listener, services.state).await;
    if let Some(refresher) = refresher {
        refresher.abort();
    }
    result.context("server error")
}

fn check_config(layered: &LayeredConfig) -> anyhow::Result<()> {
    if layered.layers.is_empty() {
        println!("no config files found; using defaults");
    }
    for layer in &layered.layers {
        let path = layer
            .path
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_default();
        println!("{:<8} {path}", layer.source.name());
    }
    let mut effective = serde_json::to_value(&layered.config)?;
    if let Some(secret) = effective.pointer_mut("/auth/api_secret")
        && secret.is_string()
    {
        *secret = serde_json::Value::String("<redacted>".to_string());
    }
    println!("{}", serde_json::to_string_pretty(&effective)?);
    Ok(())
}
