/*
agrismart - server binary
Loads configuration, builds the news resolver and weather client, and runs the Rocket HTTP server.
*/

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use agrismart::server::{launch_rocket, AppState};
use common::Config;

#[derive(Parser, Debug)]
#[command(name = "agrismart", about = "AgriSmart news and weather server")]
struct Args {
    /// Path to config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let default_path = PathBuf::from("config.default.toml");
    let override_path = match args.config {
        Some(p) if !p.exists() => {
            error!(path = ?p, "specified config file not found");
            return Err(anyhow::anyhow!("Config file not found: {}", p.display()));
        }
        Some(p) => Some(p),
        None => Some(PathBuf::from("config.toml")).filter(|p| p.exists()),
    };

    let config = match Config::load_with_defaults(Some(default_path.as_path()), override_path.as_deref()).await {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %format!("{:#}", e), "failed to load configuration");
            return Err(e);
        }
    };
    info!(default = ?default_path, override = ?override_path, "configuration loaded");

    if config.news.secondary.api_key().is_none() {
        warn!(
            env = %config.news.secondary.api_key_env,
            "news aggregator key not set; that source will be skipped"
        );
    }
    if config.weather.api_key().is_none() {
        warn!(env = %config.weather.api_key_env, "weather API key not set; /api/weather will answer 503");
    }

    let state = AppState::from_config(&config);
    info!(sources = ?state.resolver.source_names(), "news resolver ready");

    launch_rocket(state, &config.server).await?;

    info!("Shutdown complete");
    Ok(())
}
