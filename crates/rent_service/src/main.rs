//! RentWise service entry point

use anyhow::{Context, Result};
use clap::Parser;
use rentwise_core::PredictionPipeline;
use rentwise_service::{start_server, AppState, ServiceConfig};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "rentwise")]
#[command(about = "RentWise - India Rental Estimator")]
#[command(version)]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = "config/rentwise.toml")]
    config: PathBuf,

    /// Bind address (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ServiceConfig::load(&cli.config)?;
    config.apply_env_overrides();
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    init_logging(&config.logging.level);
    info!("Starting RentWise v{}", rentwise_service::VERSION);

    for warning in config.validate() {
        warn!("Configuration: {}", warning);
    }

    let pipeline = PredictionPipeline::load(
        &config.artifacts.model_path,
        &config.artifacts.encoders_path,
    )
    .context("cannot serve predictions without model and encoder artifacts")?;

    let addr = config.server.bind_addr();
    let state = AppState::new(pipeline, &config);
    start_server(state, &addr).await?;

    info!("RentWise stopped");
    Ok(())
}

/// `RUST_LOG` wins over the configured level
fn init_logging(default_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
