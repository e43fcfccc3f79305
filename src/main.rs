//! Encounter Sim - service entry point
//!
//! Parses flags (optionally layered over a TOML config file), starts the
//! engine and serves line-delimited JSON simulation requests until CTRL-C
//! or SIGTERM.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use encounter_sim::core::config::hardware_concurrency;
use encounter_sim::core::error::Result;
use encounter_sim::service::{serve, shutdown_signal};
use encounter_sim::{Engine, ServiceConfig};
use tokio::net::TcpListener;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

/// Encounter simulation service
#[derive(Parser, Debug)]
#[command(name = "encounter-sim")]
#[command(about = "Serve parallel encounter simulations over line-delimited JSON")]
struct Args {
    /// TOML file with service settings; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Interface to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,

    /// Worker threads (defaults to hardware concurrency)
    #[arg(long)]
    threads: Option<usize>,

    /// Trials per simulation request
    #[arg(long)]
    trials: Option<u32>,

    /// Base RNG seed
    #[arg(long)]
    seed: Option<u64>,
}

impl Args {
    fn into_config(self) -> Result<ServiceConfig> {
        let mut config = match &self.config {
            Some(path) => ServiceConfig::load_from_toml(path)?,
            None => ServiceConfig::default(),
        };
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(threads) = self.threads {
            config.engine.worker_count = threads;
        }
        if let Some(trials) = self.trials {
            config.engine.trials = trials;
        }
        if let Some(seed) = self.seed {
            config.engine.seed = seed;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("encounter_sim=info")),
        )
        .init();

    let config = Args::parse().into_config()?;
    tracing::debug!(hardware_threads = hardware_concurrency(), "Parsed configuration");

    let rt = Runtime::new()?;
    rt.block_on(run(config))
}

async fn run(config: ServiceConfig) -> Result<()> {
    let engine = Arc::new(Engine::with_config(config.engine.clone())?);

    let address = config.address();
    let listener = TcpListener::bind(&address).await?;
    tracing::info!("Simulation server listening at {}", address);

    serve(listener, engine, shutdown_signal()).await
}
