//! Headless Encounter Runner
//!
//! Simulates one encounter description file and prints the aggregate.

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use encounter_sim::core::config::hardware_concurrency;
use encounter_sim::{EncounterDescription, Engine, EngineConfig};

/// Run a single encounter description without the service
#[derive(Parser, Debug)]
#[command(name = "encounter_runner")]
#[command(about = "Simulate an encounter description (JSON or TOML) and print the aggregate")]
struct Args {
    /// Path to the encounter description
    description: PathBuf,

    /// Worker threads
    #[arg(long, default_value_t = hardware_concurrency())]
    threads: usize,

    /// Number of trials
    #[arg(long, default_value_t = 1000)]
    trials: u32,

    /// Base RNG seed
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Output format: json or text
    #[arg(long, default_value = "text")]
    format: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("encounter_sim=warn")
        .init();

    let args = Args::parse();

    let description = match EncounterDescription::load(&args.description) {
        Ok(description) => description,
        Err(e) => {
            eprintln!("Failed to load {:?}: {}", args.description, e);
            std::process::exit(2);
        }
    };

    let engine = match Engine::with_config(EngineConfig {
        worker_count: args.threads,
        trials: args.trials,
        seed: args.seed,
    }) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Failed to start engine: {}", e);
            std::process::exit(2);
        }
    };

    let start = Instant::now();
    let result = match engine.simulate(&description) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Simulation failed: {}", e);
            std::process::exit(1);
        }
    };
    let elapsed = start.elapsed();

    if args.format == "json" {
        println!("{}", result.to_json());
    } else {
        println!("{}", result.summary());
        println!(
            "Ran {} trials on {} workers in {:.2}ms",
            result.trials,
            engine.worker_count(),
            elapsed.as_secs_f64() * 1000.0
        );
    }
}
