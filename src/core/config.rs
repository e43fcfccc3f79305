//! Engine and service configuration
//!
//! Defaults are tuned for a single host serving interactive requests: enough
//! trials to smooth out the duration draw, few enough that a request returns
//! in well under a second on a laptop.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};

/// Number of worker threads to use when none is configured
///
/// Falls back to a single worker if the platform cannot report its
/// parallelism.
pub fn hardware_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Configuration for the simulation engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Size of the trial worker pool
    ///
    /// Fixed for the lifetime of an `Engine`. Must be at least 1.
    pub worker_count: usize,

    /// Independent trials run per `simulate` call
    ///
    /// Each trial draws its own encounter duration, so more trials give a
    /// tighter duration distribution in the aggregate.
    pub trials: u32,

    /// Base seed for the per-trial RNGs
    ///
    /// Trial `i` is seeded from this value and `i`, which keeps results
    /// reproducible regardless of which worker runs which trial.
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_count: hardware_concurrency(),
            trials: 1000,
            seed: 12345,
        }
    }
}

impl EngineConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config with an explicit worker count
    pub fn with_workers(worker_count: usize) -> Self {
        Self {
            worker_count,
            ..Self::default()
        }
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.worker_count == 0 {
            return Err(SimError::InvalidWorkerCount(self.worker_count));
        }
        if self.trials == 0 {
            return Err(SimError::InvalidConfig("trials must be positive".into()));
        }
        Ok(())
    }
}

/// Configuration for the simulation service process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Interface to bind
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Engine settings forwarded to `Engine::with_config`
    pub engine: EngineConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 50051,
            engine: EngineConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Load service configuration from a TOML file
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse service configuration from a TOML string
    ///
    /// Missing keys take their default values.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: ServiceConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(SimError::InvalidConfig("host must not be empty".into()));
        }
        self.engine.validate()
    }

    /// `host:port` string to bind
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
