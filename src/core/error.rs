use thiserror::Error;

use crate::core::types::Millis;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid time window: max {max} ms is before min {min} ms")]
    InvalidTimeWindow { min: Millis, max: Millis },

    #[error("Event {index} at {timestamp} ms lies past the encounter maximum of {max} ms")]
    EventOutsideWindow {
        index: usize,
        timestamp: Millis,
        max: Millis,
    },

    #[error("Worker count must be positive, got {0}")]
    InvalidWorkerCount(usize),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Worker pool error: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Trial panicked: {0}")]
    TrialPanicked(String),

    #[error("Engine is shutting down")]
    ShuttingDown,

    #[error("Simulation cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
