pub mod config;
pub mod error;
pub mod types;

pub use config::{EngineConfig, ServiceConfig};
pub use error::{Result, SimError};
pub use types::{EntityId, Millis};
