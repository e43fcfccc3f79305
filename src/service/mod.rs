//! Line-delimited JSON simulation service
//!
//! Thin request/response plumbing around [`crate::Engine`]: one JSON
//! request per line in, one JSON response per line out.

pub mod protocol;
pub mod server;

pub use protocol::{SimulationRequest, SimulationResponse};
pub use server::{serve, shutdown_signal, SimulationService};
