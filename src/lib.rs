//! Encounter Sim - parallel discrete-event encounter simulation
//!
//! A declarative [`EncounterDescription`] is built into a [`Schedule`] of
//! timestamped events, which the [`Engine`] runs many times in parallel
//! against fresh world state and reduces to an [`AggregateResult`].

pub mod core;
pub mod curve;
pub mod engine;
pub mod entity;
pub mod schedule;
pub mod service;

pub use crate::core::{EngineConfig, Result, ServiceConfig, SimError};
pub use crate::engine::{AggregateResult, Engine, Summary};
pub use crate::schedule::{EncounterDescription, Schedule};
