//! Simulation engine
//!
//! Fans a schedule out to a fixed worker pool, runs one isolated trial per
//! task, and reduces the per-trial records into a single result.

pub mod engine;
pub mod outcome;
pub mod trial;

pub use engine::Engine;
pub use outcome::{AggregateResult, EnemyStats, Summary};
pub use trial::{run_trial, TrialRecord};
