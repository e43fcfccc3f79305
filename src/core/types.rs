//! Core type definitions used throughout the codebase

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::{Builder, Uuid};

/// Encounter time in milliseconds since the pull
pub type Millis = u64;

/// Unique identifier for entities spawned during a trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// Random (version 4 layout) id drawn from `rng`, so seeded runs repeat
    pub fn from_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(Builder::from_random_bytes(rng.gen()).into_uuid())
    }
}

/// Fraction of the encounter elapsed at `at`, for an encounter lasting `duration`.
///
/// A zero-length encounter is treated as already complete.
pub fn progress_at(at: Millis, duration: Millis) -> f64 {
    if duration == 0 {
        return 1.0;
    }
    (at as f64 / duration as f64).clamp(0.0, 1.0)
}
