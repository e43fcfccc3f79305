//! Enemy participants

use crate::core::types::{progress_at, EntityId, Millis};
use crate::curve::HealthCurve;

/// An enemy spawned during a trial
///
/// Owns its health curve outright; nothing outside the owning
/// `WorldState` ever holds a reference to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub id: EntityId,
    pub name: String,
    pub health: HealthCurve,
    /// Encounter time at which the spawn event fired
    pub spawned_at: Millis,
}

impl Enemy {
    pub fn new(
        id: EntityId,
        name: impl Into<String>,
        health: HealthCurve,
        spawned_at: Millis,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            health,
            spawned_at,
        }
    }

    /// Health fraction at encounter time `at` for an encounter of `duration`
    pub fn health_at(&self, at: Millis, duration: Millis) -> f64 {
        self.health.value_at(progress_at(at, duration))
    }

    /// Health fraction at the moment this enemy appeared
    pub fn health_at_spawn(&self, duration: Millis) -> f64 {
        self.health_at(self.spawned_at, duration)
    }
}
