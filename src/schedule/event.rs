//! Scheduled events and their effects on world state

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::core::types::Millis;
use crate::curve::HealthCurve;
use crate::entity::WorldState;

/// Bookkeeping classification for events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventTag {
    #[display(fmt = "enemy_spawn")]
    EnemySpawn,
}

/// The effect an event has when applied
///
/// Every variant owns all the data it needs, so a built event never refers
/// back into the description it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum EventAction {
    SpawnEnemy { name: String, health: HealthCurve },
}

/// One immutable, timestamped action against world state
///
/// Shared read-only across every trial of a schedule. `apply` is
/// synchronous, does no I/O, and touches nothing but the state passed in.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    timestamp: Millis,
    action: EventAction,
    tag: EventTag,
}

impl Event {
    pub fn new(timestamp: Millis, action: EventAction, tag: EventTag) -> Self {
        Self {
            timestamp,
            action,
            tag,
        }
    }

    pub fn spawn(timestamp: Millis, name: impl Into<String>, health: HealthCurve) -> Self {
        Self::new(
            timestamp,
            EventAction::SpawnEnemy {
                name: name.into(),
                health,
            },
            EventTag::EnemySpawn,
        )
    }

    pub fn timestamp(&self) -> Millis {
        self.timestamp
    }

    pub fn tag(&self) -> EventTag {
        self.tag
    }

    pub fn action(&self) -> &EventAction {
        &self.action
    }

    /// Perform this event's effect on `state`
    pub fn apply(&self, state: &mut WorldState) {
        match &self.action {
            EventAction::SpawnEnemy { name, health } => {
                state.spawn_enemy(name.clone(), health.clone(), self.timestamp);
            }
        }
    }
}
