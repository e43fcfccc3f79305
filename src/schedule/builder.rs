//! Schedule building - declarative description to executable events

use crate::core::types::Millis;
use crate::curve::CurvePreset;
use crate::schedule::description::{DeclaredAction, EncounterDescription, HealthSelector, SpawnAction};
use crate::schedule::event::Event;

/// Preset used when a spawn names a health estimator we don't know
pub const FALLBACK_PRESET: CurvePreset = CurvePreset::BurstAndExecute;

/// Executable form of an encounter description
///
/// Built once per simulation request and shared read-only by every trial.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schedule {
    pub min_time: Millis,
    pub max_time: Millis,
    events: Vec<Event>,
}

impl Schedule {
    /// Translate a description into a schedule.
    ///
    /// The time window is copied verbatim. Each spawn becomes one event;
    /// all other kinds are skipped. Events are stably sorted by timestamp,
    /// so same-time events keep their declaration order.
    pub fn build(description: &EncounterDescription) -> Self {
        tracing::debug!(
            declared = description.events.len(),
            "Building schedule from encounter description"
        );

        let mut events: Vec<Event> = description
            .events
            .iter()
            .filter_map(build_event)
            .collect();
        events.sort_by_key(Event::timestamp);

        Self {
            min_time: description.min_time_millis,
            max_time: description.max_time_millis,
            events,
        }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

fn build_event(action: &DeclaredAction) -> Option<Event> {
    match action {
        DeclaredAction::Spawn(spawn) => Some(build_spawn_event(spawn)),
        DeclaredAction::Movement(_)
        | DeclaredAction::Bloodlust(_)
        | DeclaredAction::Stun(_)
        | DeclaredAction::Damage(_)
        | DeclaredAction::Invulnerability(_) => {
            tracing::debug!(kind = action.kind_name(), "No runtime effect for event kind, skipping");
            None
        }
        DeclaredAction::Unknown => {
            tracing::info!("Attempting to add an unknown raid event, skipping");
            None
        }
    }
}

fn build_spawn_event(spawn: &SpawnAction) -> Event {
    let preset = resolve_preset(&spawn.enemy.health_estimator);
    Event::spawn(spawn.timestamp_millis, spawn.enemy.name.clone(), preset.curve())
}

/// Map a requested selector to a concrete preset
///
/// Unrecognized selectors are not an error: they fall back to
/// `FALLBACK_PRESET`.
pub fn resolve_preset(selector: &HealthSelector) -> CurvePreset {
    match selector {
        HealthSelector::Uniform => CurvePreset::Uniform,
        HealthSelector::Burst => CurvePreset::Burst,
        HealthSelector::Execute => CurvePreset::Execute,
        HealthSelector::BurstAndExecute => CurvePreset::BurstAndExecute,
        HealthSelector::Unrecognized(raw) => {
            tracing::info!("Health estimator {:?} not found", raw);
            tracing::info!("Proceeding with {} default", FALLBACK_PRESET);
            FALLBACK_PRESET
        }
    }
}
