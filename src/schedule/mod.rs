//! Encounter descriptions and the executable schedules built from them

pub mod builder;
pub mod description;
pub mod event;

pub use builder::Schedule;
pub use description::{
    DeclaredAction, EncounterDescription, EnemySpec, HealthSelector, LooseAction, SpawnAction,
};
pub use event::{Event, EventAction, EventTag};
