//! World State - one trial's mutable universe

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::core::types::{EntityId, Millis};
use crate::curve::HealthCurve;
use crate::entity::enemy::Enemy;

/// The mutable state of a single trial
///
/// Created fresh for every trial and owned by the one task executing it.
/// Enemies are only ever appended, in event application order. Entity ids
/// come from the state's own seeded generator, so a trial replayed with the
/// same seed produces the same ids.
#[derive(Debug, Clone)]
pub struct WorldState {
    pub enemies: Vec<Enemy>,
    ids: ChaCha8Rng,
}

impl Default for WorldState {
    fn default() -> Self {
        Self::seeded(0)
    }
}

impl WorldState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty state whose entity ids are derived from `seed`
    pub fn seeded(seed: u64) -> Self {
        Self {
            enemies: Vec::new(),
            ids: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Append a new enemy and return its id
    pub fn spawn_enemy(
        &mut self,
        name: impl Into<String>,
        health: HealthCurve,
        spawned_at: Millis,
    ) -> EntityId {
        let id = EntityId::from_rng(&mut self.ids);
        self.enemies.push(Enemy::new(id, name, health, spawned_at));
        id
    }

    pub fn enemy_count(&self) -> usize {
        self.enemies.len()
    }

    /// Enemies with the given name, in spawn order
    pub fn enemies_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Enemy> + 'a {
        self.enemies.iter().filter(move |e| e.name == name)
    }
}
