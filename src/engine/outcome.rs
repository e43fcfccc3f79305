//! Per-trial summaries and their reduction

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::Millis;
use crate::engine::trial::TrialRecord;
use crate::schedule::EventTag;

/// A statistic that can be extracted from one trial and merged across trials
///
/// `merge` must be associative, with `empty()` as its identity. The engine
/// folds summaries in trial index order, so results do not depend on which
/// worker finished first.
pub trait Summary: Send + Sized {
    fn empty() -> Self;
    fn observe(trial: &TrialRecord) -> Self;
    fn merge(self, other: Self) -> Self;
}

/// Per-name enemy tallies
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnemyStats {
    pub spawns: u64,
    /// Sum over spawns of the health fraction at the moment of spawning
    pub health_at_spawn_total: f64,
}

impl EnemyStats {
    pub fn mean_health_at_spawn(&self) -> Option<f64> {
        (self.spawns > 0).then(|| self.health_at_spawn_total / self.spawns as f64)
    }

    fn merge(&mut self, other: &EnemyStats) {
        self.spawns += other.spawns;
        self.health_at_spawn_total += other.health_at_spawn_total;
    }
}

/// The default aggregate produced by `Engine::simulate`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub trials: u64,
    pub min_duration_ms: Option<Millis>,
    pub max_duration_ms: Option<Millis>,
    /// Sum of trial durations; wide enough for `u32::MAX` trials of `u64::MAX` ms
    pub total_duration_ms: u128,
    pub events_applied: u64,
    pub events_skipped: u64,
    pub events_by_tag: AHashMap<EventTag, u64>,
    pub enemies: AHashMap<String, EnemyStats>,
}

impl AggregateResult {
    pub fn mean_duration_ms(&self) -> Option<f64> {
        (self.trials > 0).then(|| self.total_duration_ms as f64 / self.trials as f64)
    }

    /// Mean number of enemies spawned per trial
    pub fn mean_enemies_per_trial(&self) -> Option<f64> {
        let spawned: u64 = self.enemies.values().map(|e| e.spawns).sum();
        (self.trials > 0).then(|| spawned as f64 / self.trials as f64)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn summary(&self) -> String {
        let mut lines = vec![format!(
            "{} trials, duration {}..{} ms (mean {:.0} ms)\n{} events applied, {} skipped",
            self.trials,
            self.min_duration_ms.unwrap_or(0),
            self.max_duration_ms.unwrap_or(0),
            self.mean_duration_ms().unwrap_or(0.0),
            self.events_applied,
            self.events_skipped,
        )];

        let mut names: Vec<_> = self.enemies.keys().collect();
        names.sort();
        for name in names {
            let stats = &self.enemies[name];
            lines.push(format!(
                "  {:<20} spawns {:>8}  mean health at spawn {:.3}",
                name,
                stats.spawns,
                stats.mean_health_at_spawn().unwrap_or(0.0),
            ));
        }
        lines.join("\n")
    }
}

fn merge_min(a: Option<Millis>, b: Option<Millis>) -> Option<Millis> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

fn merge_max(a: Option<Millis>, b: Option<Millis>) -> Option<Millis> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

impl Summary for AggregateResult {
    fn empty() -> Self {
        Self::default()
    }

    fn observe(trial: &TrialRecord) -> Self {
        let mut enemies: AHashMap<String, EnemyStats> = AHashMap::new();
        for enemy in &trial.state.enemies {
            let stats = enemies.entry(enemy.name.clone()).or_default();
            stats.spawns += 1;
            stats.health_at_spawn_total += enemy.health_at_spawn(trial.duration);
        }

        Self {
            trials: 1,
            min_duration_ms: Some(trial.duration),
            max_duration_ms: Some(trial.duration),
            total_duration_ms: trial.duration as u128,
            events_applied: trial.events_applied as u64,
            events_skipped: trial.events_skipped as u64,
            events_by_tag: trial
                .tag_counts
                .iter()
                .map(|(&tag, &count)| (tag, count as u64))
                .collect(),
            enemies,
        }
    }

    fn merge(mut self, other: Self) -> Self {
        self.trials += other.trials;
        self.min_duration_ms = merge_min(self.min_duration_ms, other.min_duration_ms);
        self.max_duration_ms = merge_max(self.max_duration_ms, other.max_duration_ms);
        self.total_duration_ms += other.total_duration_ms;
        self.events_applied += other.events_applied;
        self.events_skipped += other.events_skipped;
        for (tag, count) in other.events_by_tag {
            *self.events_by_tag.entry(tag).or_insert(0) += count;
        }
        for (name, stats) in &other.enemies {
            self.enemies.entry(name.clone()).or_default().merge(stats);
        }
        self
    }
}
