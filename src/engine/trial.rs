//! Single trial execution

use std::sync::atomic::{AtomicBool, Ordering};

use ahash::AHashMap;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::core::error::{Result, SimError};
use crate::core::types::Millis;
use crate::entity::WorldState;
use crate::schedule::{EventTag, Schedule};

/// Everything a trial leaves behind once its schedule has run
#[derive(Debug, Clone)]
pub struct TrialRecord {
    pub index: u32,
    /// Encounter length drawn for this trial
    pub duration: Millis,
    pub state: WorldState,
    pub events_applied: u32,
    /// Events scheduled after this trial's encounter already ended
    pub events_skipped: u32,
    pub tag_counts: AHashMap<EventTag, u32>,
}

/// RNG for trial `index`; one ChaCha stream per trial off a shared seed
pub fn trial_rng(seed: u64, index: u32) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(index as u64);
    rng
}

/// Draw an encounter length uniformly from the schedule's window
///
/// A degenerate or inverted window yields `min_time`.
pub fn draw_duration(schedule: &Schedule, rng: &mut ChaCha8Rng) -> Millis {
    if schedule.max_time <= schedule.min_time {
        return schedule.min_time;
    }
    rng.gen_range(schedule.min_time..=schedule.max_time)
}

/// Run one trial of `schedule` against a fresh world state.
///
/// Events are applied in schedule order; any whose timestamp is past the
/// drawn duration is skipped. `cancel` is checked between events.
pub fn run_trial(
    schedule: &Schedule,
    seed: u64,
    index: u32,
    cancel: &AtomicBool,
) -> Result<TrialRecord> {
    let mut rng = trial_rng(seed, index);
    let duration = draw_duration(schedule, &mut rng);

    let mut state = WorldState::seeded(rng.gen());
    let mut events_applied = 0;
    let mut events_skipped = 0;
    let mut tag_counts = AHashMap::new();

    for event in schedule.events() {
        if cancel.load(Ordering::Relaxed) {
            return Err(SimError::Cancelled);
        }
        if event.timestamp() > duration {
            events_skipped += 1;
            continue;
        }
        event.apply(&mut state);
        events_applied += 1;
        *tag_counts.entry(event.tag()).or_insert(0) += 1;
    }

    Ok(TrialRecord {
        index,
        duration,
        state,
        events_applied,
        events_skipped,
        tag_counts,
    })
}
