//! The trial engine
//!
//! `Engine` owns a fixed-size rayon pool. Each `simulate` call builds its
//! schedule once and runs `trials` independent trials against it on the
//! pool. Trials are folded in fixed-size chunks of consecutive indices, and
//! the chunk summaries are then merged in index order, so the result does
//! not depend on the worker count.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::core::config::EngineConfig;
use crate::core::error::{Result, SimError};
use crate::engine::outcome::{AggregateResult, Summary};
use crate::engine::trial::run_trial;
use crate::schedule::{EncounterDescription, Schedule};

/// Consecutive trials folded into one partial summary
pub(crate) const TRIALS_PER_CHUNK: usize = 256;

#[derive(Debug)]
struct Admission {
    accepting: bool,
    in_flight: usize,
}

/// Tracks in-flight `simulate` calls so shutdown can wait for them
#[derive(Debug)]
struct Lifecycle {
    admission: Mutex<Admission>,
    idle: Condvar,
    cancelled: AtomicBool,
}

impl Lifecycle {
    fn new() -> Self {
        Self {
            admission: Mutex::new(Admission {
                accepting: true,
                in_flight: 0,
            }),
            idle: Condvar::new(),
            cancelled: AtomicBool::new(false),
        }
    }

    fn enter(&self) -> Result<InFlight<'_>> {
        let mut admission = self.admission.lock().unwrap_or_else(|e| e.into_inner());
        if !admission.accepting {
            return Err(SimError::ShuttingDown);
        }
        admission.in_flight += 1;
        Ok(InFlight(self))
    }

    fn close_and_wait(&self) {
        let mut admission = self.admission.lock().unwrap_or_else(|e| e.into_inner());
        admission.accepting = false;
        while admission.in_flight > 0 {
            admission = self.idle.wait(admission).unwrap_or_else(|e| e.into_inner());
        }
    }
}

struct InFlight<'a>(&'a Lifecycle);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut admission = self.0.admission.lock().unwrap_or_else(|e| e.into_inner());
        admission.in_flight -= 1;
        if admission.in_flight == 0 {
            self.0.idle.notify_all();
        }
    }
}

/// Runs encounter simulations on a fixed worker pool
pub struct Engine {
    pool: ThreadPool,
    config: EngineConfig,
    lifecycle: Lifecycle,
}

impl Engine {
    /// Engine with `worker_count` threads and default trial settings
    pub fn new(worker_count: usize) -> Result<Self> {
        Self::with_config(EngineConfig::with_workers(worker_count))
    }

    pub fn with_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.worker_count)
            .thread_name(|i| format!("sim-worker-{}", i))
            .build()?;

        tracing::info!(
            workers = config.worker_count,
            trials = config.trials,
            "Simulation engine started"
        );

        Ok(Self {
            pool,
            config,
            lifecycle: Lifecycle::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn worker_count(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Whether new `simulate` calls are being admitted
    pub fn is_accepting(&self) -> bool {
        self.lifecycle
            .admission
            .lock()
            .map(|a| a.accepting)
            .unwrap_or(false)
    }

    /// Number of `simulate` calls currently admitted and running
    pub fn in_flight(&self) -> usize {
        self.lifecycle
            .admission
            .lock()
            .map(|a| a.in_flight)
            .unwrap_or(0)
    }

    /// Simulate `description` and return the default aggregate
    pub fn simulate(&self, description: &EncounterDescription) -> Result<AggregateResult> {
        self.simulate_with(description)
    }

    /// Simulate `description`, reducing trials with a caller-chosen summary.
    ///
    /// Blocks until every trial has finished. Fails as a whole if the
    /// description is invalid, the engine is shutting down, a trial is
    /// cancelled, or a trial panics.
    pub fn simulate_with<S: Summary>(&self, description: &EncounterDescription) -> Result<S> {
        let _in_flight = self.lifecycle.enter()?;
        description.validate()?;

        let schedule = Schedule::build(description);
        let trials = self.config.trials;
        let seed = self.config.seed;
        let cancelled = &self.lifecycle.cancelled;

        tracing::info!(
            trials,
            events = schedule.len(),
            min_time = schedule.min_time,
            max_time = schedule.max_time,
            "Running simulation"
        );

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let chunks = self.pool.install(|| {
                (0..trials)
                    .into_par_iter()
                    .fold_chunks(
                        TRIALS_PER_CHUNK,
                        || Ok(S::empty()),
                        |acc: Result<S>, index| {
                            let partial = acc?;
                            let record = run_trial(&schedule, seed, index, cancelled)?;
                            Ok(partial.merge(S::observe(&record)))
                        },
                    )
                    .collect::<Vec<Result<S>>>()
            });
            chunks
                .into_iter()
                .try_fold(S::empty(), |result, chunk| chunk.map(|c| result.merge(c)))
        }));

        let result = outcome.map_err(|payload| {
            let message = panic_message(payload.as_ref());
            tracing::error!("Trial panicked: {}", message);
            SimError::TrialPanicked(message)
        })??;

        tracing::info!("Simulation complete");
        Ok(result)
    }

    /// Stop admitting new simulations and wait for in-flight ones to finish
    pub fn shutdown(&self) {
        tracing::info!("Simulation engine shutting down, draining in-flight work");
        self.lifecycle.close_and_wait();
        tracing::info!("Simulation engine drained");
    }

    /// Like `shutdown`, but asks in-flight trials to stop between events
    pub fn abort(&self) {
        self.lifecycle.cancelled.store(true, Ordering::Relaxed);
        self.shutdown();
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn small_engine(workers: usize, trials: u32) -> Engine {
        Engine::with_config(EngineConfig {
            worker_count: workers,
            trials,
            seed: 99,
        })
        .unwrap()
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(matches!(Engine::new(0), Err(SimError::InvalidWorkerCount(0))));
    }

    #[test]
    fn test_worker_count() {
        let engine = Engine::new(3).unwrap();
        assert_eq!(engine.worker_count(), 3);
        assert!(engine.is_accepting());
    }

    #[test]
    fn test_simulate_counts_trials() {
        let engine = small_engine(2, 64);
        let desc = EncounterDescription::new(0, 10_000).with_spawn(500, "Boss", "uniform");
        let result = engine.simulate(&desc).unwrap();

        assert_eq!(result.trials, 64);
        assert!(result.min_duration_ms.unwrap() <= result.max_duration_ms.unwrap());
        assert!(result.max_duration_ms.unwrap() <= 10_000);
        assert_eq!(
            result.events_applied + result.events_skipped,
            64,
            "each trial either applies or skips the single spawn"
        );
    }

    #[test]
    fn test_invalid_description_fails_whole_call() {
        let engine = small_engine(2, 8);
        let desc = EncounterDescription::new(1000, 10);
        assert!(matches!(
            engine.simulate(&desc),
            Err(SimError::InvalidTimeWindow { .. })
        ));
    }

    #[test]
    fn test_shutdown_rejects_new_work() {
        let engine = small_engine(2, 4);
        engine.shutdown();
        assert!(!engine.is_accepting());
        assert!(matches!(
            engine.simulate(&EncounterDescription::default()),
            Err(SimError::ShuttingDown)
        ));
    }

    #[test]
    fn test_shutdown_waits_for_in_flight() {
        let engine = Arc::new(small_engine(2, 20_000));
        let desc = EncounterDescription::new(0, 10_000).with_spawn(0, "Boss", "uniform");

        let worker = {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || engine.simulate(&desc))
        };
        // Give the call a chance to be admitted first
        std::thread::sleep(std::time::Duration::from_millis(20));
        engine.shutdown();

        let outcome = worker.join().unwrap();
        // Either admitted and finished in full, or refused outright
        match outcome {
            Ok(result) => assert_eq!(result.trials, 20_000),
            Err(e) => assert!(matches!(e, SimError::ShuttingDown)),
        }
    }

    #[test]
    fn test_window_near_u64_max() {
        let engine = small_engine(4, 64);
        let desc = EncounterDescription::new(u64::MAX - 10, u64::MAX)
            .with_spawn(u64::MAX, "Last Second", "uniform");
        let result = engine.simulate(&desc).unwrap();

        assert_eq!(result.trials, 64);
        assert!(result.min_duration_ms.unwrap() >= u64::MAX - 10);
        assert!(result.total_duration_ms > u64::MAX as u128);
        let mean = result.mean_duration_ms().unwrap();
        assert!(mean >= (u64::MAX - 10) as f64 && mean <= u64::MAX as f64);
    }

    #[test]
    fn test_trial_count_not_multiple_of_chunk() {
        let trials = (TRIALS_PER_CHUNK * 3 + 17) as u32;
        let engine = small_engine(3, trials);
        let result = engine.simulate(&EncounterDescription::new(0, 100)).unwrap();
        assert_eq!(result.trials, trials as u64);
    }

    struct Panicky;

    impl Summary for Panicky {
        fn empty() -> Self {
            Panicky
        }
        fn observe(trial: &crate::engine::trial::TrialRecord) -> Self {
            if trial.index == 3 {
                panic!("boom on trial 3");
            }
            Panicky
        }
        fn merge(self, _other: Self) -> Self {
            self
        }
    }

    #[test]
    fn test_panicking_trial_fails_call() {
        let engine = small_engine(2, 8);
        match engine.simulate_with::<Panicky>(&EncounterDescription::default()) {
            Err(SimError::TrialPanicked(message)) => assert!(message.contains("boom")),
            Err(other) => panic!("unexpected error {other}"),
            Ok(_) => panic!("expected a panic to surface"),
        }
        // The pool survives and keeps serving
        assert!(engine.simulate(&EncounterDescription::default()).is_ok());
    }
}
