//! Pre-determined enemy health schedules
//!
//! A `HealthCurve` answers "what fraction of its health does this enemy have
//! left when the encounter is `progress` of the way through?". Progress is
//! computed by callers as `elapsed / encounter_length`.

use derive_more::Display;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::curve::interpolate::{map_interpolate, ControlPoints};

/// Named health curve shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurvePreset {
    /// Health drains at a constant rate over the encounter
    #[display(fmt = "uniform")]
    Uniform,
    /// Opening cooldowns take a large chunk early, then a steady drain
    #[display(fmt = "burst")]
    Burst,
    /// Steady drain that accelerates in the final stretch
    #[display(fmt = "execute")]
    Execute,
    /// Both an opening burst and an accelerated finish
    #[display(fmt = "burst_and_execute")]
    BurstAndExecute,
}

impl CurvePreset {
    pub const ALL: [CurvePreset; 4] = [
        CurvePreset::Uniform,
        CurvePreset::Burst,
        CurvePreset::Execute,
        CurvePreset::BurstAndExecute,
    ];

    /// Build the curve for this preset
    pub fn curve(self) -> HealthCurve {
        match self {
            CurvePreset::Uniform => HealthCurve::uniform(),
            CurvePreset::Burst => HealthCurve::burst(),
            CurvePreset::Execute => HealthCurve::execute(),
            CurvePreset::BurstAndExecute => HealthCurve::burst_and_execute(),
        }
    }
}

/// Linear interpolation between construction-time control points
///
/// Control points map time progress to remaining health fraction, e.g. a
/// uniform curve is `{ 0.0 => 1.0, 1.0 => 0.0 }`. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthCurve {
    control_points: ControlPoints,
}

impl HealthCurve {
    /// Build a curve from `(progress, health)` pairs.
    ///
    /// A repeated progress key keeps the last value given for it.
    pub fn new(points: impl IntoIterator<Item = (f64, f64)>) -> Self {
        Self {
            control_points: points
                .into_iter()
                .map(|(progress, health)| (OrderedFloat(progress), health))
                .collect(),
        }
    }

    /// Remaining health fraction at `progress` through the encounter.
    ///
    /// `progress` must lie in [0, 1]. Debug builds assert this; release
    /// builds clamp into [0, 1] and treat NaN as 0.0.
    pub fn value_at(&self, progress: f64) -> f64 {
        debug_assert!(
            (0.0..=1.0).contains(&progress),
            "progress {} outside [0, 1]",
            progress
        );
        let progress = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };
        map_interpolate(progress, &self.control_points)
    }

    /// Iterate `(progress, health)` control points in ascending progress
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.control_points.iter().map(|(k, &v)| (k.0, v))
    }

    pub fn len(&self) -> usize {
        self.control_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.control_points.is_empty()
    }

    // === PRESETS ===

    pub fn uniform() -> Self {
        Self::new([(0.0, 1.0), (1.0, 0.0)])
    }

    /// 30% of health gone in the first 15% of the encounter
    pub fn burst() -> Self {
        Self::new([(0.0, 1.0), (0.15, 0.7), (1.0, 0.0)])
    }

    /// Final 20% of health goes in the last 15% of the encounter
    pub fn execute() -> Self {
        Self::new([(0.0, 1.0), (0.85, 0.2), (1.0, 0.0)])
    }

    pub fn burst_and_execute() -> Self {
        Self::new([(0.0, 1.0), (0.15, 0.7), (0.85, 0.2), (1.0, 0.0)])
    }
}
