//! Piecewise-linear progression curves
//!
//! A curve maps encounter progress in [0, 1] to a value, defined by a set
//! of control points. Enemy health schedules are the main consumer.

pub mod health;
pub mod interpolate;

pub use health::{CurvePreset, HealthCurve};
pub use interpolate::{map_interpolate, ControlPoints};
