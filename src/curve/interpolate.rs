//! Linear interpolation over an ordered map of control points

use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};

use ordered_float::OrderedFloat;

/// Control points keyed by x, sorted ascending
pub type ControlPoints = BTreeMap<OrderedFloat<f64>, f64>;

/// Evaluate the piecewise-linear function described by `points` at `x`.
///
/// - An exact key returns its stored value unchanged.
/// - Between two keys the bracketing pair is interpolated linearly.
/// - Outside the key span the nearest endpoint value is returned.
/// - An empty map evaluates to 0.0.
pub fn map_interpolate(x: f64, points: &ControlPoints) -> f64 {
    let key = OrderedFloat(x);
    if let Some(&value) = points.get(&key) {
        return value;
    }

    let below = points.range(..key).next_back();
    let above = points.range((Excluded(key), Unbounded)).next();

    match (below, above) {
        (Some((&OrderedFloat(x0), &y0)), Some((&OrderedFloat(x1), &y1))) => {
            let t = (x - x0) / (x1 - x0);
            y0 + t * (y1 - y0)
        }
        (Some((_, &y)), None) | (None, Some((_, &y))) => y,
        (None, None) => 0.0,
    }
}
