//! Percentile helpers for already-sorted slices.
//!
//! - Empty input => `None` (or all-zero percentiles for the summary).
//! - `percentile <= 0` => first element.
//! - `percentile >= 100` => last element.
//! - Otherwise we compute a position within `[0, len-1]` and interpolate
//!   linearly between the two neighbouring ranks.

use crate::domain::distribution::Percentiles;

/// Returns the percentile value from a slice that is already sorted in
/// ascending order.
pub fn value_sorted(sorted_values: &[f64], percentile: f64) -> Option<f64> {
    let last = sorted_values.len().checked_sub(1)?;

    if percentile <= 0.0 {
        return sorted_values.first().copied();
    }
    if percentile >= 100.0 {
        return sorted_values.get(last).copied();
    }

    let position = (percentile / 100.0) * last as f64;
    let lower = position.floor() as usize;
    let upper = (lower + 1).min(last);
    let fraction = position - lower as f64;
    let low = sorted_values[lower];
    let high = sorted_values[upper];
    Some(low + (high - low) * fraction)
}

/// P10/P50/P85/P90/P95 of an ascending slice.
pub fn summarize_sorted(sorted_values: &[f64]) -> Percentiles {
    let mut levels = Percentiles::LEVELS;
    for level in levels.iter_mut() {
        *level = value_sorted(sorted_values, *level).unwrap_or(0.0);
    }
    Percentiles::from_levels(levels)
}

pub fn sort_ascending(values: &mut [f64]) {
    values.sort_by(f64::total_cmp);
}
