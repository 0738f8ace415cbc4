//! Process behavior chart (XmR) analysis of a throughput series.
//!
//! Unpredictable data is a normal outcome and is reported through the
//! verdict; only structurally invalid input is an error.

use thiserror::Error;

use crate::domain::quality::{QualityVerdict, Signal, SignalKind};
use crate::domain::throughput::ThroughputSeries;

/// Scaling constant turning the average moving range into natural process
/// limits.
pub const LIMIT_SCALING: f64 = 2.66;
pub const RUN_LENGTH: usize = 8;
pub const TREND_LENGTH: usize = 6;
/// Shorter series are penalized in the predictability score.
pub const MIN_RELIABLE_POINTS: usize = 10;
/// Relative slack for comparisons against the average and the limits, which
/// carry rounding error from the summation.
const RELATIVE_TOLERANCE: f64 = 1e-9;

const POINT_PENALTY: i32 = 15;
const RUN_PENALTY: i32 = 10;
const TREND_PENALTY: i32 = 8;
const SHORT_SERIES_PENALTY: i32 = 10;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QualityGateError {
    #[error("throughput series is empty")]
    EmptySeries,
    #[error("value at position {index} is not a finite number")]
    NonNumeric { index: usize },
}

pub fn analyze(series: &ThroughputSeries) -> Result<QualityVerdict, QualityGateError> {
    analyze_values(series.values())
}

pub fn analyze_values(values: &[f64]) -> Result<QualityVerdict, QualityGateError> {
    if values.is_empty() {
        return Err(QualityGateError::EmptySeries);
    }
    if let Some(index) = values.iter().position(|value| !value.is_finite()) {
        return Err(QualityGateError::NonNumeric { index });
    }

    let average = values.iter().sum::<f64>() / values.len() as f64;
    let moving_range_average = moving_range_average(values);
    let upper_limit = average + LIMIT_SCALING * moving_range_average;
    let lower_limit = (average - LIMIT_SCALING * moving_range_average).max(0.0);
    let tolerance = RELATIVE_TOLERANCE * average.abs().max(1.0);

    let mut signals = points_beyond_limits(values, lower_limit, upper_limit, tolerance);
    signals.extend(runs_about_average(values, average, tolerance));
    signals.extend(trends(values));
    signals.sort_by_key(|signal| (signal.start, signal.kind));

    let score = predictability_score(&signals, values.len());
    Ok(QualityVerdict {
        samples: values.len(),
        average,
        moving_range_average,
        upper_limit,
        lower_limit,
        is_predictable: signals.is_empty(),
        signals,
        score,
    })
}

fn moving_range_average(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let total: f64 = values
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).abs())
        .sum();
    total / (values.len() - 1) as f64
}

fn points_beyond_limits(
    values: &[f64],
    lower_limit: f64,
    upper_limit: f64,
    tolerance: f64,
) -> Vec<Signal> {
    values
        .iter()
        .enumerate()
        .filter(|(_, value)| **value > upper_limit + tolerance || **value < lower_limit - tolerance)
        .map(|(index, _)| Signal {
            kind: SignalKind::PointBeyondLimit,
            start: index,
            end: index,
        })
        .collect()
}

/// Maximal stretches of at least `RUN_LENGTH` points strictly on one side of
/// the average. A point within `tolerance` of the average ends a run.
fn runs_about_average(values: &[f64], average: f64, tolerance: f64) -> Vec<Signal> {
    let sides: Vec<Option<bool>> = values
        .iter()
        .map(|value| direction(average, *value, tolerance))
        .collect();
    maximal_stretches(&sides, RUN_LENGTH)
        .into_iter()
        .map(|(start, end)| Signal {
            kind: SignalKind::Run,
            start,
            end,
        })
        .collect()
}

/// Maximal stretches of at least `TREND_LENGTH` points moving strictly in one
/// direction.
fn trends(values: &[f64]) -> Vec<Signal> {
    let steps: Vec<Option<bool>> = values
        .windows(2)
        .map(|pair| direction(pair[0], pair[1], 0.0))
        .collect();
    // Step `i` joins points `i` and `i + 1`.
    maximal_stretches(&steps, TREND_LENGTH - 1)
        .into_iter()
        .map(|(first_step, last_step)| Signal {
            kind: SignalKind::Trend,
            start: first_step,
            end: last_step + 1,
        })
        .collect()
}

/// `Some(true)` above the reference, `Some(false)` below, `None` within
/// `tolerance` of it.
fn direction(reference: f64, value: f64, tolerance: f64) -> Option<bool> {
    if value > reference + tolerance {
        Some(true)
    } else if value < reference - tolerance {
        Some(false)
    } else {
        None
    }
}

/// Inclusive index ranges of equal `Some` markers at least `min_len` long.
fn maximal_stretches(markers: &[Option<bool>], min_len: usize) -> Vec<(usize, usize)> {
    let mut stretches = Vec::new();
    let mut start = 0;
    while start < markers.len() {
        let Some(side) = markers[start] else {
            start += 1;
            continue;
        };
        let mut end = start;
        while end + 1 < markers.len() && markers[end + 1] == Some(side) {
            end += 1;
        }
        if end - start + 1 >= min_len {
            stretches.push((start, end));
        }
        start = end + 1;
    }
    stretches
}

fn predictability_score(signals: &[Signal], samples: usize) -> u8 {
    let mut score = 100_i32;
    for signal in signals {
        score -= match signal.kind {
            SignalKind::PointBeyondLimit => POINT_PENALTY,
            SignalKind::Run => RUN_PENALTY,
            SignalKind::Trend => TREND_PENALTY,
        };
    }
    if samples < MIN_RELIABLE_POINTS {
        score -= SHORT_SERIES_PENALTY;
    }
    score.clamp(0, 100) as u8
}
