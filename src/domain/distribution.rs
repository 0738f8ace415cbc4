use std::fmt;

use serde::Serialize;

/// Completion time, in periods, at the reported confidence levels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Percentiles {
    pub p10: f64,
    pub p50: f64,
    pub p85: f64,
    pub p90: f64,
    pub p95: f64,
}

impl Percentiles {
    pub const LEVELS: [f64; 5] = [10.0, 50.0, 85.0, 90.0, 95.0];

    pub fn from_levels(values: [f64; 5]) -> Self {
        let [p10, p50, p85, p90, p95] = values;
        Self {
            p10,
            p50,
            p85,
            p90,
            p95,
        }
    }

    pub fn as_levels(&self) -> [f64; 5] {
        [self.p10, self.p50, self.p85, self.p90, self.p95]
    }

    /// Level-wise maximum.
    pub fn max(&self, other: &Percentiles) -> Percentiles {
        let mut levels = self.as_levels();
        for (value, other) in levels.iter_mut().zip(other.as_levels()) {
            *value = value.max(other);
        }
        Percentiles::from_levels(levels)
    }

    pub fn is_ordered(&self) -> bool {
        self.as_levels().windows(2).all(|pair| pair[0] <= pair[1])
    }
}

/// Cumulative work completed after each period of one trial.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BurnDownTrajectory {
    pub trial: usize,
    /// Backlog of this trial after split-rate growth.
    pub target: f64,
    pub cumulative_completed: Vec<f64>,
    pub completed: bool,
}

impl BurnDownTrajectory {
    /// Work still open after each period.
    pub fn remaining(&self) -> Vec<f64> {
        self.cumulative_completed
            .iter()
            .map(|done| (self.target - done).max(0.0))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimulationWarning {
    /// Fewer samples than recommended; the forecast is still produced.
    ShortHistory { samples: usize, recommended: usize },
    /// Some trials hit the period ceiling and are recorded at the ceiling.
    NonConvergedTrials { trials: usize, max_periods: usize },
}

impl fmt::Display for SimulationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationWarning::ShortHistory {
                samples,
                recommended,
            } => write!(
                f,
                "only {samples} throughput samples available, at least {recommended} recommended"
            ),
            SimulationWarning::NonConvergedTrials {
                trials,
                max_periods,
            } => write!(
                f,
                "{trials} trials did not complete within {max_periods} periods"
            ),
        }
    }
}

/// Result of one Monte Carlo run. Built once by the engine and read-only
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionDistribution {
    backlog: f64,
    seed: u64,
    completion_times: Vec<f64>,
    percentiles: Percentiles,
    trajectories: Vec<BurnDownTrajectory>,
    non_converged_trials: usize,
    warnings: Vec<SimulationWarning>,
}

impl CompletionDistribution {
    pub(crate) fn from_parts(
        backlog: f64,
        seed: u64,
        completion_times: Vec<f64>,
        percentiles: Percentiles,
        trajectories: Vec<BurnDownTrajectory>,
        non_converged_trials: usize,
        warnings: Vec<SimulationWarning>,
    ) -> Self {
        Self {
            backlog,
            seed,
            completion_times,
            percentiles,
            trajectories,
            non_converged_trials,
            warnings,
        }
    }

    pub fn backlog(&self) -> f64 {
        self.backlog
    }

    /// Base seed the run used; re-running with it reproduces the result.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn trials(&self) -> usize {
        self.completion_times.len()
    }

    /// Per-trial completion times in ascending order.
    pub fn completion_times(&self) -> &[f64] {
        &self.completion_times
    }

    pub fn percentiles(&self) -> &Percentiles {
        &self.percentiles
    }

    pub fn trajectories(&self) -> &[BurnDownTrajectory] {
        &self.trajectories
    }

    pub fn non_converged_trials(&self) -> usize {
        self.non_converged_trials
    }

    pub fn warnings(&self) -> &[SimulationWarning] {
        &self.warnings
    }

    pub fn mean(&self) -> f64 {
        if self.completion_times.is_empty() {
            return 0.0;
        }
        self.completion_times.iter().sum::<f64>() / self.completion_times.len() as f64
    }

    /// Share of trials that finished within `periods`.
    pub fn probability_within(&self, periods: f64) -> f64 {
        if self.completion_times.is_empty() {
            return 0.0;
        }
        let finished = self
            .completion_times
            .partition_point(|time| *time <= periods);
        finished as f64 / self.completion_times.len() as f64
    }
}
