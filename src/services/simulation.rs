use rand::Rng;
use rand::seq::SliceRandom;
use rand_distr::{Bernoulli, Distribution, Uniform};
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::distribution::{BurnDownTrajectory, CompletionDistribution, SimulationWarning};
use crate::domain::simulation_config::{SimulationConfig, ValidationError};
use crate::domain::throughput::ThroughputSeries;
use crate::services::percentiles::{sort_ascending, summarize_sorted};
use crate::services::random_streams::{resolve_seed, stream_rng};

/// Below this many samples the forecast carries a short-history warning.
pub const MIN_RECOMMENDED_SAMPLES: usize = 5;

/// At the end of the ramp-up the team works at `1 - e^-3`, about 95%, of its
/// full throughput.
const RAMP_UP_STEEPNESS: f64 = 3.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("invalid simulation config: {0}")]
    Validation(#[from] ValidationError),
    #[error("throughput data is empty")]
    InsufficientData,
    #[error("none of the {trials} trials completed the backlog within {max_periods} periods")]
    NonConvergence { trials: usize, max_periods: usize },
}

/// Runs the Monte Carlo forecast of `config.backlog` against the sampled
/// throughput.
///
/// Trials run in parallel; each one owns a random stream derived from the
/// base seed and its trial index, so `config.seed` fully determines the
/// result.
pub fn simulate(
    series: &ThroughputSeries,
    config: &SimulationConfig,
) -> Result<CompletionDistribution, SimulationError> {
    simulate_with_seed(series, config, resolve_seed(config.seed))
}

pub(crate) fn simulate_with_seed(
    series: &ThroughputSeries,
    config: &SimulationConfig,
    seed: u64,
) -> Result<CompletionDistribution, SimulationError> {
    config.validate()?;
    if series.is_empty() {
        return Err(SimulationError::InsufficientData);
    }

    let mut warnings = Vec::new();
    if series.len() < MIN_RECOMMENDED_SAMPLES {
        warn!(
            samples = series.len(),
            recommended = MIN_RECOMMENDED_SAMPLES,
            "forecasting from a short throughput history"
        );
        warnings.push(SimulationWarning::ShortHistory {
            samples: series.len(),
            recommended: MIN_RECOMMENDED_SAMPLES,
        });
    }

    let modifiers = Modifiers::from_config(config)?;
    debug!(
        backlog = config.backlog,
        trials = config.trials,
        samples = series.len(),
        seed,
        "running monte carlo simulation"
    );

    let outcomes: Vec<TrialOutcome> = (0..config.trials)
        .into_par_iter()
        .map(|trial| {
            let mut rng = stream_rng(seed, trial as u64);
            let keep_trajectory = trial < config.trajectory_samples;
            run_trial(series.values(), config, &modifiers, keep_trajectory, &mut rng)
        })
        .collect();

    let non_converged = outcomes.iter().filter(|outcome| !outcome.completed).count();
    if non_converged == config.trials {
        return Err(SimulationError::NonConvergence {
            trials: config.trials,
            max_periods: config.max_periods,
        });
    }
    if non_converged > 0 {
        warn!(
            non_converged,
            max_periods = config.max_periods,
            "trials hit the period ceiling"
        );
        warnings.push(SimulationWarning::NonConvergedTrials {
            trials: non_converged,
            max_periods: config.max_periods,
        });
    }

    let mut completion_times = Vec::with_capacity(outcomes.len());
    let mut trajectories = Vec::new();
    for (trial, outcome) in outcomes.into_iter().enumerate() {
        completion_times.push(outcome.periods);
        if let Some(cumulative_completed) = outcome.trajectory {
            trajectories.push(BurnDownTrajectory {
                trial,
                target: outcome.target,
                cumulative_completed,
                completed: outcome.completed,
            });
        }
    }
    sort_ascending(&mut completion_times);
    let percentiles = summarize_sorted(&completion_times);

    Ok(CompletionDistribution::from_parts(
        config.backlog,
        seed,
        completion_times,
        percentiles,
        trajectories,
        non_converged,
        warnings,
    ))
}

struct TrialOutcome {
    periods: f64,
    target: f64,
    completed: bool,
    trajectory: Option<Vec<f64>>,
}

/// Optional modifiers, resolved once per run.
struct Modifiers<'a> {
    ramp_up_periods: Option<f64>,
    contributors: Option<(Uniform<u32>, f64)>,
    lead_times: Option<&'a [f64]>,
    split_rates: Option<&'a [f64]>,
    risks: Vec<(Bernoulli, f64)>,
}

impl<'a> Modifiers<'a> {
    fn from_config(config: &'a SimulationConfig) -> Result<Self, ValidationError> {
        let risks = config
            .risks
            .iter()
            .map(|risk| {
                Bernoulli::new(risk.probability)
                    .map(|event| (event, risk.impact))
                    .map_err(|_| ValidationError::InvalidRiskProbability {
                        name: risk.name.clone(),
                        probability: risk.probability,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            ramp_up_periods: config.ramp_up_periods.map(f64::from),
            contributors: config.contributors.map(|range| {
                (
                    Uniform::new_inclusive(range.min, range.max),
                    f64::from(range.max),
                )
            }),
            lead_times: config.lead_time_samples.as_deref(),
            split_rates: config.split_rate_multipliers.as_deref(),
            risks,
        })
    }

    fn split_multiplier<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.split_rates
            .and_then(|rates| rates.choose(rng).copied())
            .unwrap_or(1.0)
    }

    /// Share of the sampled throughput delivered in `period` (1-based).
    fn capacity<R: Rng + ?Sized>(&self, period: usize, rng: &mut R) -> f64 {
        let period = period as f64;
        let ramp = match self.ramp_up_periods {
            Some(length) if period <= length => {
                1.0 - (-RAMP_UP_STEEPNESS * period / length).exp()
            }
            _ => 1.0,
        };
        let availability = match &self.contributors {
            Some((contributors, full_team)) => f64::from(contributors.sample(rng)) / full_team,
            None => 1.0,
        };
        ramp * availability
    }

    /// Items finishing in the last period were started before it; whatever
    /// part of their lead time exceeds one period extends the trial.
    fn lead_time_tail<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.lead_times
            .and_then(|samples| samples.choose(rng).copied())
            .map(|lead_time| (lead_time - 1.0).max(0.0))
            .unwrap_or(0.0)
    }

    fn risk_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let mut delay = 0.0;
        for (event, impact) in &self.risks {
            if event.sample(rng) {
                delay += impact;
            }
        }
        delay
    }
}

fn run_trial<R: Rng + ?Sized>(
    throughput_values: &[f64],
    config: &SimulationConfig,
    modifiers: &Modifiers<'_>,
    keep_trajectory: bool,
    rng: &mut R,
) -> TrialOutcome {
    let target = config.backlog * modifiers.split_multiplier(rng);
    let mut trajectory = keep_trajectory.then(Vec::new);
    let mut completed_work = 0.0_f64;
    let mut periods = 0usize;

    while completed_work < target {
        if periods == config.max_periods {
            return TrialOutcome {
                periods: periods as f64,
                target,
                completed: false,
                trajectory,
            };
        }
        periods += 1;
        let sampled = throughput_values.choose(rng).copied().unwrap_or(0.0);
        completed_work += sampled * modifiers.capacity(periods, rng);
        if let Some(cumulative) = trajectory.as_mut() {
            cumulative.push(completed_work);
        }
    }

    // Nothing was left to do, so neither lead time nor risks can delay it.
    if periods == 0 {
        return TrialOutcome {
            periods: 0.0,
            target,
            completed: true,
            trajectory,
        };
    }

    let total = periods as f64 + modifiers.lead_time_tail(rng) + modifiers.risk_delay(rng);
    TrialOutcome {
        periods: total,
        target,
        completed: true,
        trajectory,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::risk::RiskEvent;
    use crate::test_support::series;

    #[test]
    fn zero_backlog_is_degenerate_at_zero() {
        let config = SimulationConfig::new(0.0)
            .with_trials(50)
            .with_seed(1)
            .with_risk(RiskEvent::new("always", 1.0, 4.0));

        let distribution = simulate(&series(&[3.0, 5.0, 8.0, 2.0, 4.0]), &config).unwrap();

        assert_eq!(distribution.trials(), 50);
        assert!(distribution.completion_times().iter().all(|time| *time == 0.0));
        assert_eq!(distribution.percentiles().p95, 0.0);
    }

    #[test]
    fn constant_throughput_completes_in_ceil_of_backlog_over_rate() {
        let test_cases = vec![(5.0, 50.0, 10.0), (5.0, 52.0, 11.0), (4.0, 10.0, 3.0)];

        for (rate, backlog, expected) in test_cases {
            let config = SimulationConfig::new(backlog).with_trials(200).with_seed(7);
            let distribution = simulate(&series(&[rate; 6]), &config).unwrap();
            assert!(
                distribution
                    .completion_times()
                    .iter()
                    .all(|time| *time == expected),
                "rate {rate}, backlog {backlog}: expected {expected}"
            );
        }
    }

    #[test]
    fn realistic_series_falls_in_plausible_band() {
        let config = SimulationConfig::new(50.0).with_seed(2026);
        let distribution =
            simulate(&series(&[5.0, 6.0, 7.0, 4.0, 8.0, 6.0, 5.0, 7.0]), &config).unwrap();

        let percentiles = distribution.percentiles();
        assert_eq!(distribution.trials(), 10_000);
        assert!((6.0..=11.0).contains(&percentiles.p50), "p50 {}", percentiles.p50);
        assert!((8.0..=14.0).contains(&percentiles.p85), "p85 {}", percentiles.p85);
        assert!(percentiles.is_ordered());
        assert!(distribution.warnings().is_empty());
    }

    #[test]
    fn same_seed_reproduces_the_distribution() {
        let config = SimulationConfig::new(40.0).with_trials(500).with_seed(99);
        let throughput = series(&[1.0, 3.0, 6.0, 2.0, 9.0, 4.0]);

        let first = simulate(&throughput, &config).unwrap();
        let second = simulate(&throughput, &config).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.seed(), 99);
    }

    #[test]
    fn rejects_invalid_config_and_empty_series() {
        let error = simulate(&series(&[1.0]), &SimulationConfig::new(-3.0)).unwrap_err();
        assert_eq!(
            error,
            SimulationError::Validation(ValidationError::InvalidBacklog(-3.0))
        );

        let error = simulate(&series(&[]), &SimulationConfig::new(3.0)).unwrap_err();
        assert_eq!(error, SimulationError::InsufficientData);
    }

    #[test]
    fn short_history_is_a_warning_not_an_error() {
        let config = SimulationConfig::new(10.0).with_trials(20).with_seed(3);
        let distribution = simulate(&series(&[2.0, 3.0]), &config).unwrap();

        assert_eq!(
            distribution.warnings(),
            &[SimulationWarning::ShortHistory {
                samples: 2,
                recommended: MIN_RECOMMENDED_SAMPLES,
            }]
        );
    }

    #[test]
    fn all_zero_throughput_fails_without_hanging() {
        let config = SimulationConfig::new(10.0)
            .with_trials(20)
            .with_seed(5)
            .with_max_periods(50);

        let error = simulate(&series(&[0.0; 8]), &config).unwrap_err();
        assert_eq!(
            error,
            SimulationError::NonConvergence {
                trials: 20,
                max_periods: 50,
            }
        );
    }

    #[test]
    fn trials_hitting_the_ceiling_are_flagged() {
        let config = SimulationConfig::new(5.0)
            .with_trials(200)
            .with_seed(11)
            .with_max_periods(10);

        let distribution =
            simulate(&series(&[0.0, 1.0, 0.0, 1.0, 0.0, 1.0]), &config).unwrap();

        let non_converged = distribution.non_converged_trials();
        assert!(non_converged > 0 && non_converged < 200);
        assert!(distribution.completion_times().iter().all(|time| *time <= 10.0));
        assert!(distribution.warnings().contains(&SimulationWarning::NonConvergedTrials {
            trials: non_converged,
            max_periods: 10,
        }));
    }

    #[test]
    fn certain_risk_adds_its_impact_to_every_trial() {
        let config = SimulationConfig::new(50.0)
            .with_trials(100)
            .with_seed(8)
            .with_risk(RiskEvent::new("audit", 1.0, 3.0))
            .with_risk(RiskEvent::new("never", 0.0, 40.0));

        let distribution = simulate(&series(&[5.0; 5]), &config).unwrap();
        assert!(distribution.completion_times().iter().all(|time| *time == 13.0));
    }

    #[test]
    fn split_rate_grows_the_backlog() {
        let config = SimulationConfig::new(50.0)
            .with_trials(100)
            .with_seed(8)
            .with_split_rates(vec![2.0]);

        let distribution = simulate(&series(&[5.0; 5]), &config).unwrap();
        assert!(distribution.completion_times().iter().all(|time| *time == 20.0));
    }

    #[test]
    fn lead_time_extends_each_trial() {
        let config = SimulationConfig::new(50.0)
            .with_trials(100)
            .with_seed(8)
            .with_lead_times(vec![3.0]);

        let distribution = simulate(&series(&[5.0; 5]), &config).unwrap();
        assert!(distribution.completion_times().iter().all(|time| *time == 12.0));
    }

    #[test]
    fn ramp_up_slows_early_periods() {
        // Periods 1..=4 deliver about 53%, 78%, 89% and 95% of 5 items,
        // 15.75 items in total, so 50 items need one extra period.
        let config = SimulationConfig::new(50.0)
            .with_trials(100)
            .with_seed(8)
            .with_ramp_up(4);

        let distribution = simulate(&series(&[5.0; 5]), &config).unwrap();
        assert!(distribution.completion_times().iter().all(|time| *time == 11.0));
    }

    #[test]
    fn partial_team_availability_stretches_the_forecast() {
        let config = SimulationConfig::new(8.0)
            .with_trials(1_000)
            .with_seed(21)
            .with_contributors(1, 2);

        let distribution = simulate(&series(&[4.0; 5]), &config).unwrap();
        let times = distribution.completion_times();
        assert!(times.iter().all(|time| (2.0..=4.0).contains(time)));
        assert!(times.iter().any(|time| *time > 2.0));
    }

    #[test]
    fn keeps_a_bounded_number_of_trajectories() {
        let mut config = SimulationConfig::new(12.0).with_trials(100).with_seed(4);
        config.trajectory_samples = 5;

        let distribution = simulate(&series(&[2.0, 3.0, 4.0, 5.0, 6.0]), &config).unwrap();
        let trajectories = distribution.trajectories();

        assert_eq!(trajectories.len(), 5);
        for (expected_trial, trajectory) in trajectories.iter().enumerate() {
            assert_eq!(trajectory.trial, expected_trial);
            assert!(trajectory.completed);
            let last = trajectory.cumulative_completed.last().copied().unwrap();
            assert!(last >= trajectory.target);
            assert_eq!(trajectory.remaining().last().copied(), Some(0.0));
        }
    }
}
