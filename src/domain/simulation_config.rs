use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::risk::RiskEvent;

pub const DEFAULT_TRIALS: usize = 10_000;
pub const DEFAULT_MAX_PERIODS: usize = 3_000;
pub const DEFAULT_TRAJECTORY_SAMPLES: usize = 25;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("backlog must be a finite, non-negative number (got {0})")]
    InvalidBacklog(f64),
    #[error("trials must be greater than zero")]
    InvalidTrials,
    #[error("max periods must be greater than zero")]
    InvalidMaxPeriods,
    #[error("ramp-up length must be greater than zero")]
    InvalidRampUp,
    #[error("contributor range {min}..={max} is invalid")]
    InvalidContributorRange { min: u32, max: u32 },
    #[error("{modifier} must contain finite, positive values")]
    InvalidModifierSamples { modifier: &'static str },
    #[error("risk '{name}' has probability {probability} outside [0, 1]")]
    InvalidRiskProbability { name: String, probability: f64 },
    #[error("risk '{name}' has invalid impact {impact}")]
    InvalidRiskImpact { name: String, impact: f64 },
    #[error("confidence percentile must be within (0, 100] (got {0})")]
    InvalidConfidence(f64),
    #[error("poor quality threshold must be within [0, 1] (got {0})")]
    InvalidQualityThreshold(f64),
}

/// Team availability, expressed as the number of contributors working in a
/// period. The historical throughput is assumed to have been produced by
/// `max` contributors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorRange {
    pub min: u32,
    pub max: u32,
}

/// Parameters of one Monte Carlo run.
///
/// Every modifier is optional; an absent modifier leaves the sampled
/// throughput untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub backlog: f64,
    pub trials: usize,
    /// Base seed of the per-trial random streams. A fresh one is drawn when
    /// absent.
    pub seed: Option<u64>,
    /// Trials still short of the backlog after this many periods are
    /// reported as not completed.
    pub max_periods: usize,
    /// How many trials keep their burn-down trajectory.
    pub trajectory_samples: usize,
    pub ramp_up_periods: Option<u32>,
    pub contributors: Option<ContributorRange>,
    /// Item lead times, in periods.
    pub lead_time_samples: Option<Vec<f64>>,
    /// Backlog growth factors; one is drawn per trial.
    pub split_rate_multipliers: Option<Vec<f64>>,
    pub risks: Vec<RiskEvent>,
}

impl SimulationConfig {
    pub fn new(backlog: f64) -> Self {
        Self {
            backlog,
            trials: DEFAULT_TRIALS,
            seed: None,
            max_periods: DEFAULT_MAX_PERIODS,
            trajectory_samples: DEFAULT_TRAJECTORY_SAMPLES,
            ramp_up_periods: None,
            contributors: None,
            lead_time_samples: None,
            split_rate_multipliers: None,
            risks: Vec::new(),
        }
    }

    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_periods(mut self, max_periods: usize) -> Self {
        self.max_periods = max_periods;
        self
    }

    pub fn with_ramp_up(mut self, periods: u32) -> Self {
        self.ramp_up_periods = Some(periods);
        self
    }

    pub fn with_contributors(mut self, min: u32, max: u32) -> Self {
        self.contributors = Some(ContributorRange { min, max });
        self
    }

    pub fn with_lead_times(mut self, samples: Vec<f64>) -> Self {
        self.lead_time_samples = Some(samples);
        self
    }

    pub fn with_split_rates(mut self, multipliers: Vec<f64>) -> Self {
        self.split_rate_multipliers = Some(multipliers);
        self
    }

    pub fn with_risk(mut self, risk: RiskEvent) -> Self {
        self.risks.push(risk);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.backlog.is_finite() || self.backlog < 0.0 {
            return Err(ValidationError::InvalidBacklog(self.backlog));
        }
        if self.trials == 0 {
            return Err(ValidationError::InvalidTrials);
        }
        if self.max_periods == 0 {
            return Err(ValidationError::InvalidMaxPeriods);
        }
        if self.ramp_up_periods == Some(0) {
            return Err(ValidationError::InvalidRampUp);
        }
        if let Some(ContributorRange { min, max }) = self.contributors {
            if max == 0 || min > max {
                return Err(ValidationError::InvalidContributorRange { min, max });
            }
        }
        validate_samples("lead time samples", self.lead_time_samples.as_deref())?;
        validate_samples(
            "split rate multipliers",
            self.split_rate_multipliers.as_deref(),
        )?;
        for risk in &self.risks {
            if !(0.0..=1.0).contains(&risk.probability) {
                return Err(ValidationError::InvalidRiskProbability {
                    name: risk.name.clone(),
                    probability: risk.probability,
                });
            }
            if !risk.impact.is_finite() || risk.impact < 0.0 {
                return Err(ValidationError::InvalidRiskImpact {
                    name: risk.name.clone(),
                    impact: risk.impact,
                });
            }
        }
        Ok(())
    }
}

fn validate_samples(modifier: &'static str, samples: Option<&[f64]>) -> Result<(), ValidationError> {
    match samples {
        None => Ok(()),
        Some(values) if !values.is_empty() && values.iter().all(|v| v.is_finite() && *v > 0.0) => {
            Ok(())
        }
        Some(_) => Err(ValidationError::InvalidModifierSamples { modifier }),
    }
}
