use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::dependency::ProjectId;
use crate::domain::distribution::{CompletionDistribution, Percentiles, SimulationWarning};
use crate::domain::quality::QualityVerdict;
use crate::domain::simulation_config::{DEFAULT_TRIALS, SimulationConfig, ValidationError};
use crate::domain::throughput::ThroughputSeries;

pub const DEFAULT_CONFIDENCE_PERCENTILE: f64 = 85.0;
pub const DEFAULT_POOR_QUALITY_THRESHOLD: f64 = 0.3;
pub const DEFAULT_MAX_CHAIN_DEPTH: usize = 4;

/// One project of a portfolio. The backlog lives in `config.backlog`;
/// trial count and seed are taken from the portfolio settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectInput {
    pub id: ProjectId,
    pub throughput: ThroughputSeries,
    pub config: SimulationConfig,
}

impl ProjectInput {
    pub fn new(id: impl Into<ProjectId>, throughput: ThroughputSeries, backlog: f64) -> Self {
        Self {
            id: id.into(),
            throughput,
            config: SimulationConfig::new(backlog),
        }
    }

    pub fn with_config(mut self, config: SimulationConfig) -> Self {
        self.config = config;
        self
    }
}

/// How a project's schedule reacts to the projects it depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelayModel {
    /// Work starts once every dependency is done at the confidence
    /// percentile.
    #[default]
    FinishToStart,
    /// Work runs in parallel but cannot finish before its dependencies.
    FinishToFinish,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioSettings {
    pub trials: usize,
    pub seed: Option<u64>,
    pub confidence_percentile: f64,
    pub delay_model: DelayModel,
    /// Share of unpredictable projects above which a portfolio warning is
    /// raised.
    pub poor_quality_threshold: f64,
    pub max_chain_depth: usize,
}

impl Default for PortfolioSettings {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            seed: None,
            confidence_percentile: DEFAULT_CONFIDENCE_PERCENTILE,
            delay_model: DelayModel::default(),
            poor_quality_threshold: DEFAULT_POOR_QUALITY_THRESHOLD,
            max_chain_depth: DEFAULT_MAX_CHAIN_DEPTH,
        }
    }
}

impl PortfolioSettings {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.trials == 0 {
            return Err(ValidationError::InvalidTrials);
        }
        if !(self.confidence_percentile > 0.0 && self.confidence_percentile <= 100.0) {
            return Err(ValidationError::InvalidConfidence(self.confidence_percentile));
        }
        if !(0.0..=1.0).contains(&self.poor_quality_threshold) {
            return Err(ValidationError::InvalidQualityThreshold(
                self.poor_quality_threshold,
            ));
        }
        Ok(())
    }
}

/// A project's completion distribution after dependency delays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustedDistribution {
    upstream: Vec<ProjectId>,
    shift: f64,
    completion_times: Vec<f64>,
    percentiles: Percentiles,
}

impl AdjustedDistribution {
    pub(crate) fn new(
        upstream: Vec<ProjectId>,
        shift: f64,
        completion_times: Vec<f64>,
        percentiles: Percentiles,
    ) -> Self {
        Self {
            upstream,
            shift,
            completion_times,
            percentiles,
        }
    }

    /// Direct dependencies, ascending.
    pub fn upstream(&self) -> &[ProjectId] {
        &self.upstream
    }

    /// Periods added to every trial before flooring.
    pub fn shift(&self) -> f64 {
        self.shift
    }

    pub fn completion_times(&self) -> &[f64] {
        &self.completion_times
    }

    pub fn percentiles(&self) -> &Percentiles {
        &self.percentiles
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectForecast {
    pub id: ProjectId,
    pub quality: QualityVerdict,
    pub unconstrained: CompletionDistribution,
    pub adjusted: AdjustedDistribution,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PortfolioWarning {
    UnpredictableThroughput {
        project: ProjectId,
        score: u8,
        signals: usize,
    },
    PoorQualityShare {
        unpredictable: usize,
        total: usize,
        threshold: f64,
    },
    Simulation {
        project: ProjectId,
        warning: SimulationWarning,
    },
    DeepDependencyChain {
        project: ProjectId,
        depth: usize,
    },
}

impl fmt::Display for PortfolioWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortfolioWarning::UnpredictableThroughput {
                project,
                score,
                signals,
            } => write!(
                f,
                "project {project} has unpredictable throughput ({signals} signals, score {score})"
            ),
            PortfolioWarning::PoorQualityShare {
                unpredictable,
                total,
                threshold,
            } => write!(
                f,
                "{unpredictable} of {total} projects carry poor-quality throughput history (more than {:.0}%)",
                threshold * 100.0
            ),
            PortfolioWarning::Simulation { project, warning } => {
                write!(f, "project {project}: {warning}")
            }
            PortfolioWarning::DeepDependencyChain { project, depth } => write!(
                f,
                "project {project} sits at the end of a dependency chain {depth} projects deep"
            ),
        }
    }
}

/// Aggregate result of one portfolio run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioForecast {
    order: Vec<ProjectId>,
    projects: Vec<ProjectForecast>,
    percentiles: Percentiles,
    warnings: Vec<PortfolioWarning>,
}

impl PortfolioForecast {
    pub(crate) fn new(
        order: Vec<ProjectId>,
        projects: Vec<ProjectForecast>,
        percentiles: Percentiles,
        warnings: Vec<PortfolioWarning>,
    ) -> Self {
        Self {
            order,
            projects,
            percentiles,
            warnings,
        }
    }

    /// Order in which delays were propagated.
    pub fn order(&self) -> &[ProjectId] {
        &self.order
    }

    /// Per-project forecasts, in propagation order.
    pub fn projects(&self) -> &[ProjectForecast] {
        &self.projects
    }

    pub fn project(&self, id: &ProjectId) -> Option<&ProjectForecast> {
        self.projects.iter().find(|project| &project.id == id)
    }

    pub fn percentiles(&self) -> &Percentiles {
        &self.percentiles
    }

    pub fn warnings(&self) -> &[PortfolioWarning] {
        &self.warnings
    }

    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }
}
