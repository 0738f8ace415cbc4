use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::dependency::{DependencyEdge, ProjectId};
use crate::domain::distribution::{CompletionDistribution, Percentiles};
use crate::domain::portfolio::{
    AdjustedDistribution, DelayModel, PortfolioForecast, PortfolioSettings, PortfolioWarning,
    ProjectForecast, ProjectInput,
};
use crate::domain::quality::QualityVerdict;
use crate::domain::simulation_config::ValidationError;
use crate::services::dependency_graph::{DependencyGraph, DependencyGraphError};
use crate::services::percentiles::{summarize_sorted, value_sorted};
use crate::services::quality_gate::{self, QualityGateError};
use crate::services::random_streams::{resolve_seed, stream_seed};
use crate::services::simulation::{SimulationError, simulate_with_seed};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PortfolioError {
    #[error("portfolio has no projects")]
    EmptyPortfolio,
    #[error("project {0} is defined more than once")]
    DuplicateProject(ProjectId),
    #[error("dependency {edge} references unknown project {missing}")]
    UnknownProject {
        edge: DependencyEdge,
        missing: ProjectId,
    },
    #[error("invalid portfolio settings: {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Graph(#[from] DependencyGraphError),
    #[error("simulation of project {project} failed: {error}")]
    Simulation {
        project: ProjectId,
        error: SimulationError,
    },
    #[error("quality analysis of project {project} failed: {error}")]
    Quality {
        project: ProjectId,
        error: QualityGateError,
    },
}

/// Forecasts a set of interdependent projects.
///
/// Every project is simulated on its own, then delays flow along the
/// dependency edges in topological order.
#[derive(Debug, Clone, Default)]
pub struct PortfolioSimulator {
    settings: PortfolioSettings,
}

impl PortfolioSimulator {
    pub fn new(settings: PortfolioSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &PortfolioSettings {
        &self.settings
    }

    pub fn simulate(
        &self,
        projects: &[ProjectInput],
        edges: &[DependencyEdge],
    ) -> Result<PortfolioForecast, PortfolioError> {
        self.settings.validate()?;
        let ids = project_ids(projects)?;
        check_edges(&ids, edges)?;

        let graph = DependencyGraph::with_projects(&ids, edges);
        let order = graph.topological_order()?;

        let verdicts = projects
            .iter()
            .map(|project| analyze_project(project).map(|verdict| (project.id.clone(), verdict)))
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        let base_seed = resolve_seed(self.settings.seed);
        debug!(
            projects = projects.len(),
            edges = edges.len(),
            trials = self.settings.trials,
            seed = base_seed,
            "running portfolio simulation"
        );
        let mut unconstrained = self.simulate_projects(projects, &ids, base_seed)?;

        let mut adjusted: BTreeMap<ProjectId, AdjustedDistribution> = BTreeMap::new();
        for id in &order {
            let upstream = graph.upstream(id);
            let Some(distribution) = unconstrained.get(id) else {
                continue;
            };
            let delayed = self.propagate(distribution, upstream, &adjusted);
            adjusted.insert(id.clone(), delayed);
        }

        let percentiles = adjusted
            .values()
            .map(AdjustedDistribution::percentiles)
            .fold(Percentiles::default(), |acc, next| acc.max(next));

        let depths = graph.chain_depths(&order);
        let mut forecasts = Vec::with_capacity(order.len());
        let mut warnings = Vec::new();
        for id in &order {
            let (Some(quality), Some(baseline), Some(delayed)) = (
                verdicts.get(id).cloned(),
                unconstrained.remove(id),
                adjusted.remove(id),
            ) else {
                continue;
            };
            warnings.extend(self.project_warnings(id, &quality, &baseline, &depths));
            forecasts.push(ProjectForecast {
                id: id.clone(),
                quality,
                unconstrained: baseline,
                adjusted: delayed,
            });
        }

        let unpredictable = verdicts
            .values()
            .filter(|verdict| !verdict.is_predictable)
            .count();
        if unpredictable as f64 / verdicts.len() as f64 > self.settings.poor_quality_threshold {
            warnings.push(PortfolioWarning::PoorQualityShare {
                unpredictable,
                total: verdicts.len(),
                threshold: self.settings.poor_quality_threshold,
            });
        }
        for warning in &warnings {
            warn!("{warning}");
        }

        Ok(PortfolioForecast::new(order, forecasts, percentiles, warnings))
    }

    /// Project `i` in ascending id order draws from stream `i` of the base
    /// seed.
    fn simulate_projects(
        &self,
        projects: &[ProjectInput],
        ids: &BTreeSet<ProjectId>,
        base_seed: u64,
    ) -> Result<BTreeMap<ProjectId, CompletionDistribution>, PortfolioError> {
        let streams: BTreeMap<&ProjectId, u64> = ids
            .iter()
            .enumerate()
            .map(|(index, id)| (id, stream_seed(base_seed, index as u64)))
            .collect();

        projects
            .par_iter()
            .map(|project| {
                let seed = streams
                    .get(&project.id)
                    .copied()
                    .unwrap_or(base_seed);
                let mut config = project.config.clone();
                config.trials = self.settings.trials;
                config.seed = Some(seed);
                simulate_with_seed(&project.throughput, &config, seed)
                    .map(|distribution| (project.id.clone(), distribution))
                    .map_err(|error| PortfolioError::Simulation {
                        project: project.id.clone(),
                        error,
                    })
            })
            .collect()
    }

    /// Completion times are sorted ascending and every project runs the same
    /// number of trials, so rank `r` of one distribution lines up with rank
    /// `r` of another. A rank-wise maximum of sorted sequences stays sorted.
    fn propagate(
        &self,
        distribution: &CompletionDistribution,
        upstream: Vec<ProjectId>,
        adjusted: &BTreeMap<ProjectId, AdjustedDistribution>,
    ) -> AdjustedDistribution {
        let upstream_times: Vec<&[f64]> = upstream
            .iter()
            .filter_map(|id| adjusted.get(id))
            .map(AdjustedDistribution::completion_times)
            .collect();

        let shift = match self.settings.delay_model {
            DelayModel::FinishToStart => upstream_times
                .iter()
                .filter_map(|times| value_sorted(times, self.settings.confidence_percentile))
                .fold(0.0, f64::max),
            DelayModel::FinishToFinish => 0.0,
        };

        let mut times: Vec<f64> = distribution
            .completion_times()
            .iter()
            .map(|time| time + shift)
            .collect();
        for floor in &upstream_times {
            for (time, upstream_time) in times.iter_mut().zip(floor.iter()) {
                *time = time.max(*upstream_time);
            }
        }

        let percentiles = summarize_sorted(&times);
        AdjustedDistribution::new(upstream, shift, times, percentiles)
    }

    fn project_warnings(
        &self,
        id: &ProjectId,
        quality: &QualityVerdict,
        unconstrained: &CompletionDistribution,
        depths: &BTreeMap<ProjectId, usize>,
    ) -> Vec<PortfolioWarning> {
        let mut warnings = Vec::new();
        if !quality.is_predictable {
            warnings.push(PortfolioWarning::UnpredictableThroughput {
                project: id.clone(),
                score: quality.score,
                signals: quality.signals.len(),
            });
        }
        warnings.extend(
            unconstrained
                .warnings()
                .iter()
                .map(|warning| PortfolioWarning::Simulation {
                    project: id.clone(),
                    warning: warning.clone(),
                }),
        );
        if let Some(depth) = depths.get(id).copied() {
            if depth > self.settings.max_chain_depth {
                warnings.push(PortfolioWarning::DeepDependencyChain {
                    project: id.clone(),
                    depth,
                });
            }
        }
        warnings
    }
}

/// Runs [`PortfolioSimulator::simulate`] with `settings`.
pub fn simulate_portfolio(
    projects: &[ProjectInput],
    edges: &[DependencyEdge],
    settings: &PortfolioSettings,
) -> Result<PortfolioForecast, PortfolioError> {
    PortfolioSimulator::new(settings.clone()).simulate(projects, edges)
}

fn project_ids(projects: &[ProjectInput]) -> Result<BTreeSet<ProjectId>, PortfolioError> {
    if projects.is_empty() {
        return Err(PortfolioError::EmptyPortfolio);
    }
    let mut ids = BTreeSet::new();
    for project in projects {
        if !ids.insert(project.id.clone()) {
            return Err(PortfolioError::DuplicateProject(project.id.clone()));
        }
    }
    Ok(ids)
}

fn check_edges(ids: &BTreeSet<ProjectId>, edges: &[DependencyEdge]) -> Result<(), PortfolioError> {
    for edge in edges {
        for endpoint in [&edge.source, &edge.target] {
            if !ids.contains(endpoint) {
                return Err(PortfolioError::UnknownProject {
                    edge: edge.clone(),
                    missing: endpoint.clone(),
                });
            }
        }
    }
    Ok(())
}

fn analyze_project(project: &ProjectInput) -> Result<QualityVerdict, PortfolioError> {
    if project.throughput.is_empty() {
        return Err(PortfolioError::Simulation {
            project: project.id.clone(),
            error: SimulationError::InsufficientData,
        });
    }
    quality_gate::analyze(&project.throughput).map_err(|error| PortfolioError::Quality {
        project: project.id.clone(),
        error,
    })
}
