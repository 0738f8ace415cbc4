use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::dependency::{DependencyEdge, ProjectId};
use crate::domain::portfolio::{
    DEFAULT_CONFIDENCE_PERCENTILE, DEFAULT_MAX_CHAIN_DEPTH, DEFAULT_POOR_QUALITY_THRESHOLD,
    DelayModel, PortfolioSettings, ProjectInput,
};
use crate::domain::simulation_config::{DEFAULT_TRIALS, SimulationConfig};
use crate::domain::throughput::{ThroughputError, ThroughputSeries};
use crate::services::simulation_config_yaml::ModifierRecord;
use crate::services::throughput_yaml::{ThroughputYamlError, load_throughput_series_from_yaml_file};

#[derive(Error, Debug)]
pub enum PortfolioYamlError {
    #[error("failed to read portfolio yaml file {path}: {source}")]
    ReadFile { path: PathBuf, source: io::Error },
    #[error("failed to parse portfolio yaml file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("project {project} in {path} needs exactly one of `throughput` or `throughput_file`")]
    ThroughputSource { path: PathBuf, project: ProjectId },
    #[error("project {project} in {path} has invalid throughput: {source}")]
    InvalidThroughput {
        path: PathBuf,
        project: ProjectId,
        source: ThroughputError,
    },
    #[error("failed to load throughput of project {project}: {source}")]
    ThroughputFile {
        project: ProjectId,
        source: ThroughputYamlError,
    },
}

/// Everything a portfolio file describes.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioDefinition {
    pub settings: PortfolioSettings,
    pub projects: Vec<ProjectInput>,
    pub edges: Vec<DependencyEdge>,
}

#[derive(Debug, Deserialize)]
struct PortfolioRecord {
    trials: Option<usize>,
    seed: Option<u64>,
    confidence_percentile: Option<f64>,
    delay_model: Option<DelayModel>,
    poor_quality_threshold: Option<f64>,
    max_chain_depth: Option<usize>,
    projects: Vec<ProjectRecord>,
    #[serde(default)]
    dependencies: Vec<DependencyEdge>,
}

#[derive(Debug, Deserialize)]
struct ProjectRecord {
    id: ProjectId,
    backlog: f64,
    throughput: Option<Vec<f64>>,
    throughput_file: Option<PathBuf>,
    #[serde(flatten)]
    modifiers: ModifierRecord,
}

pub fn load_portfolio_from_yaml_file<P: AsRef<Path>>(
    path: P,
) -> Result<PortfolioDefinition, PortfolioYamlError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| PortfolioYamlError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    deserialize_portfolio_from_yaml_str(&contents, path)
}

/// Relative `throughput_file` entries are resolved against the directory of
/// `origin_path`.
pub fn deserialize_portfolio_from_yaml_str(
    input: &str,
    origin_path: &Path,
) -> Result<PortfolioDefinition, PortfolioYamlError> {
    let record: PortfolioRecord =
        serde_yaml::from_str(input).map_err(|source| PortfolioYamlError::Parse {
            path: origin_path.to_path_buf(),
            source,
        })?;

    let settings = PortfolioSettings {
        trials: record.trials.unwrap_or(DEFAULT_TRIALS),
        seed: record.seed,
        confidence_percentile: record
            .confidence_percentile
            .unwrap_or(DEFAULT_CONFIDENCE_PERCENTILE),
        delay_model: record.delay_model.unwrap_or_default(),
        poor_quality_threshold: record
            .poor_quality_threshold
            .unwrap_or(DEFAULT_POOR_QUALITY_THRESHOLD),
        max_chain_depth: record.max_chain_depth.unwrap_or(DEFAULT_MAX_CHAIN_DEPTH),
    };

    let base_dir = origin_path.parent().unwrap_or_else(|| Path::new(""));
    let projects = record
        .projects
        .into_iter()
        .map(|project| project_from_record(project, origin_path, base_dir))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PortfolioDefinition {
        settings,
        projects,
        edges: record.dependencies,
    })
}

fn project_from_record(
    record: ProjectRecord,
    origin_path: &Path,
    base_dir: &Path,
) -> Result<ProjectInput, PortfolioYamlError> {
    let throughput = match (record.throughput, record.throughput_file) {
        (Some(values), None) => ThroughputSeries::new(values).map_err(|source| {
            PortfolioYamlError::InvalidThroughput {
                path: origin_path.to_path_buf(),
                project: record.id.clone(),
                source,
            }
        })?,
        (None, Some(file)) => load_throughput_series_from_yaml_file(base_dir.join(file))
            .map_err(|source| PortfolioYamlError::ThroughputFile {
                project: record.id.clone(),
                source,
            })?,
        _ => {
            return Err(PortfolioYamlError::ThroughputSource {
                path: origin_path.to_path_buf(),
                project: record.id,
            });
        }
    };

    let config = record
        .modifiers
        .apply_to(SimulationConfig::new(record.backlog));
    Ok(ProjectInput::new(record.id, throughput, record.backlog).with_config(config))
}
