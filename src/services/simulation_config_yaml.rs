use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::risk::RiskEvent;
use crate::domain::simulation_config::{ContributorRange, SimulationConfig};

#[derive(Error, Debug)]
pub enum SimulationConfigYamlError {
    #[error("failed to read simulation config file {path}: {source}")]
    ReadFile { path: PathBuf, source: io::Error },
    #[error("failed to parse simulation config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("no backlog given in {path} or on the command line")]
    MissingBacklog { path: PathBuf },
}

/// Optional simulation modifiers, shared by the simulation config file and
/// the project entries of a portfolio file.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ModifierRecord {
    max_periods: Option<usize>,
    trajectory_samples: Option<usize>,
    ramp_up_periods: Option<u32>,
    contributors: Option<ContributorRange>,
    lead_time_samples: Option<Vec<f64>>,
    split_rate_multipliers: Option<Vec<f64>>,
    risks: Option<Vec<RiskEvent>>,
}

impl ModifierRecord {
    pub(crate) fn apply_to(self, mut config: SimulationConfig) -> SimulationConfig {
        if let Some(max_periods) = self.max_periods {
            config.max_periods = max_periods;
        }
        if let Some(trajectory_samples) = self.trajectory_samples {
            config.trajectory_samples = trajectory_samples;
        }
        config.ramp_up_periods = self.ramp_up_periods;
        config.contributors = self.contributors;
        config.lead_time_samples = self.lead_time_samples;
        config.split_rate_multipliers = self.split_rate_multipliers;
        config.risks = self.risks.unwrap_or_default();
        config
    }
}

#[derive(Debug, Deserialize)]
struct SimulationConfigRecord {
    backlog: Option<f64>,
    trials: Option<usize>,
    seed: Option<u64>,
    #[serde(flatten)]
    modifiers: ModifierRecord,
}

/// Loads a simulation config file. `backlog` takes precedence over the
/// file's own `backlog`.
pub fn load_simulation_config_from_yaml_file<P: AsRef<Path>>(
    path: P,
    backlog: Option<f64>,
) -> Result<SimulationConfig, SimulationConfigYamlError> {
    let path = path.as_ref();
    let contents =
        std::fs::read_to_string(path).map_err(|source| SimulationConfigYamlError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
    deserialize_simulation_config_from_yaml_str(&contents, path, backlog)
}

pub fn deserialize_simulation_config_from_yaml_str(
    input: &str,
    origin_path: &Path,
    backlog: Option<f64>,
) -> Result<SimulationConfig, SimulationConfigYamlError> {
    let record: SimulationConfigRecord =
        serde_yaml::from_str(input).map_err(|source| SimulationConfigYamlError::Parse {
            path: origin_path.to_path_buf(),
            source,
        })?;

    let backlog = backlog.or(record.backlog).ok_or_else(|| {
        SimulationConfigYamlError::MissingBacklog {
            path: origin_path.to_path_buf(),
        }
    })?;
    let mut config = record.modifiers.apply_to(SimulationConfig::new(backlog));
    if let Some(trials) = record.trials {
        config.trials = trials;
    }
    config.seed = record.seed;
    Ok(config)
}
