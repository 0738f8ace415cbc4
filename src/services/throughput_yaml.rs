use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::throughput::{Throughput, ThroughputError, ThroughputSeries};

#[derive(Error, Debug)]
pub enum ThroughputYamlError {
    #[error("failed to read throughput yaml file {path}: {source}")]
    ReadFile { path: PathBuf, source: io::Error },
    #[error("failed to parse throughput yaml file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("invalid date format in {path}: {value} (expected YYYY-MM-DD)")]
    InvalidDate { path: PathBuf, value: String },
    #[error("invalid throughput in {path}: {source}")]
    InvalidThroughput {
        path: PathBuf,
        source: ThroughputError,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct ThroughputRecord {
    date: String,
    #[serde(alias = "completed_issues")]
    completed_items: f64,
}

pub fn serialize_throughput_to_yaml<W: Write>(writer: &mut W, data: &[Throughput]) -> io::Result<()> {
    let records: Vec<ThroughputRecord> = data
        .iter()
        .map(|t| ThroughputRecord {
            date: t.date.format("%Y-%m-%d").to_string(),
            completed_items: t.completed_items,
        })
        .collect();

    let yaml = serde_yaml::to_string(&records).map_err(io::Error::other)?;
    writer.write_all(yaml.as_bytes())
}

/// Parses a list of `{date, completed_items}` records. `origin_path` only
/// labels errors.
pub fn deserialize_throughput_from_yaml_str(
    input: &str,
    origin_path: &Path,
) -> Result<Vec<Throughput>, ThroughputYamlError> {
    let records: Vec<ThroughputRecord> =
        serde_yaml::from_str(input).map_err(|source| ThroughputYamlError::Parse {
            path: origin_path.to_path_buf(),
            source,
        })?;

    records
        .into_iter()
        .map(|record| {
            let date = NaiveDate::parse_from_str(&record.date, "%Y-%m-%d").map_err(|_| {
                ThroughputYamlError::InvalidDate {
                    path: origin_path.to_path_buf(),
                    value: record.date.clone(),
                }
            })?;
            Ok(Throughput {
                date,
                completed_items: record.completed_items,
            })
        })
        .collect()
}

/// Loads a throughput file and orders it into a series.
pub fn load_throughput_series_from_yaml_file<P: AsRef<Path>>(
    path: P,
) -> Result<ThroughputSeries, ThroughputYamlError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| ThroughputYamlError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let records = deserialize_throughput_from_yaml_str(&contents, path)?;
    ThroughputSeries::from_records(&records).map_err(|source| {
        ThroughputYamlError::InvalidThroughput {
            path: path.to_path_buf(),
            source,
        }
    })
}
