use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutputFileError {
    #[error("failed to serialize output as yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("failed to serialize output as json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write output file {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Yaml,
    Json,
}

impl OutputFormat {
    /// JSON for `.json` paths, YAML for everything else.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => OutputFormat::Json,
            _ => OutputFormat::Yaml,
        }
    }
}

pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String, OutputFileError> {
    Ok(match format {
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
    })
}

pub fn write_output<T: Serialize, P: AsRef<Path>>(path: P, value: &T) -> Result<(), OutputFileError> {
    let path = path.as_ref();
    let contents = render(value, OutputFormat::for_path(path))?;
    std::fs::write(path, contents).map_err(|source| OutputFileError::Write {
        path: path.to_path_buf(),
        source,
    })
}
