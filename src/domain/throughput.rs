use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

/// Items completed during the period that starts on `date`.
#[derive(Debug, Clone, PartialEq)]
pub struct Throughput {
    pub date: NaiveDate,
    pub completed_items: f64,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ThroughputError {
    #[error("throughput value at position {index} is not a finite number")]
    NonNumeric { index: usize },
    #[error("throughput value at position {index} is negative: {value}")]
    Negative { index: usize, value: f64 },
}

/// Chronological per-period completion counts.
///
/// The values are checked once on construction and never change afterwards,
/// so every consumer can rely on them being finite and non-negative. An empty
/// series is representable; the consumers decide whether that is an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ThroughputSeries {
    values: Vec<f64>,
}

impl ThroughputSeries {
    pub fn new(values: Vec<f64>) -> Result<Self, ThroughputError> {
        for (index, value) in values.iter().copied().enumerate() {
            if !value.is_finite() {
                return Err(ThroughputError::NonNumeric { index });
            }
            if value < 0.0 {
                return Err(ThroughputError::Negative { index, value });
            }
        }
        Ok(Self { values })
    }

    /// Builds a series from dated records, ordered by date.
    pub fn from_records(records: &[Throughput]) -> Result<Self, ThroughputError> {
        let mut sorted: Vec<&Throughput> = records.iter().collect();
        sorted.sort_by_key(|record| record.date);
        Self::new(sorted.iter().map(|record| record.completed_items).collect())
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        Some(self.values.iter().sum::<f64>() / self.values.len() as f64)
    }
}
