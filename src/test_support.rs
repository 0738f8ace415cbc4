use chrono::NaiveDate;

use crate::domain::dependency::{DependencyEdge, ProjectId};
use crate::domain::portfolio::ProjectInput;
use crate::domain::throughput::ThroughputSeries;

pub fn on_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn series(values: &[f64]) -> ThroughputSeries {
    ThroughputSeries::new(values.to_vec()).unwrap()
}

pub fn edge(dependent: &str, dependency: &str) -> DependencyEdge {
    DependencyEdge::new(dependent, dependency)
}

pub fn ids(values: &[&str]) -> Vec<ProjectId> {
    values.iter().map(|value| ProjectId::from(*value)).collect()
}

pub fn project(id: &str, throughput: &[f64], backlog: f64) -> ProjectInput {
    ProjectInput::new(id, series(throughput), backlog)
}
