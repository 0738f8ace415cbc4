use serde::Serialize;

use crate::domain::distribution::{BurnDownTrajectory, CompletionDistribution, Percentiles};
use crate::domain::portfolio::{DelayModel, PortfolioForecast, PortfolioSettings, ProjectForecast};
use crate::domain::quality::QualityVerdict;
use crate::services::period_dates::PeriodCalendar;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SimulationPercentile {
    pub periods: f64,
    pub date: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SimulationPercentiles {
    pub p10: SimulationPercentile,
    pub p50: SimulationPercentile,
    pub p85: SimulationPercentile,
    pub p90: SimulationPercentile,
    pub p95: SimulationPercentile,
}

impl SimulationPercentiles {
    pub fn dated(percentiles: &Percentiles, calendar: &PeriodCalendar) -> Self {
        let row = |periods: f64| SimulationPercentile {
            periods,
            date: calendar.format_date_after(periods),
        };
        Self {
            p10: row(percentiles.p10),
            p50: row(percentiles.p50),
            p85: row(percentiles.p85),
            p90: row(percentiles.p90),
            p95: row(percentiles.p95),
        }
    }

    pub fn rows(&self) -> [(&'static str, &SimulationPercentile); 5] {
        [
            ("P10", &self.p10),
            ("P50", &self.p50),
            ("P85", &self.p85),
            ("P90", &self.p90),
            ("P95", &self.p95),
        ]
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SimulationReport {
    pub data_source: String,
    pub start_date: String,
    pub period_days: u32,
    pub backlog: f64,
    pub trials: usize,
    pub seed: u64,
    pub mean_throughput: Option<f64>,
    pub mean_periods: f64,
    pub non_converged_trials: usize,
    pub percentiles: SimulationPercentiles,
}

#[derive(Serialize, Debug, Clone)]
pub struct SimulationOutput {
    pub report: SimulationReport,
    pub warnings: Vec<String>,
    pub trajectories: Vec<BurnDownTrajectory>,
    pub results: Vec<f64>,
}

impl SimulationOutput {
    pub fn new(
        data_source: &str,
        mean_throughput: Option<f64>,
        distribution: CompletionDistribution,
        calendar: &PeriodCalendar,
    ) -> Self {
        let report = SimulationReport {
            data_source: data_source.to_string(),
            start_date: calendar.start().format("%Y-%m-%d").to_string(),
            period_days: calendar.period_days(),
            backlog: distribution.backlog(),
            trials: distribution.trials(),
            seed: distribution.seed(),
            mean_throughput,
            mean_periods: distribution.mean(),
            non_converged_trials: distribution.non_converged_trials(),
            percentiles: SimulationPercentiles::dated(distribution.percentiles(), calendar),
        };
        Self {
            report,
            warnings: distribution.warnings().iter().map(ToString::to_string).collect(),
            trajectories: distribution.trajectories().to_vec(),
            results: distribution.completion_times().to_vec(),
        }
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct QualityOutput {
    pub data_source: String,
    pub verdict: QualityVerdict,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ProjectReport {
    pub id: String,
    pub backlog: f64,
    pub quality_score: u8,
    pub predictable: bool,
    pub upstream: Vec<String>,
    pub shift: f64,
    pub unconstrained: SimulationPercentiles,
    pub adjusted: SimulationPercentiles,
}

impl ProjectReport {
    fn new(project: &ProjectForecast, calendar: &PeriodCalendar) -> Self {
        Self {
            id: project.id.to_string(),
            backlog: project.unconstrained.backlog(),
            quality_score: project.quality.score,
            predictable: project.quality.is_predictable,
            upstream: project
                .adjusted
                .upstream()
                .iter()
                .map(ToString::to_string)
                .collect(),
            shift: project.adjusted.shift(),
            unconstrained: SimulationPercentiles::dated(project.unconstrained.percentiles(), calendar),
            adjusted: SimulationPercentiles::dated(project.adjusted.percentiles(), calendar),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PortfolioReport {
    pub data_source: String,
    pub start_date: String,
    pub period_days: u32,
    pub trials: usize,
    pub delay_model: DelayModel,
    pub confidence_percentile: f64,
    pub order: Vec<String>,
    pub percentiles: SimulationPercentiles,
}

#[derive(Serialize, Debug, Clone)]
pub struct PortfolioOutput {
    pub report: PortfolioReport,
    pub projects: Vec<ProjectReport>,
    pub warnings: Vec<String>,
}

impl PortfolioOutput {
    pub fn new(
        data_source: &str,
        settings: &PortfolioSettings,
        forecast: &PortfolioForecast,
        calendar: &PeriodCalendar,
    ) -> Self {
        let report = PortfolioReport {
            data_source: data_source.to_string(),
            start_date: calendar.start().format("%Y-%m-%d").to_string(),
            period_days: calendar.period_days(),
            trials: settings.trials,
            delay_model: settings.delay_model,
            confidence_percentile: settings.confidence_percentile,
            order: forecast.order().iter().map(ToString::to_string).collect(),
            percentiles: SimulationPercentiles::dated(forecast.percentiles(), calendar),
        };
        Self {
            report,
            projects: forecast
                .projects()
                .iter()
                .map(|project| ProjectReport::new(project, calendar))
                .collect(),
            warnings: forecast.warning_messages(),
        }
    }
}
