//! Probabilistic delivery forecasting: Monte Carlo completion forecasts from
//! throughput history, process behavior checks on that history, and
//! dependency-aware portfolio forecasts.

pub mod commands;
pub mod domain;
pub mod logging;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;

pub use domain::dependency::{DependencyEdge, ProjectId};
pub use domain::distribution::{CompletionDistribution, Percentiles};
pub use domain::portfolio::{PortfolioForecast, PortfolioSettings, ProjectInput};
pub use domain::quality::QualityVerdict;
pub use domain::simulation_config::SimulationConfig;
pub use domain::throughput::ThroughputSeries;
pub use services::dependency_graph::{validate, would_introduce_cycle};
pub use services::portfolio_simulation::simulate_portfolio;
pub use services::quality_gate::analyze;
pub use services::simulation::simulate;
