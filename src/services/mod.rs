pub mod dependency_graph;
pub mod output_file;
pub mod percentiles;
pub mod period_dates;
pub mod portfolio_simulation;
pub mod portfolio_yaml;
pub mod quality_gate;
pub mod random_streams;
pub mod simulation;
pub mod simulation_config_yaml;
pub mod simulation_types;
pub mod throughput_yaml;
