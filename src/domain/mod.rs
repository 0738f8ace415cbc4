pub mod dependency;
pub mod distribution;
pub mod portfolio;
pub mod quality;
pub mod risk;
pub mod simulation_config;
pub mod throughput;
