use std::process::ExitCode;

use crate::commands::base_commands::Commands;
use crate::domain::dependency::DependencyEdge;
use crate::services::dependency_graph::would_introduce_cycle;
use crate::services::portfolio_yaml::load_portfolio_from_yaml_file;

/// Answers the question without touching the portfolio file; exits
/// successfully either way.
pub fn check_dependency_command(cmd: Commands) -> ExitCode {
    let Commands::CheckDependency {
        input,
        source,
        target,
    } = cmd
    else {
        return ExitCode::FAILURE;
    };

    let definition = match load_portfolio_from_yaml_file(&input) {
        Ok(definition) => definition,
        Err(e) => {
            eprintln!("Failed to load portfolio: {e}");
            return ExitCode::FAILURE;
        }
    };

    let candidate = DependencyEdge::new(source, target);
    if would_introduce_cycle(&definition.edges, &candidate) {
        println!("Adding {candidate} would introduce a dependency cycle");
    } else {
        println!("Adding {candidate} keeps the dependency graph acyclic");
    }
    ExitCode::SUCCESS
}
