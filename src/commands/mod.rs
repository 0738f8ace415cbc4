pub mod analyze_cmd;
pub mod base_commands;
pub mod check_dependency_cmd;
pub mod completions_cmd;
pub mod portfolio_cmd;
pub mod report_format;
pub mod simulate_cmd;

use std::process::ExitCode;

use crate::commands::base_commands::{CliArgs, Commands};
use crate::logging::init_tracing;

/// Runs one parsed command line.
pub fn run(args: CliArgs) -> ExitCode {
    init_tracing(args.verbose);
    match args.command {
        cmd @ Commands::Simulate { .. } => simulate_cmd::simulate_command(cmd),
        cmd @ Commands::Analyze { .. } => analyze_cmd::analyze_command(cmd),
        cmd @ Commands::Portfolio { .. } => portfolio_cmd::portfolio_command(cmd),
        cmd @ Commands::CheckDependency { .. } => {
            check_dependency_cmd::check_dependency_command(cmd)
        }
        cmd @ Commands::Completions { .. } => completions_cmd::completions_command(cmd),
    }
}
