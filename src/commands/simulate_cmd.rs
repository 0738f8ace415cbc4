use std::process::ExitCode;

use tracing::debug;

use crate::commands::base_commands::Commands;
use crate::commands::report_format::format_simulation_report;
use crate::domain::simulation_config::SimulationConfig;
use crate::services::output_file::write_output;
use crate::services::period_dates::PeriodCalendar;
use crate::services::simulation::simulate;
use crate::services::simulation_config_yaml::load_simulation_config_from_yaml_file;
use crate::services::simulation_types::SimulationOutput;
use crate::services::throughput_yaml::load_throughput_series_from_yaml_file;

pub fn simulate_command(cmd: Commands) -> ExitCode {
    let Commands::Simulate {
        throughput,
        backlog,
        config,
        output,
        trials,
        seed,
        start_date,
        period_days,
    } = cmd
    else {
        return ExitCode::FAILURE;
    };

    let calendar = match PeriodCalendar::parse(&start_date, period_days) {
        Ok(calendar) => calendar,
        Err(e) => {
            eprintln!("Failed to set up forecast calendar: {e}");
            return ExitCode::FAILURE;
        }
    };

    let series = match load_throughput_series_from_yaml_file(&throughput) {
        Ok(series) => series,
        Err(e) => {
            eprintln!("Failed to load throughput: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut simulation_config = match (&config, backlog) {
        (Some(path), _) => match load_simulation_config_from_yaml_file(path, backlog) {
            Ok(loaded) => loaded,
            Err(e) => {
                eprintln!("Failed to load simulation config: {e}");
                return ExitCode::FAILURE;
            }
        },
        (None, Some(backlog)) => SimulationConfig::new(backlog),
        (None, None) => {
            eprintln!("Failed to configure simulation: pass --backlog or a config file with a backlog");
            return ExitCode::FAILURE;
        }
    };
    if let Some(trials) = trials {
        simulation_config.trials = trials;
    }
    if seed.is_some() {
        simulation_config.seed = seed;
    }
    debug!(?simulation_config, "simulation config resolved");

    let distribution = match simulate(&series, &simulation_config) {
        Ok(distribution) => distribution,
        Err(e) => {
            eprintln!("Failed to simulate by throughput: {e}");
            return ExitCode::FAILURE;
        }
    };

    let simulation = SimulationOutput::new(&throughput, series.mean(), distribution, &calendar);
    if let Err(e) = write_output(&output, &simulation) {
        eprintln!("Failed to write simulation output: {e}");
        return ExitCode::FAILURE;
    }

    println!("{}", format_simulation_report(&simulation));
    println!(
        "Simulation result for {} items written to {output}",
        simulation.report.backlog
    );
    ExitCode::SUCCESS
}
