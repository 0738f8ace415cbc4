use std::process::ExitCode;

use crate::commands::base_commands::Commands;
use crate::commands::report_format::format_portfolio_report;
use crate::services::output_file::write_output;
use crate::services::period_dates::PeriodCalendar;
use crate::services::portfolio_simulation::PortfolioSimulator;
use crate::services::portfolio_yaml::load_portfolio_from_yaml_file;
use crate::services::simulation_types::PortfolioOutput;

pub fn portfolio_command(cmd: Commands) -> ExitCode {
    let Commands::Portfolio {
        input,
        output,
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

    let definition = match load_portfolio_from_yaml_file(&input) {
        Ok(definition) => definition,
        Err(e) => {
            eprintln!("Failed to load portfolio: {e}");
            return ExitCode::FAILURE;
        }
    };

    let simulator = PortfolioSimulator::new(definition.settings);
    let forecast = match simulator.simulate(&definition.projects, &definition.edges) {
        Ok(forecast) => forecast,
        Err(e) => {
            eprintln!("Failed to simulate portfolio: {e}");
            return ExitCode::FAILURE;
        }
    };

    let portfolio = PortfolioOutput::new(&input, simulator.settings(), &forecast, &calendar);
    if let Err(e) = write_output(&output, &portfolio) {
        eprintln!("Failed to write portfolio output: {e}");
        return ExitCode::FAILURE;
    }

    println!("{}", format_portfolio_report(&portfolio));
    println!("Portfolio forecast written to {output}");
    ExitCode::SUCCESS
}
