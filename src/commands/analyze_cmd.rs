use std::process::ExitCode;

use crate::commands::base_commands::Commands;
use crate::commands::report_format::format_quality_report;
use crate::services::output_file::write_output;
use crate::services::quality_gate::analyze;
use crate::services::simulation_types::QualityOutput;
use crate::services::throughput_yaml::load_throughput_series_from_yaml_file;

pub fn analyze_command(cmd: Commands) -> ExitCode {
    let Commands::Analyze { throughput, output } = cmd else {
        return ExitCode::FAILURE;
    };

    let series = match load_throughput_series_from_yaml_file(&throughput) {
        Ok(series) => series,
        Err(e) => {
            eprintln!("Failed to load throughput: {e}");
            return ExitCode::FAILURE;
        }
    };

    let verdict = match analyze(&series) {
        Ok(verdict) => verdict,
        Err(e) => {
            eprintln!("Failed to analyze throughput: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!("{}", format_quality_report(&throughput, &verdict));

    if let Some(output) = output {
        let quality = QualityOutput {
            data_source: throughput,
            verdict,
        };
        if let Err(e) = write_output(&output, &quality) {
            eprintln!("Failed to write quality verdict: {e}");
            return ExitCode::FAILURE;
        }
        println!("Quality verdict written to {output}");
    }
    ExitCode::SUCCESS
}
