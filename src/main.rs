use std::process::ExitCode;

use clap::Parser;
use delivery_forecast::commands::base_commands::CliArgs;
use delivery_forecast::commands::run;

fn main() -> ExitCode {
    run(CliArgs::parse())
}
