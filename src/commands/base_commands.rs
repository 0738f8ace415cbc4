use chrono::Local;
use clap::{Parser, Subcommand};
use clap_complete::Shell;

use crate::services::period_dates::DEFAULT_PERIOD_DAYS;

#[derive(Parser)]
#[command(author, version, about)]
pub struct CliArgs {
    /// Log debug diagnostics to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Forecast when a backlog will be done from historical throughput
    Simulate {
        /// Throughput YAML file
        #[arg(short = 'f', long)]
        throughput: String,
        /// Number of backlog items; overrides the config file
        #[arg(short, long)]
        backlog: Option<f64>,
        /// Optional simulation config YAML (modifiers, risks, trials, seed)
        #[arg(short, long)]
        config: Option<String>,
        /// Output file (.json for JSON, YAML otherwise)
        #[arg(short, long)]
        output: String,
        /// Number of Monte Carlo trials; overrides the config file
        #[arg(short = 'n', long)]
        trials: Option<usize>,
        /// Base seed for reproducible runs; overrides the config file
        #[arg(long)]
        seed: Option<u64>,
        /// Forecast start date (YYYY-MM-DD)
        #[arg(short, long, default_value_t = default_start_date())]
        start_date: String,
        /// Length of one throughput period in days
        #[arg(long, default_value_t = DEFAULT_PERIOD_DAYS)]
        period_days: u32,
    },
    /// Check a throughput history for predictability (XmR chart)
    Analyze {
        /// Throughput YAML file
        #[arg(short = 'f', long)]
        throughput: String,
        /// Optional output file for the verdict
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Forecast a portfolio of dependent projects
    Portfolio {
        /// Portfolio YAML file
        #[arg(short, long)]
        input: String,
        /// Output file (.json for JSON, YAML otherwise)
        #[arg(short, long)]
        output: String,
        /// Forecast start date (YYYY-MM-DD)
        #[arg(short, long, default_value_t = default_start_date())]
        start_date: String,
        /// Length of one throughput period in days
        #[arg(long, default_value_t = DEFAULT_PERIOD_DAYS)]
        period_days: u32,
    },
    /// Check whether adding a dependency would create a cycle
    CheckDependency {
        /// Portfolio YAML file
        #[arg(short, long)]
        input: String,
        /// Project that would depend on `target`
        #[arg(long)]
        source: String,
        /// Project that `source` would wait for
        #[arg(long)]
        target: String,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn default_start_date() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}
