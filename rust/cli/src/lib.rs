mod commands;
mod config;
mod error;
mod utils;

pub use commands::query::{query, QueryArgs};
pub use commands::run::{run, RunArgs, RunReport};
pub use config::{ExperimentConfig, RootConfig, DEFAULT_CONFIG_PATH};
pub use error::CliError;

use clap::{Parser, Subcommand};

#[derive(Subcommand, Debug)]
enum Command {
    /// Load generated data, run random queries and compare against a full scan.
    Run(RunArgs),
    /// Run a single query against generated data.
    Query(QueryArgs),
}

#[derive(Parser, Debug)]
#[command(name = "vafile")]
#[command(version = "0.1.0")]
#[command(about = "Exact k-nearest-neighbor search with a VA-File", long_about = None)]
struct Cli {
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: String,
    #[command(subcommand)]
    command: Command,
}

pub fn vafile_cli(args: Vec<String>) -> Result<(), CliError> {
    let cli = Cli::parse_from(args);
    let config = RootConfig::load_from_path(&cli.config)?;
    vafile_tracing::init_stdout_tracing(config.experiment.log_level, &[])?;

    match cli.command {
        Command::Run(args) => {
            run(args, config)?;
        }
        Command::Query(args) => {
            query(args, config)?;
        }
    }
    Ok(())
}
