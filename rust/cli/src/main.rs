use colored::Colorize;
use std::process::ExitCode;
use vafile_error::VaError;

fn main() -> ExitCode {
    let args = std::env::args().collect();
    match vafile_cli::vafile_cli(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} [{}] {}", "Error:".red(), err.code().name(), err);
            ExitCode::FAILURE
        }
    }
}
