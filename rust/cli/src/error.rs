use thiserror::Error;
use vafile_error::{ErrorCodes, VaError};
use vafile_index::VaFileError;
use vafile_tracing::TracingError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Error loading config: {0}")]
    Config(#[from] figment::Error),
    #[error(transparent)]
    Index(#[from] VaFileError),
    #[error(transparent)]
    Tracing(#[from] TracingError),
    #[error("At least one query is required")]
    NoQueries,
}

impl VaError for CliError {
    fn code(&self) -> ErrorCodes {
        match self {
            CliError::Config(_) => ErrorCodes::InvalidArgument,
            CliError::Index(err) => err.code(),
            CliError::Tracing(err) => err.code(),
            CliError::NoQueries => ErrorCodes::InvalidArgument,
        }
    }
}
