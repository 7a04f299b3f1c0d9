use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::fmt;
use tracing_subscriber::Registry;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Layer};
use vafile_error::{ErrorCodes, VaError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFilterLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogFilterLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFilterLevel::Trace => f.write_str("trace"),
            LogFilterLevel::Debug => f.write_str("debug"),
            LogFilterLevel::Info => f.write_str("info"),
            LogFilterLevel::Warn => f.write_str("warn"),
            LogFilterLevel::Error => f.write_str("error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFilter {
    pub crate_name: String,
    pub filter_level: LogFilterLevel,
}

#[derive(Error, Debug)]
pub enum TracingError {
    #[error("No tracing layers were provided")]
    NoLayers,
    #[error("Global tracing subscriber already set: {0}")]
    AlreadySet(#[from] tracing::subscriber::SetGlobalDefaultError),
}

impl VaError for TracingError {
    fn code(&self) -> ErrorCodes {
        match self {
            TracingError::NoLayers => ErrorCodes::InvalidArgument,
            TracingError::AlreadySet(_) => ErrorCodes::FailedPrecondition,
        }
    }
}

// Underscored because crate names are normalized that way in targets.
const DEFAULT_CRATE_NAMES: &[&str] = &[
    "vafile",
    "vafile_cli",
    "vafile_distance",
    "vafile_error",
    "vafile_index",
    "vafile_tracing",
];

fn global_filter(default_level: LogFilterLevel, custom_filters: &[LogFilter]) -> String {
    let mut directives = vec!["error".to_string()];
    directives.extend(
        DEFAULT_CRATE_NAMES
            .iter()
            .map(|name| format!("{name}={default_level}")),
    );
    directives.extend(
        custom_filters
            .iter()
            .map(|custom_filter| {
                format!(
                    "{}={}",
                    custom_filter.crate_name, custom_filter.filter_level
                )
            }),
    );
    directives.join(",")
}

/// Filter applied to every layer after it. `RUST_LOG` replaces the computed
/// directives entirely when set.
pub fn init_global_filter_layer(
    default_level: LogFilterLevel,
    custom_filters: &[LogFilter],
) -> Box<dyn Layer<Registry> + Send + Sync> {
    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| global_filter(default_level, custom_filters));
    EnvFilter::new(filter).boxed()
}

pub fn init_stdout_layer() -> Box<dyn Layer<Registry> + Send + Sync> {
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .boxed()
}

pub fn init_tracing(
    layers: Vec<Box<dyn Layer<Registry> + Send + Sync>>,
) -> Result<(), TracingError> {
    let layers = layers
        .into_iter()
        .reduce(|a, b| Box::new(a.and_then(b)))
        .ok_or(TracingError::NoLayers)?;
    let subscriber = tracing_subscriber::registry().with(layers);
    tracing::subscriber::set_global_default(subscriber)?;
    tracing::debug!("Global tracing subscriber set");
    Ok(())
}

pub fn init_panic_tracing_hook() {
    let prev_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let payload = panic_info.payload();

        let payload = if let Some(s) = payload.downcast_ref::<&str>() {
            Some(&**s)
        } else {
            payload.downcast_ref::<String>().map(|s| s.as_str())
        };

        tracing::error!(
            panic.payload = payload,
            panic.location = panic_info.location().map(|l| l.to_string()),
            panic.backtrace = tracing::field::display(std::backtrace::Backtrace::capture()),
            "A panic occurred"
        );

        prev_hook(panic_info);
    }));
}

/// Filtered stderr logging plus the panic hook; what binaries call at startup.
pub fn init_stdout_tracing(
    default_level: LogFilterLevel,
    custom_filters: &[LogFilter],
) -> Result<(), TracingError> {
    let layers = vec![
        // The global filter applies to all subsequent layers
        init_global_filter_layer(default_level, custom_filters),
        init_stdout_layer(),
    ];
    init_tracing(layers)?;
    init_panic_tracing_hook();
    Ok(())
}
