//! Application-wide error types using thiserror.

use viewstats_common::ViewStatsError;
use viewstats_config::ConfigError;

/// Errors surfaced by the `viewstats` binary
#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    ViewStats(#[from] ViewStatsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid combination of arguments and configuration
    #[error("{0}")]
    Usage(String),
}

pub type CliResult<T> = Result<T, CliError>;
