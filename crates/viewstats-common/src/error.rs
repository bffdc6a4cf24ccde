//! Error types and utilities for viewstats

use thiserror::Error;

/// Result type alias for viewstats operations
pub type Result<T> = std::result::Result<T, ViewStatsError>;

/// Main error type for viewstats operations
#[derive(Error, Debug)]
pub enum ViewStatsError {
    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Viewing-history input errors (unreadable CSV, missing headers)
    #[error("History input error: {message}")]
    History {
        message: String,
        line: Option<u64>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Chart generation and plotting errors
    #[error("Graph error: {message}")]
    Graph {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Validation errors for user input or data
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// Generic error with custom message
    #[error("{message}")]
    Generic {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ViewStatsError {
    /// Create a new generic error with a custom message and source
    pub fn with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Generic {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new configuration error with source
    pub fn config_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new history input error
    pub fn history(msg: impl Into<String>) -> Self {
        Self::History {
            message: msg.into(),
            line: None,
            source: None,
        }
    }

    /// Create a new history input error pointing at an input line
    pub fn history_at_line(
        msg: impl Into<String>,
        line: u64,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::History {
            message: msg.into(),
            line: Some(line),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new graph error
    pub fn graph(msg: impl Into<String>) -> Self {
        Self::Graph {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new graph error with source
    pub fn graph_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Graph {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new validation error with field name
    pub fn validation_field(msg: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: Some(field.into()),
        }
    }
}

/// Convert from csv::Error to ViewStatsError
impl From<csv::Error> for ViewStatsError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(csv::Position::line);
        match line {
            Some(line) => Self::history_at_line("Failed to read CSV record", line, err),
            None => Self::History {
                message: "Failed to read CSV input".to_string(),
                line: None,
                source: Some(Box::new(err)),
            },
        }
    }
}

/// Convert from serde_yaml::Error to ViewStatsError
impl From<serde_yaml::Error> for ViewStatsError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::config_with_source("YAML parsing error", err)
    }
}

#[cfg(feature = "plotters")]
/// Convert from plotters drawing errors to ViewStatsError
impl<T> From<plotters::drawing::DrawingAreaErrorKind<T>> for ViewStatsError
where
    T: std::error::Error + Send + Sync + 'static,
{
    fn from(err: plotters::drawing::DrawingAreaErrorKind<T>) -> Self {
        Self::graph_with_source("Graph rendering failed", err)
    }
}
