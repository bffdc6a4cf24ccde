//! # viewstats common
//!
//! Shared types, viewing-history parsing and utilities for viewstats.
//!
//! This crate provides the foundational types used across all other crates
//! in the workspace: the error type, the parsed [`ViewingEvent`] model,
//! device and habit enums, and logging bootstrap.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod history;
pub mod logging;
pub mod types;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use error::{Result, ViewStatsError};
pub use history::{parse_duration, parse_start_time, HistoryRecord, ViewingEvent};
pub use logging::{init_logging, LoggingConfig};
pub use types::*;
pub use utils::*;
