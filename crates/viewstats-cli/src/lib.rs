//! # viewstats CLI
//!
//! Reads a viewing-activity export, prints a report for one profile or for
//! all of them, and writes `report.json` plus charts to an output directory.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod cli;
pub mod error;

pub use app::{apply_overrides, load_config, run, RunOutput, REPORT_FILE};
pub use cli::{Cli, OutputFormat};
pub use error::{CliError, CliResult};
