//! Orchestration of one `viewstats` invocation

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{info, instrument};
use viewstats_common::{ProfileFilter, ALL_PROFILES_LABEL};
use viewstats_config::{Config, ConfigError, ConfigLoader};
use viewstats_graphs::{GraphManager, HistoryLoader, LoadStats, ReportBuilder, ViewingReport};

use crate::cli::{Cli, OutputFormat};
use crate::error::{CliError, CliResult};

/// File name of the JSON report inside the output directory
pub const REPORT_FILE: &str = "report.json";

/// Load configuration and fold command-line overrides into it
pub fn load_config(cli: &Cli) -> CliResult<Config> {
    let mut config = ConfigLoader::load(cli.config.as_deref())?;
    apply_overrides(&mut config, cli)?;
    Ok(config)
}

/// Apply command-line flags on top of file and environment settings
pub fn apply_overrides(config: &mut Config, cli: &Cli) -> CliResult<()> {
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(dir) = &cli.output_dir {
        config.charts.output_dir = dir.display().to_string();
    }
    if cli.no_charts {
        config.charts.enabled = false;
    }
    config.validate_all().map_err(ConfigError::from)?;
    Ok(())
}

/// What a run produced besides stdout
#[derive(Debug, Default)]
pub struct RunOutput {
    pub report: Option<PathBuf>,
    pub charts: Vec<PathBuf>,
}

/// Execute the command, writing human or JSON output to `out`
#[instrument(skip_all)]
pub async fn run<W: Write>(cli: &Cli, config: &Config, out: &mut W) -> CliResult<RunOutput> {
    let input = cli
        .input
        .clone()
        .or_else(|| config.input.path.as_ref().map(PathBuf::from))
        .ok_or_else(|| {
            CliError::Usage("No input file given and `input.path` is not configured".to_string())
        })?;

    let history = HistoryLoader::from_config(&config.input).load_path(&input)?;
    if let Some(warning) = load_warning(&history.stats) {
        eprintln!("warning: {warning}");
    }

    if cli.list_profiles {
        writeln!(out, "{ALL_PROFILES_LABEL}")?;
        for profile in history.profiles() {
            writeln!(out, "{profile}")?;
        }
        return Ok(RunOutput::default());
    }

    let filter = cli
        .profile
        .clone()
        .or_else(|| config.report.default_profile.clone())
        .map(ProfileFilter::from)
        .unwrap_or_default();

    if let ProfileFilter::Profile(name) = &filter {
        if !history.events.iter().any(|event| &event.profile == name) {
            return Err(CliError::Usage(format!(
                "Profile '{name}' not found; use --list-profiles to see the available ones"
            )));
        }
    }

    let report = ReportBuilder::from_config(config).build(&history.events, &filter)?;
    match cli.format {
        OutputFormat::Text => write!(out, "{report}")?,
        OutputFormat::Json => writeln!(out, "{}", report.to_json()?)?,
    }

    write_outputs(cli, config, &report).await
}

/// One-line notice for rows that were dropped or lack a usable start time
pub fn load_warning(stats: &LoadStats) -> Option<String> {
    let mut parts = Vec::new();
    if stats.rows_skipped > 0 {
        parts.push(format!("{} of {} rows skipped", stats.rows_skipped, stats.rows_read));
    }
    if stats.invalid_timestamps > 0 {
        parts.push(format!(
            "{} rows with unparsable start times left out of hourly and weekday totals",
            stats.invalid_timestamps
        ));
    }
    (!parts.is_empty()).then(|| parts.join("; "))
}

/// Write report.json and the charts when an output directory is in play
async fn write_outputs(cli: &Cli, config: &Config, report: &ViewingReport) -> CliResult<RunOutput> {
    if cli.output_dir.is_none() && !config.charts.enabled {
        return Ok(RunOutput::default());
    }

    let dir = Path::new(&config.charts.output_dir);
    tokio::fs::create_dir_all(dir).await?;

    let report_path = dir.join(REPORT_FILE);
    report.write_json(&report_path)?;

    let charts = GraphManager::new(config.charts.clone())
        .generate_all(report, dir)
        .await?;

    info!(
        report = %report_path.display(),
        charts = charts.len(),
        "Wrote output files"
    );
    Ok(RunOutput {
        report: Some(report_path),
        charts,
    })
}
