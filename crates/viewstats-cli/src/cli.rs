//! Command-line arguments

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// How the report is printed to stdout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Summarize a streaming-service viewing-activity export
#[derive(Debug, Clone, Parser)]
#[command(name = "viewstats", version, about)]
pub struct Cli {
    /// Viewing-activity CSV export; falls back to `input.path` from the config
    pub input: Option<PathBuf>,

    /// Profile to report on; all users when omitted
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Configuration file (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory for charts and report.json
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Report format on stdout
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Skip chart rendering
    #[arg(long)]
    pub no_charts: bool,

    /// Print the profiles found in the export and exit
    #[arg(long)]
    pub list_profiles: bool,

    /// Log filter, e.g. `info` or `warn,viewstats_graphs=debug`
    #[arg(long)]
    pub log_level: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_full() {
        let cli = Cli::try_parse_from([
            "viewstats",
            "history.csv",
            "--profile",
            "Pati",
            "--output-dir",
            "out",
            "--format",
            "json",
            "--no-charts",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(cli.input, Some(PathBuf::from("history.csv")));
        assert_eq!(cli.profile.as_deref(), Some("Pati"));
        assert_eq!(cli.output_dir, Some(PathBuf::from("out")));
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.no_charts);
        assert!(!cli.list_profiles);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["viewstats"]).unwrap();
        assert_eq!(cli.input, None);
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(!cli.no_charts);
    }

    #[test]
    fn test_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["viewstats", "x.csv", "--format", "xml"]).is_err());
    }
}
