//! Configuration loading utilities

use crate::Config;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;
use viewstats_common::{HabitBoundary, ViewStatsError};

/// Environment variable naming an explicit configuration file
pub const CONFIG_PATH_ENV: &str = "VIEWSTATS_CONFIG";

/// File names looked up in the working directory, in order
pub const DEFAULT_CONFIG_FILES: [&str; 2] = ["viewstats.yaml", "viewstats.yml"];

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParseError {
        var: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<ConfigError> for ViewStatsError {
    fn from(err: ConfigError) -> Self {
        ViewStatsError::config_with_source("Failed to load configuration", err)
    }
}

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file with environment variable overrides
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut config = Self::parse_yaml(&content)?;

        Self::apply_env_overrides(&mut config)?;
        config.validate_all()?;

        debug!(path = %path.as_ref().display(), "Loaded configuration");
        Ok(config)
    }

    /// Load configuration, discovering the file when `explicit` is `None`.
    ///
    /// Lookup order: `explicit`, `$VIEWSTATS_CONFIG`, `viewstats.yaml` and
    /// `viewstats.yml` in the working directory. Without any file the defaults
    /// are used, still subject to environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
        let cwd = env::current_dir()?;
        match Self::discover(explicit, env::var(CONFIG_PATH_ENV).ok(), &cwd) {
            Some(path) => Self::load_config(path),
            None => {
                debug!("No configuration file found, using defaults");
                let mut config = Config::default();
                Self::apply_env_overrides(&mut config)?;
                config.validate_all()?;
                Ok(config)
            }
        }
    }

    /// Resolve which configuration file to read.
    pub fn discover(
        explicit: Option<&Path>,
        env_path: Option<String>,
        dir: &Path,
    ) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }

        if let Some(path) = env_path.filter(|p| !p.trim().is_empty()) {
            return Some(PathBuf::from(path));
        }

        DEFAULT_CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    }

    fn parse_yaml(content: &str) -> Result<Config, ConfigError> {
        // An empty document is a valid "all defaults" file
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
        // Report limits
        if let Some(limit) = Self::parse_env("VIEWSTATS_TOP_DEVICES")? {
            config.report.top_devices = limit;
        }

        if let Some(limit) = Self::parse_env("VIEWSTATS_TOP_COUNTRIES")? {
            config.report.top_countries = limit;
        }

        if let Some(limit) = Self::parse_env("VIEWSTATS_TOP_TITLES")? {
            config.report.top_titles = limit;
        }

        // Input and clock
        if let Some(exclude) = Self::parse_env("VIEWSTATS_EXCLUDE_SUPPLEMENTAL")? {
            config.input.exclude_supplemental = exclude;
        }

        if let Some(minutes) = Self::parse_env("VIEWSTATS_UTC_OFFSET_MINUTES")? {
            config.time.utc_offset_minutes = minutes;
        }

        if let Ok(boundary) = env::var("VIEWSTATS_HABIT_BOUNDARY") {
            config.habits.boundary = match boundary.trim().to_ascii_lowercase().as_str() {
                "corrected" => HabitBoundary::Corrected,
                "legacy" => HabitBoundary::Legacy,
                other => {
                    return Err(ConfigError::EnvParseError {
                        var: "VIEWSTATS_HABIT_BOUNDARY".to_string(),
                        source: format!("expected 'corrected' or 'legacy', got '{other}'").into(),
                    })
                }
            };
        }

        // Output
        if let Ok(dir) = env::var("VIEWSTATS_OUTPUT_DIR") {
            config.charts.output_dir = dir;
        }

        // Logging
        if let Ok(level) = env::var("VIEWSTATS_LOG_LEVEL") {
            config.logging.level = level;
        }

        Ok(())
    }

    fn parse_env<T>(var: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match env::var(var) {
            Ok(raw) => raw
                .trim()
                .parse()
                .map(Some)
                .map_err(|e| ConfigError::EnvParseError {
                    var: var.to_string(),
                    source: Box::new(e),
                }),
            Err(_) => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    /// Serializes tests that touch process environment variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const OVERRIDE_VARS: [&str; 8] = [
        "VIEWSTATS_TOP_DEVICES",
        "VIEWSTATS_TOP_COUNTRIES",
        "VIEWSTATS_TOP_TITLES",
        "VIEWSTATS_EXCLUDE_SUPPLEMENTAL",
        "VIEWSTATS_UTC_OFFSET_MINUTES",
        "VIEWSTATS_HABIT_BOUNDARY",
        "VIEWSTATS_OUTPUT_DIR",
        "VIEWSTATS_LOG_LEVEL",
    ];

    fn clear_env() {
        for var in OVERRIDE_VARS {
            env::remove_var(var);
        }
    }

    /// Create a temporary YAML config file for testing
    fn create_test_config_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes()).expect("Failed to write to temp file");
        file
    }

    #[test]
    fn test_load_valid_yaml_config() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        let yaml_content = "input:\n  exclude_supplemental: true\nreport:\n  top_devices: 3\n  top_countries: 4\n  top_titles: 5\nhabits:\n  boundary: legacy\ntime:\n  utc_offset_minutes: 60\ncharts:\n  format: svg\n  output_dir: out\nlogging:\n  level: debug\n";

        let temp_file = create_test_config_file(yaml_content);
        let config = ConfigLoader::load_config(temp_file.path()).expect("Failed to load config");

        assert!(config.input.exclude_supplemental);
        assert_eq!(config.report.top_devices, 3);
        assert_eq!(config.report.top_countries, 4);
        assert_eq!(config.report.top_titles, 5);
        assert_eq!(config.habits.boundary, HabitBoundary::Legacy);
        assert_eq!(config.time.utc_offset_minutes, 60);
        assert_eq!(config.charts.format, crate::ChartFormat::Svg);
        assert_eq!(config.charts.output_dir, "out");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        let temp_file = create_test_config_file("\n");
        let config = ConfigLoader::load_config(temp_file.path()).expect("Failed to load config");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_yaml() {
        let temp_file = create_test_config_file("report:\n  top_devices: [unclosed");
        let result = ConfigLoader::load_config(temp_file.path());

        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_validation_error() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        let temp_file = create_test_config_file("report:\n  top_titles: 0\n");
        let result = ConfigLoader::load_config(temp_file.path());

        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_environment_variable_overrides() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        env::set_var("VIEWSTATS_TOP_DEVICES", "2");
        env::set_var("VIEWSTATS_TOP_TITLES", " 20 ");
        env::set_var("VIEWSTATS_UTC_OFFSET_MINUTES", "-300");
        env::set_var("VIEWSTATS_HABIT_BOUNDARY", "Legacy");
        env::set_var("VIEWSTATS_OUTPUT_DIR", "/tmp/viewstats-env");
        env::set_var("VIEWSTATS_LOG_LEVEL", "trace");

        let temp_file = create_test_config_file("report:\n  top_devices: 9\n  top_titles: 9\n");
        let result = ConfigLoader::load_config(temp_file.path());
        clear_env();

        let config = result.expect("Failed to load config");
        assert_eq!(config.report.top_devices, 2);
        assert_eq!(config.report.top_titles, 20);
        assert_eq!(config.report.top_countries, 7);
        assert_eq!(config.time.utc_offset_minutes, -300);
        assert_eq!(config.habits.boundary, HabitBoundary::Legacy);
        assert_eq!(config.charts.output_dir, "/tmp/viewstats-env");
        assert_eq!(config.logging.level, "trace");
    }

    #[test]
    fn test_env_parse_error() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        env::set_var("VIEWSTATS_TOP_COUNTRIES", "lots");
        let temp_file = create_test_config_file("report:\n  top_countries: 7\n");
        let result = ConfigLoader::load_config(temp_file.path());
        clear_env();

        match result {
            Err(ConfigError::EnvParseError { var, .. }) => assert_eq!(var, "VIEWSTATS_TOP_COUNTRIES"),
            other => panic!("expected EnvParseError, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_config_file() {
        let result = ConfigLoader::load_config("/nonexistent/path/viewstats.yaml");
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }

    #[test]
    fn test_discover_order() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let explicit = Path::new("/etc/viewstats/custom.yaml");

        assert_eq!(
            ConfigLoader::discover(Some(explicit), Some("/env.yaml".to_string()), dir.path()),
            Some(explicit.to_path_buf())
        );
        assert_eq!(
            ConfigLoader::discover(None, Some("/env.yaml".to_string()), dir.path()),
            Some(PathBuf::from("/env.yaml"))
        );
        assert_eq!(ConfigLoader::discover(None, Some("  ".to_string()), dir.path()), None);

        std::fs::write(dir.path().join("viewstats.yml"), "").expect("Failed to write file");
        assert_eq!(
            ConfigLoader::discover(None, None, dir.path()),
            Some(dir.path().join("viewstats.yml"))
        );

        std::fs::write(dir.path().join("viewstats.yaml"), "").expect("Failed to write file");
        assert_eq!(
            ConfigLoader::discover(None, None, dir.path()),
            Some(dir.path().join("viewstats.yaml"))
        );
    }

    #[test]
    fn test_config_error_converts_to_common_error() {
        let err: ViewStatsError = ConfigError::EnvParseError {
            var: "VIEWSTATS_TOP_TITLES".to_string(),
            source: "bad".into(),
        }
        .into();
        assert_eq!(err.to_string(), "Configuration error: Failed to load configuration");
        let cause = err.source().expect("config error keeps its cause").to_string();
        assert!(cause.contains("VIEWSTATS_TOP_TITLES"));
    }
}
