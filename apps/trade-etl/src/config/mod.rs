//! Configuration for an ETL run.
//!
//! Values come from an optional YAML file with `${VAR}` and
//! `${VAR:-default}` environment interpolation, then command-line overrides.
//!
//! # Usage
//!
//! ```rust,ignore
//! use trade_etl::config::load_config;
//!
//! let config = load_config("etl.yaml")?;
//! println!("batch size: {}", config.batch_size);
//! ```

mod observability;
mod workers;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ingest::DEFAULT_BATCH_SIZE;

pub use observability::{LogFormat, LoggingConfig};
pub use workers::WorkerConfig;

/// Default size of the instrument universe.
pub const DEFAULT_INSTRUMENT_COUNT: u32 = 200;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EtlConfig {
    /// Input files or directories of `*.csv` files.
    pub inputs: Vec<PathBuf>,
    /// Directory the reports are written to.
    pub output_dir: PathBuf,
    /// Accepted records per aggregation batch.
    pub batch_size: usize,
    /// Reports cover instruments `1..=instrument_count`.
    pub instrument_count: u32,
    /// Worker pool sizing.
    pub workers: WorkerConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            output_dir: PathBuf::from("."),
            batch_size: DEFAULT_BATCH_SIZE,
            instrument_count: DEFAULT_INSTRUMENT_COUNT,
            workers: WorkerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl EtlConfig {
    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::ValidationError(
                "batch_size must be positive".to_string(),
            ));
        }

        if self.instrument_count == 0 {
            return Err(ConfigError::ValidationError(
                "instrument_count must be positive".to_string(),
            ));
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "logging.level must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: impl AsRef<Path>) -> Result<EtlConfig, ConfigError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<EtlConfig, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: EtlConfig = serde_yaml_bw::from_str(&interpolated)?;
    config.validate()?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax. Unset or empty
/// variables without a default become the empty string.
#[allow(clippy::expect_used)] // Regex is compile-time constant; expect() is safe here
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |caps: &regex::Captures<'_>| {
        let default_value = caps.get(2).map_or("", |m| m.as_str());
        match caps.get(1).map(|m| std::env::var(m.as_str())) {
            Some(Ok(v)) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = EtlConfig::default();

        assert!(config.inputs.is_empty());
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.batch_size, 10_000);
        assert_eq!(config.instrument_count, 200);
        assert_eq!(config.workers.max_threads, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_minimal_config() {
        let yaml = r"
batch_size: 500
";

        let config = match load_config_from_string(yaml) {
            Ok(c) => c,
            Err(e) => panic!("should load minimal config: {e}"),
        };
        assert_eq!(config.batch_size, 500);
        assert_eq!(config.instrument_count, 200); // Default value
    }

    #[test]
    fn test_load_full_config() {
        let yaml = r"
inputs:
  - data/D0.csv
  - data/D1.csv
output_dir: reports
batch_size: 2000
instrument_count: 50
workers:
  max_threads: 4
logging:
  level: debug
  format: pretty
";

        let config = load_config_from_string(yaml).unwrap();
        assert_eq!(config.inputs.len(), 2);
        assert_eq!(config.output_dir, PathBuf::from("reports"));
        assert_eq!(config.instrument_count, 50);
        assert_eq!(config.workers.max_threads, 4);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let result = load_config_from_string("batch_size: 0\n");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_zero_instruments_rejected() {
        let result = load_config_from_string("instrument_count: 0\n");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_env_var_with_default_when_missing() {
        // Use a variable name unlikely to exist
        let input = "output_dir: ${TRADE_ETL_CONFIG_TEST_NONEXISTENT_VAR:-out}";
        assert_eq!(interpolate_env_vars(input), "output_dir: out");
    }

    #[test]
    fn test_env_var_without_default_when_missing() {
        let input = "level: '${TRADE_ETL_CONFIG_TEST_ALSO_MISSING}'";
        assert_eq!(interpolate_env_vars(input), "level: ''");
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("etl.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "instrument_count: 3").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.instrument_count, 3);
    }

    #[test]
    fn test_missing_config_file() {
        let result = load_config("/nonexistent/etl.yaml");
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }
}
