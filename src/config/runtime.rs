//! Runtime configuration schema and loading
//!
//! Trellis reads operational settings (batching, logging) from a TOML file.
//! Job definitions themselves arrive through the orchestration API and are
//! not part of this file.

use crate::domain::errors::TrellisError;
use crate::domain::result::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Root runtime configuration, mapped from the TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Executor settings
    #[serde(default)]
    pub execution: ExecutionConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl RuntimeConfig {
    /// Loads configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(TrellisError::Configuration(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            TrellisError::Configuration(format!(
                "Failed to read configuration file {}: {e}",
                path.display()
            ))
        })?;

        let config: RuntimeConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a file if it exists, otherwise defaults
    ///
    /// Used by the CLI, where a missing config file is not an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        self.execution.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Executor settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Rows per extraction/load batch (1-100000)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
        }
    }
}

impl ExecutionConfig {
    fn validate(&self) -> Result<()> {
        if self.batch_size == 0 || self.batch_size > 100_000 {
            return Err(TrellisError::Configuration(format!(
                "execution.batch_size must be between 1 and 100000, got {}",
                self.batch_size
            )));
        }
        Ok(())
    }
}

fn default_batch_size() -> usize {
    500
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to also write JSON logs to rotated files
    #[serde(default)]
    pub file_enabled: bool,

    /// Directory for rotated log files
    #[serde(default = "default_log_path")]
    pub file_path: String,

    /// Rotation period: `daily` or `hourly`
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_enabled: false,
            file_path: default_log_path(),
            rotation: default_rotation(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<()> {
        match self.rotation.as_str() {
            "daily" | "hourly" => {}
            other => {
                return Err(TrellisError::Configuration(format!(
                    "logging.rotation must be 'daily' or 'hourly', got '{other}'"
                )))
            }
        }
        if self.file_enabled && self.file_path.is_empty() {
            return Err(TrellisError::Configuration(
                "logging.file_path must be set when file logging is enabled".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_path() -> String {
    "logs".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}
