//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Trellis using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Trellis - ETL job orchestration tool
#[derive(Parser, Debug)]
#[command(name = "trellis")]
#[command(version, about, long_about = None)]
#[command(author = "Trellis Contributors")]
pub struct Cli {
    /// Path to runtime configuration file
    #[arg(short, long, default_value = "trellis.toml", env = "TRELLIS_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "TRELLIS_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a job definition file without running it
    Validate(commands::validate::ValidateArgs),

    /// Run a job definition against in-memory data and print the outcome
    DryRun(commands::dry_run::DryRunArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_validate() {
        let cli = Cli::parse_from(["trellis", "validate", "--job", "job.json"]);
        assert_eq!(cli.config, "trellis.toml");
        assert!(matches!(cli.command, Commands::Validate(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from([
            "trellis",
            "--config",
            "custom.toml",
            "validate",
            "--job",
            "job.json",
        ]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from([
            "trellis",
            "--log-level",
            "debug",
            "validate",
            "--job",
            "job.json",
        ]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_dry_run() {
        let cli = Cli::parse_from([
            "trellis",
            "dry-run",
            "--job",
            "job.json",
            "--data",
            "rows.json",
        ]);
        assert!(matches!(cli.command, Commands::DryRun(_)));
    }
}
