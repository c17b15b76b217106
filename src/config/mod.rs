//! Configuration management for Trellis.
//!
//! This module provides TOML-based runtime configuration loading and
//! validation, plus the secret wrapper used for database credentials.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use trellis::config::RuntimeConfig;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RuntimeConfig::from_file("trellis.toml")?;
//! println!("Batch size: {}", config.execution.batch_size);
//! # Ok(())
//! # }
//! ```

pub mod runtime;
pub mod secret;

pub use runtime::{ExecutionConfig, LoggingConfig, RuntimeConfig};
pub use secret::{secret_string, serialize_redacted, SecretString, SecretValue, REDACTED};
