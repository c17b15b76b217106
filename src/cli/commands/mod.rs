//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod dry_run;
pub mod validate;
