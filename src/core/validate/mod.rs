//! Job definition validator
//!
//! Checks a job configuration for structural and semantic correctness
//! before acceptance. The validator never panics or throws past this
//! boundary; it returns either `Valid` or a non-empty ordered list of
//! field-level errors, and the caller decides status mapping.

use crate::core::transform::CompiledRule;
use crate::domain::errors::FieldError;
use crate::domain::job::{DatabaseConnectionConfig, EtlJobConfig};
use std::collections::BTreeSet;

/// Outcome of validating a job definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    errors: Vec<FieldError>,
}

impl ValidationResult {
    /// Whether the definition passed every check
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The ordered field-level errors; empty when valid
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Consumes the result, yielding the error list
    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }
}

/// Validates a job definition
///
/// Checks run in a fixed order and all errors are collected in one pass,
/// so a caller gets every problem at once rather than fixing them one
/// round-trip at a time.
pub fn validate(job: &EtlJobConfig) -> ValidationResult {
    let mut errors = Vec::new();

    // 1. Name and connection configs
    if job.job_name.trim().is_empty() {
        errors.push(FieldError::new("jobName", "must not be empty"));
    }
    check_connection(&job.source_db_config, "sourceDbConfig", &mut errors);
    check_connection(&job.target_db_config, "targetDbConfig", &mut errors);

    // 2. Table list: non-empty, duplicate-free
    if job.tables_to_process.is_empty() {
        errors.push(FieldError::new(
            "tablesToProcess",
            "must list at least one table",
        ));
    }
    let mut seen = BTreeSet::new();
    for (index, table) in job.tables_to_process.iter().enumerate() {
        if table.trim().is_empty() {
            errors.push(FieldError::new(
                format!("tablesToProcess[{index}]"),
                "table name must not be empty",
            ));
        } else if !seen.insert(table.as_str()) {
            errors.push(FieldError::new(
                format!("tablesToProcess[{index}]"),
                format!("duplicate table name '{table}'"),
            ));
        }
    }

    // 3. Per-table transformation configs
    for (table, config) in &job.table_transformation_configs {
        let mut targets = BTreeSet::new();
        for (index, rule) in config.rules.iter().enumerate() {
            let prefix = format!("tableTransformationConfigs.{table}.rules[{index}]");

            // No two rules may write the same output field; last-write
            // ambiguity is rejected, not silently resolved.
            if !rule.target_field.trim().is_empty()
                && !targets.insert(rule.target_field.as_str())
            {
                errors.push(FieldError::new(
                    format!("{prefix}.targetField"),
                    format!("duplicate target field '{}'", rule.target_field),
                ));
            }

            if let Err(issues) = CompiledRule::compile(rule) {
                errors.extend(issues.into_iter().map(|issue| {
                    FieldError::new(format!("{prefix}.{}", issue.field), issue.message)
                }));
            }
        }
    }

    ValidationResult { errors }
}

fn check_connection(
    config: &DatabaseConnectionConfig,
    path: &str,
    errors: &mut Vec<FieldError>,
) {
    if config.url.trim().is_empty() {
        errors.push(FieldError::new(format!("{path}.url"), "must not be empty"));
    }
    if config.driver.trim().is_empty() {
        errors.push(FieldError::new(
            format!("{path}.driver"),
            "must not be empty",
        ));
    }
    if config.username.trim().is_empty() {
        errors.push(FieldError::new(
            format!("{path}.username"),
            "must not be empty",
        ));
    }
}
