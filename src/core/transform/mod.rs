//! Transformation rule engine
//!
//! Pure function library: compiles per-field transformation rules and
//! applies them to rows of source data. Rules are evaluated independently
//! per row; failures are collected, never thrown across the row.
//!
//! Tables without an explicit transformation config use identity
//! passthrough: all source columns are copied unchanged.

pub mod engine;
pub mod rule;

pub use engine::{apply, apply_all, RowOutcome, RuleFailure};
pub use rule::{CompiledRule, RuleIssue, TargetType, Transformation, DEFAULT_DATE_FORMAT};

use crate::domain::errors::{FieldError, TrellisError};
use crate::domain::job::EtlJobConfig;
use crate::domain::result::Result;
use crate::domain::row::Row;

/// The compiled transformation plan for one table
#[derive(Debug, Clone)]
pub enum TableRules {
    /// No explicit config: copy all source columns unchanged
    Passthrough,
    /// Apply the compiled rule set to each row
    Rules(Vec<CompiledRule>),
}

impl TableRules {
    /// Compiles the transformation plan for one table of a job
    ///
    /// # Errors
    ///
    /// Returns a definition error with field-level paths if any rule fails
    /// to compile. A validated job definition cannot hit this, but
    /// definitions can become stale and are re-checked at execution start.
    pub fn for_table(job: &EtlJobConfig, table: &str) -> Result<Self> {
        let Some(config) = job.transformation_for(table) else {
            return Ok(TableRules::Passthrough);
        };

        let mut compiled = Vec::with_capacity(config.rules.len());
        let mut errors = Vec::new();
        for (index, rule) in config.rules.iter().enumerate() {
            match CompiledRule::compile(rule) {
                Ok(rule) => compiled.push(rule),
                Err(issues) => errors.extend(issues.into_iter().map(|issue| {
                    FieldError::new(
                        format!(
                            "tableTransformationConfigs.{table}.rules[{index}].{}",
                            issue.field
                        ),
                        issue.message,
                    )
                })),
            }
        }

        if errors.is_empty() {
            Ok(TableRules::Rules(compiled))
        } else {
            Err(TrellisError::Definition(errors))
        }
    }

    /// Transforms one source row according to this plan
    pub fn transform(&self, row: &Row) -> RowOutcome {
        match self {
            TableRules::Passthrough => RowOutcome {
                target_row: row.clone(),
                errors: Vec::new(),
            },
            TableRules::Rules(rules) => apply_all(rules, row),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;
    use crate::domain::ids::JobId;
    use crate::domain::job::{
        DatabaseConnectionConfig, JobTransformationConfig, TransformationRule, TransformationType,
    };
    use crate::domain::row::row_from_pairs;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn job_with_rules(table: &str, rules: Vec<TransformationRule>) -> EtlJobConfig {
        let connection = |name: &str| DatabaseConnectionConfig {
            connection_name: name.to_string(),
            url: format!("db://{name}"),
            driver: "postgres".to_string(),
            username: "etl".to_string(),
            password: secret_string("pw".to_string()),
            additional_properties: BTreeMap::new(),
        };
        EtlJobConfig {
            job_id: JobId::generate(),
            job_name: "test".to_string(),
            source_db_config: connection("src"),
            target_db_config: connection("dst"),
            tables_to_process: vec![table.to_string()],
            table_transformation_configs: [(
                table.to_string(),
                JobTransformationConfig::new(rules),
            )]
            .into(),
        }
    }

    #[test]
    fn test_absent_table_is_passthrough() {
        let job = job_with_rules("orders", vec![]);
        let rules = TableRules::for_table(&job, "customers").unwrap();
        assert!(matches!(rules, TableRules::Passthrough));

        let row = row_from_pairs([("a", json!(1)), ("b", json!("x"))]);
        let outcome = rules.transform(&row);
        assert_eq!(outcome.target_row, row);
        assert!(!outcome.is_failed());
    }

    #[test]
    fn test_compiled_rules_transform() {
        let job = job_with_rules(
            "orders",
            vec![TransformationRule::new(
                TransformationType::Uppercase,
                "code",
                "CODE",
            )],
        );
        let rules = TableRules::for_table(&job, "orders").unwrap();
        let outcome = rules.transform(&row_from_pairs([("code", json!("ab"))]));
        assert_eq!(outcome.target_row["CODE"], json!("AB"));
    }

    #[test]
    fn test_compile_failure_carries_paths() {
        let job = job_with_rules(
            "orders",
            vec![TransformationRule::new(
                TransformationType::ConvertType,
                "a",
                "b",
            )],
        );
        let err = TableRules::for_table(&job, "orders").unwrap_err();
        let errors = err.field_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].path,
            "tableTransformationConfigs.orders.rules[0].parameters.targetType"
        );
    }
}
