//! Rule compilation
//!
//! The wire-level [`TransformationRule`] is an open record of optional
//! fields; this module compiles it into a closed tagged variant with a fixed
//! parameter schema per operation. Anything structurally wrong surfaces here
//! as issues, which the validator turns into field-level errors - so an
//! accepted job definition can never hit an "unknown transformation" case at
//! run time.

use crate::domain::job::{TransformationRule, TransformationType};
use serde_json::Value;
use std::str::FromStr;

/// Target types supported by CONVERT_TYPE
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetType {
    String,
    /// 32-bit range-checked integer
    Integer,
    /// 64-bit integer
    Long,
    Float,
    Double,
    Boolean,
    /// Timestamp parsed with the `format` parameter
    Date,
}

impl FromStr for TargetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "string" => Ok(TargetType::String),
            "integer" | "int" => Ok(TargetType::Integer),
            "long" => Ok(TargetType::Long),
            "float" => Ok(TargetType::Float),
            "double" => Ok(TargetType::Double),
            "boolean" | "bool" => Ok(TargetType::Boolean),
            "date" => Ok(TargetType::Date),
            other => Err(format!(
                "unknown target type '{other}'; expected one of string, integer, long, float, double, boolean, date"
            )),
        }
    }
}

impl std::fmt::Display for TargetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TargetType::String => "string",
            TargetType::Integer => "integer",
            TargetType::Long => "long",
            TargetType::Float => "float",
            TargetType::Double => "double",
            TargetType::Boolean => "boolean",
            TargetType::Date => "date",
        };
        write!(f, "{name}")
    }
}

/// Default timestamp format for CONVERT_TYPE with target type `date`
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A transformation operation with its parameters resolved
#[derive(Debug, Clone, PartialEq)]
pub enum Transformation {
    /// Copy the source field's value unchanged; strict on missing fields
    Map { source_field: String },
    /// Emit a constant, ignoring the source row
    Constant { value: Value },
    /// Parse the source value into a target type
    ConvertType {
        source_field: String,
        target_type: TargetType,
        /// chrono format string, only meaningful for `date`
        format: String,
    },
    /// Join source fields' string representations; lenient on missing fields
    Concat {
        source_fields: Vec<String>,
        separator: String,
    },
    Trim { source_field: String },
    Uppercase { source_field: String },
    Lowercase { source_field: String },
    /// Substitute a default when the source is null or absent
    DefaultIfNull {
        source_field: String,
        default: Value,
    },
}

/// A validated rule ready for row application
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledRule {
    /// Output field this rule writes
    pub target_field: String,
    /// The operation to perform
    pub op: Transformation,
}

/// A structural problem found while compiling one rule
///
/// `field` names the offending sub-field relative to the rule, so the
/// validator can build a full path like `rules[2].parameters.targetType`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleIssue {
    pub field: &'static str,
    pub message: String,
}

impl RuleIssue {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl CompiledRule {
    /// Compiles a wire-level rule into its closed form
    ///
    /// Returns every structural issue found, not just the first, so the
    /// validator can report them all in one pass.
    pub fn compile(rule: &TransformationRule) -> Result<Self, Vec<RuleIssue>> {
        let mut issues = Vec::new();

        if rule.target_field.trim().is_empty() {
            issues.push(RuleIssue::new("targetField", "must not be empty"));
        }

        let kind = rule.transformation_type;
        let has_single = rule.source_field.as_deref().is_some_and(|f| !f.is_empty());
        let has_multi = rule
            .source_fields
            .as_deref()
            .is_some_and(|fs| !fs.is_empty());

        if kind.wants_source_field() {
            if !has_single {
                issues.push(RuleIssue::new(
                    "sourceField",
                    format!("{kind} requires a sourceField"),
                ));
            }
            if has_multi {
                issues.push(RuleIssue::new(
                    "sourceFields",
                    format!("{kind} takes a single sourceField, not sourceFields"),
                ));
            }
        }
        if kind.wants_source_fields() {
            if !has_multi {
                issues.push(RuleIssue::new(
                    "sourceFields",
                    format!("{kind} requires a non-empty sourceFields list"),
                ));
            }
            if has_single {
                issues.push(RuleIssue::new(
                    "sourceField",
                    format!("{kind} takes sourceFields, not a single sourceField"),
                ));
            }
        }

        let op = match kind {
            TransformationType::Map => has_single.then(|| Transformation::Map {
                source_field: rule.source_field.clone().unwrap_or_default(),
            }),
            TransformationType::Constant => Some(Transformation::Constant {
                value: rule.constant_value.clone().unwrap_or(Value::Null),
            }),
            TransformationType::ConvertType => {
                let target_type = match rule.parameters.get("targetType") {
                    Some(raw) => match TargetType::from_str(raw) {
                        Ok(t) => Some(t),
                        Err(e) => {
                            issues.push(RuleIssue::new("parameters.targetType", e));
                            None
                        }
                    },
                    None => {
                        issues.push(RuleIssue::new(
                            "parameters.targetType",
                            "CONVERT_TYPE requires the targetType parameter",
                        ));
                        None
                    }
                };
                match (has_single, target_type) {
                    (true, Some(target_type)) => Some(Transformation::ConvertType {
                        source_field: rule.source_field.clone().unwrap_or_default(),
                        target_type,
                        format: rule
                            .parameters
                            .get("format")
                            .cloned()
                            .unwrap_or_else(|| DEFAULT_DATE_FORMAT.to_string()),
                    }),
                    _ => None,
                }
            }
            TransformationType::Concat => has_multi.then(|| Transformation::Concat {
                source_fields: rule.source_fields.clone().unwrap_or_default(),
                separator: rule.parameters.get("separator").cloned().unwrap_or_default(),
            }),
            TransformationType::Trim => has_single.then(|| Transformation::Trim {
                source_field: rule.source_field.clone().unwrap_or_default(),
            }),
            TransformationType::Uppercase => has_single.then(|| Transformation::Uppercase {
                source_field: rule.source_field.clone().unwrap_or_default(),
            }),
            TransformationType::Lowercase => has_single.then(|| Transformation::Lowercase {
                source_field: rule.source_field.clone().unwrap_or_default(),
            }),
            TransformationType::DefaultIfNull => {
                let default = match rule.parameters.get("default") {
                    Some(raw) => Some(Value::String(raw.clone())),
                    None => {
                        issues.push(RuleIssue::new(
                            "parameters.default",
                            "DEFAULT_IF_NULL requires the default parameter",
                        ));
                        None
                    }
                };
                match (has_single, default) {
                    (true, Some(default)) => Some(Transformation::DefaultIfNull {
                        source_field: rule.source_field.clone().unwrap_or_default(),
                        default,
                    }),
                    _ => None,
                }
            }
        };

        match op {
            Some(op) if issues.is_empty() => Ok(CompiledRule {
                target_field: rule.target_field.clone(),
                op,
            }),
            _ => Err(issues),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("string", TargetType::String)]
    #[test_case("Integer", TargetType::Integer)]
    #[test_case("INT", TargetType::Integer)]
    #[test_case("long", TargetType::Long)]
    #[test_case("double", TargetType::Double)]
    #[test_case("bool", TargetType::Boolean)]
    #[test_case("date", TargetType::Date)]
    fn test_target_type_parsing(input: &str, expected: TargetType) {
        assert_eq!(TargetType::from_str(input).unwrap(), expected);
    }

    #[test]
    fn test_target_type_unknown() {
        let err = TargetType::from_str("decimal").unwrap_err();
        assert!(err.contains("decimal"));
    }

    #[test]
    fn test_compile_map() {
        let rule = TransformationRule::new(TransformationType::Map, "a", "b");
        let compiled = CompiledRule::compile(&rule).unwrap();
        assert_eq!(compiled.target_field, "b");
        assert_eq!(
            compiled.op,
            Transformation::Map {
                source_field: "a".to_string()
            }
        );
    }

    #[test]
    fn test_compile_map_without_source_field() {
        let mut rule = TransformationRule::new(TransformationType::Map, "a", "b");
        rule.source_field = None;
        let issues = CompiledRule::compile(&rule).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "sourceField");
    }

    #[test]
    fn test_compile_rejects_both_source_forms() {
        let mut rule = TransformationRule::new(TransformationType::Trim, "a", "b");
        rule.source_fields = Some(vec!["x".to_string()]);
        let issues = CompiledRule::compile(&rule).unwrap_err();
        assert!(issues.iter().any(|i| i.field == "sourceFields"));
    }

    #[test]
    fn test_compile_constant_defaults_to_null() {
        let mut rule = TransformationRule::constant("flag", json!(true));
        let compiled = CompiledRule::compile(&rule).unwrap();
        assert_eq!(
            compiled.op,
            Transformation::Constant { value: json!(true) }
        );

        rule.constant_value = None;
        let compiled = CompiledRule::compile(&rule).unwrap();
        assert_eq!(
            compiled.op,
            Transformation::Constant { value: Value::Null }
        );
    }

    #[test]
    fn test_compile_convert_type_requires_target_type() {
        let rule = TransformationRule::new(TransformationType::ConvertType, "a", "b");
        let issues = CompiledRule::compile(&rule).unwrap_err();
        assert_eq!(issues[0].field, "parameters.targetType");
    }

    #[test]
    fn test_compile_convert_type_bad_target_type() {
        let rule = TransformationRule::new(TransformationType::ConvertType, "a", "b")
            .with_parameter("targetType", "decimal");
        let issues = CompiledRule::compile(&rule).unwrap_err();
        assert_eq!(issues[0].field, "parameters.targetType");
        assert!(issues[0].message.contains("decimal"));
    }

    #[test]
    fn test_compile_concat_defaults_separator_to_empty() {
        let rule = TransformationRule {
            target_field: "joined".to_string(),
            source_field: None,
            source_fields: Some(vec!["a".to_string(), "b".to_string()]),
            transformation_type: TransformationType::Concat,
            constant_value: None,
            parameters: Default::default(),
        };
        let compiled = CompiledRule::compile(&rule).unwrap();
        assert_eq!(
            compiled.op,
            Transformation::Concat {
                source_fields: vec!["a".to_string(), "b".to_string()],
                separator: String::new()
            }
        );
    }

    #[test]
    fn test_compile_default_if_null_requires_default() {
        let rule = TransformationRule::new(TransformationType::DefaultIfNull, "a", "b");
        let issues = CompiledRule::compile(&rule).unwrap_err();
        assert_eq!(issues[0].field, "parameters.default");
    }

    #[test]
    fn test_compile_empty_target_field() {
        let rule = TransformationRule::new(TransformationType::Map, "a", "  ");
        let issues = CompiledRule::compile(&rule).unwrap_err();
        assert!(issues.iter().any(|i| i.field == "targetField"));
    }

    #[test]
    fn test_compile_collects_multiple_issues() {
        let rule = TransformationRule {
            target_field: String::new(),
            source_field: None,
            source_fields: None,
            transformation_type: TransformationType::ConvertType,
            constant_value: None,
            parameters: Default::default(),
        };
        let issues = CompiledRule::compile(&rule).unwrap_err();
        // empty target, missing source, missing targetType
        assert_eq!(issues.len(), 3);
    }
}
