//! Rule application
//!
//! Pure functions that apply compiled rules to source rows. There is no
//! hidden state: re-applying the same rules to the same row yields an
//! identical target row.

use crate::domain::errors::RowTransformError;
use crate::domain::row::Row;
use chrono::{NaiveDateTime, TimeZone, Utc};
use serde_json::{Number, Value};

use super::rule::{CompiledRule, TargetType, Transformation};

/// A rule that failed for one row, keyed by the field it would have written
#[derive(Debug, Clone, PartialEq)]
pub struct RuleFailure {
    /// The target field the failing rule writes
    pub target_field: String,
    /// What went wrong
    pub error: RowTransformError,
}

/// Result of applying a rule set to one row
///
/// Rules are evaluated independently, so a failing rule never blocks the
/// others; `target_row` holds every value that did evaluate, even when the
/// row counts as failed overall.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowOutcome {
    /// Values produced by the rules that succeeded
    pub target_row: Row,
    /// One entry per failing rule
    pub errors: Vec<RuleFailure>,
}

impl RowOutcome {
    /// A row is failed overall if any rule failed
    pub fn is_failed(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Applies a single rule to a source row
///
/// # Errors
///
/// Returns a [`RowTransformError`] when the rule cannot produce a value:
/// a strict rule's source field is absent, a conversion fails, or the
/// source value is not string-representable for a string rule.
pub fn apply(rule: &CompiledRule, row: &Row) -> Result<Value, RowTransformError> {
    match &rule.op {
        Transformation::Map { source_field } => match row.get(source_field) {
            // Absence of a column is a hard error; a present null propagates.
            None => Err(RowTransformError::MissingField {
                field: source_field.clone(),
            }),
            Some(value) => Ok(value.clone()),
        },
        Transformation::Constant { value } => Ok(value.clone()),
        Transformation::ConvertType {
            source_field,
            target_type,
            format,
        } => match row.get(source_field) {
            None => Err(RowTransformError::MissingField {
                field: source_field.clone(),
            }),
            Some(Value::Null) => Ok(Value::Null),
            Some(value) => convert_value(value, *target_type, format),
        },
        Transformation::Concat {
            source_fields,
            separator,
        } => {
            // Lenient: a missing field contributes an empty string, because
            // partial data is often still useful in a concatenation.
            let parts: Vec<String> = source_fields
                .iter()
                .map(|field| row.get(field).map(lenient_repr).unwrap_or_default())
                .collect();
            Ok(Value::String(parts.join(separator)))
        }
        Transformation::Trim { source_field } => {
            string_op(row, source_field, |s| s.trim().to_string())
        }
        Transformation::Uppercase { source_field } => {
            string_op(row, source_field, |s| s.to_uppercase())
        }
        Transformation::Lowercase { source_field } => {
            string_op(row, source_field, |s| s.to_lowercase())
        }
        Transformation::DefaultIfNull {
            source_field,
            default,
        } => match row.get(source_field) {
            None | Some(Value::Null) => Ok(default.clone()),
            Some(value) => Ok(value.clone()),
        },
    }
}

/// Applies every rule of a set to one source row
///
/// Rules are evaluated independently without short-circuiting: a single bad
/// field does not block the row's other fields. The caller decides how to
/// treat partially-transformed rows; see [`RowOutcome::is_failed`].
pub fn apply_all(rules: &[CompiledRule], row: &Row) -> RowOutcome {
    let mut outcome = RowOutcome::default();
    for rule in rules {
        match apply(rule, row) {
            Ok(value) => {
                outcome.target_row.insert(rule.target_field.clone(), value);
            }
            Err(error) => outcome.errors.push(RuleFailure {
                target_field: rule.target_field.clone(),
                error,
            }),
        }
    }
    outcome
}

/// Single-field string normalization shared by TRIM/UPPERCASE/LOWERCASE
fn string_op(
    row: &Row,
    source_field: &str,
    f: impl Fn(&str) -> String,
) -> Result<Value, RowTransformError> {
    match row.get(source_field) {
        None => Err(RowTransformError::MissingField {
            field: source_field.to_string(),
        }),
        Some(Value::Null) => Ok(Value::Null),
        Some(value) => match strict_repr(value) {
            Some(s) => Ok(Value::String(f(&s))),
            None => Err(RowTransformError::TypeMismatch {
                field: source_field.to_string(),
                message: format!("expected a string-representable value, got {}", type_name(value)),
            }),
        },
    }
}

/// String form of a scalar value; None for arrays and objects
fn strict_repr(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// String form used by CONCAT: null becomes empty, composites use JSON text
fn lenient_repr(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Raw value text carried in conversion error diagnostics
fn raw_repr(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn conversion_error(value: &Value, target_type: TargetType) -> RowTransformError {
    RowTransformError::Conversion {
        value: raw_repr(value),
        target_type: target_type.to_string(),
    }
}

/// Parses a non-null source value into the requested target type
fn convert_value(
    value: &Value,
    target_type: TargetType,
    format: &str,
) -> Result<Value, RowTransformError> {
    match target_type {
        TargetType::String => strict_repr(value)
            .map(Value::String)
            .ok_or_else(|| conversion_error(value, target_type)),
        TargetType::Integer => {
            let n = parse_integer(value).ok_or_else(|| conversion_error(value, target_type))?;
            if n < i32::MIN as i64 || n > i32::MAX as i64 {
                return Err(conversion_error(value, target_type));
            }
            Ok(Value::Number(n.into()))
        }
        TargetType::Long => parse_integer(value)
            .map(|n| Value::Number(n.into()))
            .ok_or_else(|| conversion_error(value, target_type)),
        TargetType::Float | TargetType::Double => parse_float(value)
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| conversion_error(value, target_type)),
        TargetType::Boolean => parse_boolean(value)
            .map(Value::Bool)
            .ok_or_else(|| conversion_error(value, target_type)),
        TargetType::Date => parse_date(value, format)
            .map(Value::String)
            .ok_or_else(|| conversion_error(value, target_type)),
    }
}

fn parse_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn parse_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        // Tolerate thousands separators in string input, e.g. "1,234.56"
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    }
}

fn parse_boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(_) | Value::String(_) => {
            let s = strict_repr(value)?.trim().to_lowercase();
            match s.as_str() {
                "true" | "1" | "yes" | "y" => Some(true),
                "false" | "0" | "no" | "n" => Some(false),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Parses a timestamp and renders it in canonical `%Y-%m-%dT%H:%M:%S` form
///
/// Numbers are interpreted as epoch milliseconds.
fn parse_date(value: &Value, format: &str) -> Option<String> {
    const CANONICAL: &str = "%Y-%m-%dT%H:%M:%S";
    match value {
        Value::String(s) => NaiveDateTime::parse_from_str(s.trim(), format)
            .ok()
            .map(|dt| dt.format(CANONICAL).to_string()),
        Value::Number(n) => {
            let millis = n.as_i64()?;
            Utc.timestamp_millis_opt(millis)
                .single()
                .map(|dt| dt.naive_utc().format(CANONICAL).to_string())
        }
        _ => None,
    }
}
