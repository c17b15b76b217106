//! Domain error types
//!
//! This module defines the error hierarchy for Trellis. All errors are
//! domain-specific and don't expose third-party types. Every error surfaced
//! at the API boundary carries a stable machine-readable kind via
//! [`TrellisError::kind`]; raw driver-level text is only ever part of the
//! human-readable message.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single field-level validation error
///
/// Produced by the job definition validator. The path identifies the
/// offending field in the submitted job configuration, e.g.
/// `tableTransformationConfigs.orders.rules[2].targetField`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Path to the invalid field within the job configuration
    pub path: String,

    /// Human-readable description of the problem
    pub message: String,
}

impl FieldError {
    /// Creates a new field error
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Main Trellis error type
///
/// This is the primary error type used throughout the crate. It wraps
/// specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum TrellisError {
    /// Job definition rejected by the validator; never retried
    #[error("Invalid job definition: {}", format_field_errors(.0))]
    Definition(Vec<FieldError>),

    /// Cannot reach a source or target database; fatal to an execution
    #[error("Connection error: {0}")]
    Connection(String),

    /// Per-row transformation failure; recovered at row granularity
    #[error("Row transform error: {0}")]
    Transform(#[from] RowTransformError),

    /// Target rejected a row; recovered at row granularity
    #[error("Load error: {0}")]
    Load(String),

    /// Requested job or execution does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Operation conflicts with current state (e.g. deleting a job with a
    /// running execution, or reusing a job name)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Execution state management errors
    #[error("State management error: {0}")]
    State(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl TrellisError {
    /// Stable machine-readable error kind
    ///
    /// Intended for the HTTP layer (out of scope here) to map onto status
    /// codes, and for clients to branch on without parsing messages.
    pub fn kind(&self) -> &'static str {
        match self {
            TrellisError::Definition(_) => "definition",
            TrellisError::Connection(_) => "connection",
            TrellisError::Transform(e) => e.kind(),
            TrellisError::Load(_) => "load",
            TrellisError::NotFound(_) => "not_found",
            TrellisError::Conflict(_) => "conflict",
            TrellisError::State(_) => "state",
            TrellisError::Configuration(_) => "configuration",
            TrellisError::Serialization(_) => "serialization",
            TrellisError::Io(_) => "io",
        }
    }

    /// Field-level detail for definition errors, empty otherwise
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            TrellisError::Definition(errors) => errors,
            _ => &[],
        }
    }
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Row-level transformation errors
///
/// These errors are recorded in per-table results and never abort a batch
/// or a table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowTransformError {
    /// Source field absent from the row; distinct from a present null value
    #[error("Source field '{field}' is missing from the row")]
    MissingField { field: String },

    /// Source value could not be parsed into the requested target type
    #[error("Cannot convert '{value}' to {target_type}")]
    Conversion { value: String, target_type: String },

    /// Source value is not representable in the form the rule requires
    #[error("Field '{field}' has an incompatible type: {message}")]
    TypeMismatch { field: String, message: String },
}

impl RowTransformError {
    /// Stable machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            RowTransformError::MissingField { .. } => "missing_field",
            RowTransformError::Conversion { .. } => "conversion",
            RowTransformError::TypeMismatch { .. } => "type_mismatch",
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for TrellisError {
    fn from(err: std::io::Error) -> Self {
        TrellisError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for TrellisError {
    fn from(err: serde_json::Error) -> Self {
        TrellisError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for TrellisError {
    fn from(err: toml::de::Error) -> Self {
        TrellisError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_error_display() {
        let err = TrellisError::Definition(vec![
            FieldError::new("jobName", "must not be empty"),
            FieldError::new("tablesToProcess", "must not be empty"),
        ]);
        let text = err.to_string();
        assert!(text.contains("jobName: must not be empty"));
        assert!(text.contains("tablesToProcess: must not be empty"));
    }

    #[test]
    fn test_error_kinds_are_stable() {
        assert_eq!(TrellisError::Connection("x".into()).kind(), "connection");
        assert_eq!(TrellisError::Definition(vec![]).kind(), "definition");
        assert_eq!(TrellisError::Conflict("x".into()).kind(), "conflict");
        assert_eq!(
            TrellisError::Transform(RowTransformError::MissingField {
                field: "a".into()
            })
            .kind(),
            "missing_field"
        );
    }

    #[test]
    fn test_conversion_error_carries_diagnostics() {
        let err = RowTransformError::Conversion {
            value: "abc".to_string(),
            target_type: "integer".to_string(),
        };
        assert_eq!(err.to_string(), "Cannot convert 'abc' to integer");
        assert_eq!(err.kind(), "conversion");
    }

    #[test]
    fn test_field_errors_accessor() {
        let err = TrellisError::Definition(vec![FieldError::new("jobName", "empty")]);
        assert_eq!(err.field_errors().len(), 1);

        let other = TrellisError::Connection("refused".into());
        assert!(other.field_errors().is_empty());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: TrellisError = io_err.into();
        assert!(matches!(err, TrellisError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: TrellisError = json_err.into();
        assert!(matches!(err, TrellisError::Serialization(_)));
    }

    #[test]
    fn test_trellis_error_implements_std_error() {
        let err = TrellisError::State("test".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
