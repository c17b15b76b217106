//! Job definition model
//!
//! These types mirror the wire contract the UI submits: database connection
//! configs, per-table transformation rules, and the job definition that ties
//! them together. A job definition is immutable once created; editing means
//! replacing the whole object.

use crate::config::{serialize_redacted, SecretString};
use crate::domain::ids::JobId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Connection details for one side of an ETL job
///
/// The password is write-only: it deserializes from a plaintext request body
/// but serializes as a redaction placeholder, so read responses never echo it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseConnectionConfig {
    /// Unique key for this connection within a job, e.g. `sourceOraclePROD`
    pub connection_name: String,

    /// Connection URI/DSN
    pub url: String,

    /// Driver identifier, e.g. `postgres`, `oracle`
    pub driver: String,

    /// Username for authentication
    pub username: String,

    /// Password; never echoed back in read responses
    #[serde(serialize_with = "serialize_redacted")]
    pub password: SecretString,

    /// Driver-specific settings (pool sizing, TLS options, ...)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub additional_properties: BTreeMap<String, String>,
}

/// The closed set of supported transformation operations
///
/// Modeled as an enum rather than an open string so that unknown types are
/// rejected at deserialization time instead of failing at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransformationType {
    /// Copy the source field's value unchanged
    Map,
    /// Emit a constant value, ignoring the source row
    Constant,
    /// Parse the source value into the type named in `parameters["targetType"]`
    ConvertType,
    /// Join several source fields with `parameters["separator"]`
    Concat,
    /// Trim surrounding whitespace from a string value
    Trim,
    /// Uppercase a string value
    Uppercase,
    /// Lowercase a string value
    Lowercase,
    /// Substitute `parameters["default"]` when the source is null or absent
    DefaultIfNull,
}

impl TransformationType {
    /// Whether this type consumes a single `sourceField`
    pub fn wants_source_field(&self) -> bool {
        !matches!(
            self,
            TransformationType::Constant | TransformationType::Concat
        )
    }

    /// Whether this type consumes an ordered `sourceFields` list
    pub fn wants_source_fields(&self) -> bool {
        matches!(self, TransformationType::Concat)
    }
}

impl std::fmt::Display for TransformationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TransformationType::Map => "MAP",
            TransformationType::Constant => "CONSTANT",
            TransformationType::ConvertType => "CONVERT_TYPE",
            TransformationType::Concat => "CONCAT",
            TransformationType::Trim => "TRIM",
            TransformationType::Uppercase => "UPPERCASE",
            TransformationType::Lowercase => "LOWERCASE",
            TransformationType::DefaultIfNull => "DEFAULT_IF_NULL",
        };
        write!(f, "{name}")
    }
}

/// A declarative instruction mapping source field(s) to one target field
///
/// Invariant: exactly one of `source_field` / `source_fields` is populated
/// unless the type is `CONSTANT`, in which case neither is required. The
/// validator enforces this; see [`crate::core::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformationRule {
    /// Output field this rule writes; unique within a table's rule set
    pub target_field: String,

    /// Single source field, for single-input rule types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_field: Option<String>,

    /// Ordered source field list, for multi-field aggregation rules
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_fields: Option<Vec<String>>,

    /// The operation to perform
    pub transformation_type: TransformationType,

    /// Value emitted by `CONSTANT` rules
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant_value: Option<Value>,

    /// Rule-specific options, e.g. `targetType` for CONVERT_TYPE or
    /// `separator` for CONCAT
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
}

impl TransformationRule {
    /// Creates a single-source rule with no parameters
    pub fn new(
        transformation_type: TransformationType,
        source_field: impl Into<String>,
        target_field: impl Into<String>,
    ) -> Self {
        Self {
            target_field: target_field.into(),
            source_field: Some(source_field.into()),
            source_fields: None,
            transformation_type,
            constant_value: None,
            parameters: BTreeMap::new(),
        }
    }

    /// Creates a CONSTANT rule
    pub fn constant(target_field: impl Into<String>, value: Value) -> Self {
        Self {
            target_field: target_field.into(),
            source_field: None,
            source_fields: None,
            transformation_type: TransformationType::Constant,
            constant_value: Some(value),
            parameters: BTreeMap::new(),
        }
    }

    /// Adds a parameter
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}

/// Ordered transformation rules scoped to one table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobTransformationConfig {
    /// Rules applied independently to each row of the table
    pub rules: Vec<TransformationRule>,
}

impl JobTransformationConfig {
    /// Creates a transformation config from a rule list
    pub fn new(rules: Vec<TransformationRule>) -> Self {
        Self { rules }
    }
}

/// A stored, immutable description of one ETL task
///
/// Tables absent from `table_transformation_configs` use identity
/// passthrough: all source columns are copied unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtlJobConfig {
    /// System-generated, immutable, unique
    pub job_id: JobId,

    /// User-provided display name; uniqueness enforced at job creation
    pub job_name: String,

    /// Where rows are extracted from
    pub source_db_config: DatabaseConnectionConfig,

    /// Where transformed rows are written
    pub target_db_config: DatabaseConnectionConfig,

    /// Ordered set of table names; non-empty, duplicates rejected
    pub tables_to_process: Vec<String>,

    /// Per-table transformation rules keyed by table name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub table_transformation_configs: BTreeMap<String, JobTransformationConfig>,
}

impl EtlJobConfig {
    /// Returns the transformation config for a table, if one is defined
    ///
    /// `None` means identity passthrough for that table.
    pub fn transformation_for(&self, table: &str) -> Option<&JobTransformationConfig> {
        self.table_transformation_configs.get(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{secret_string, REDACTED};
    use serde_json::json;

    fn connection(name: &str) -> DatabaseConnectionConfig {
        DatabaseConnectionConfig {
            connection_name: name.to_string(),
            url: format!("db://{name}"),
            driver: "postgres".to_string(),
            username: "etl".to_string(),
            password: secret_string("s3cret".to_string()),
            additional_properties: BTreeMap::new(),
        }
    }

    #[test]
    fn test_connection_config_password_redacted_on_serialize() {
        let config = connection("source");
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("s3cret"));
        assert!(json.contains(REDACTED));
    }

    #[test]
    fn test_connection_config_deserializes_plaintext_password() {
        let config: DatabaseConnectionConfig = serde_json::from_value(json!({
            "connectionName": "src",
            "url": "db://src",
            "driver": "oracle",
            "username": "etl",
            "password": "plain"
        }))
        .unwrap();
        use secrecy::ExposeSecret;
        assert_eq!(config.password.expose_secret().as_ref(), "plain");
        assert!(config.additional_properties.is_empty());
    }

    #[test]
    fn test_transformation_type_wire_names() {
        let t: TransformationType = serde_json::from_value(json!("CONVERT_TYPE")).unwrap();
        assert_eq!(t, TransformationType::ConvertType);
        assert_eq!(
            serde_json::to_value(TransformationType::DefaultIfNull).unwrap(),
            json!("DEFAULT_IF_NULL")
        );
    }

    #[test]
    fn test_unknown_transformation_type_rejected() {
        let result: Result<TransformationType, _> = serde_json::from_value(json!("CUSTOM_SCRIPT"));
        assert!(result.is_err());
    }

    #[test]
    fn test_rule_wire_shape() {
        let rule: TransformationRule = serde_json::from_value(json!({
            "targetField": "full_name",
            "sourceFields": ["first", "last"],
            "transformationType": "CONCAT",
            "parameters": {"separator": " "}
        }))
        .unwrap();
        assert_eq!(rule.target_field, "full_name");
        assert_eq!(rule.source_fields.as_deref(), Some(&["first".to_string(), "last".to_string()][..]));
        assert_eq!(rule.parameters["separator"], " ");
    }

    #[test]
    fn test_source_field_requirements_per_type() {
        assert!(TransformationType::Map.wants_source_field());
        assert!(!TransformationType::Constant.wants_source_field());
        assert!(TransformationType::Concat.wants_source_fields());
        assert!(!TransformationType::Concat.wants_source_field());
    }

    #[test]
    fn test_transformation_for_absent_table_is_none() {
        let job = EtlJobConfig {
            job_id: JobId::generate(),
            job_name: "copy".to_string(),
            source_db_config: connection("src"),
            target_db_config: connection("dst"),
            tables_to_process: vec!["orders".to_string()],
            table_transformation_configs: BTreeMap::new(),
        };
        assert!(job.transformation_for("orders").is_none());
    }
}
