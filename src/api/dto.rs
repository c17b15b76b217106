//! Request/response shapes for the orchestration API
//!
//! Jobs are submitted without an id; the service assigns one. Responses
//! reuse the domain types directly since they already serialize with the
//! wire contract (camelCase, redacted passwords).

use crate::domain::ids::{ExecutionId, JobId};
use crate::domain::job::{DatabaseConnectionConfig, EtlJobConfig, JobTransformationConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A job definition as submitted for creation, before an id is assigned
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    /// Display name; must be unique across stored jobs
    pub job_name: String,

    /// Where rows are extracted from
    pub source_db_config: DatabaseConnectionConfig,

    /// Where transformed rows are written
    pub target_db_config: DatabaseConnectionConfig,

    /// Ordered table names to process
    pub tables_to_process: Vec<String>,

    /// Per-table transformation rules; absent tables pass through unchanged
    #[serde(default)]
    pub table_transformation_configs: BTreeMap<String, JobTransformationConfig>,
}

impl CreateJobRequest {
    /// Assigns a fresh id, turning the request into a stored definition
    pub fn into_job(self) -> EtlJobConfig {
        EtlJobConfig {
            job_id: JobId::generate(),
            job_name: self.job_name,
            source_db_config: self.source_db_config,
            target_db_config: self.target_db_config,
            tables_to_process: self.tables_to_process,
            table_transformation_configs: self.table_transformation_configs,
        }
    }
}

/// Returned immediately when a job execution is accepted
///
/// Start is asynchronous: the execution may still be PENDING when this
/// response is produced. Clients poll the execution for progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartJobResponse {
    /// Identifier for polling execution status
    pub execution_id: ExecutionId,

    /// The job this execution belongs to
    pub job_id: JobId,
}
