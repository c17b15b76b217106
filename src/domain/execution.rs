//! Job execution records
//!
//! A `JobExecution` is one timed run of a job definition with its own
//! independent outcome. Records are owned by the execution state tracker;
//! the executor driving a run is the only writer, status queries read
//! snapshots.

use crate::domain::errors::TrellisError;
use crate::domain::ids::{ExecutionId, JobId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Execution lifecycle states
///
/// ```text
/// PENDING -> RUNNING -> { SUCCEEDED | FAILED | PARTIALLY_SUCCEEDED | CANCELLED }
/// ```
///
/// Terminal states are final; no further transitions. FAILED is reserved for
/// infrastructure-level failure (unreachable connection, stale definition),
/// never for per-row data errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    /// Created, not yet picked up by an executor
    Pending,
    /// An executor is driving this run
    Running,
    /// Every table finished with zero failed rows
    Succeeded,
    /// Non-recoverable error; results may be empty or partial
    Failed,
    /// At least one row failed but the run completed
    PartiallySucceeded,
    /// Stopped on request after finishing the in-flight batch
    Cancelled,
}

impl ExecutionStatus {
    /// Whether this state admits no further transitions
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ExecutionStatus::Pending | ExecutionStatus::Running)
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ExecutionStatus::Pending => "PENDING",
            ExecutionStatus::Running => "RUNNING",
            ExecutionStatus::Succeeded => "SUCCEEDED",
            ExecutionStatus::Failed => "FAILED",
            ExecutionStatus::PartiallySucceeded => "PARTIALLY_SUCCEEDED",
            ExecutionStatus::Cancelled => "CANCELLED",
        };
        write!(f, "{name}")
    }
}

/// Machine-readable error detail stored on executions and table results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    /// Stable error kind, e.g. `connection`, `missing_field`
    pub kind: String,

    /// Human-readable message
    pub message: String,
}

impl ErrorDetail {
    /// Captures kind and message from a domain error
    pub fn from_error(error: &TrellisError) -> Self {
        Self {
            kind: error.kind().to_string(),
            message: error.to_string(),
        }
    }
}

/// Per-table outcome counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableResult {
    /// Rows extracted from the source
    pub rows_read: u64,

    /// Rows successfully written to the target
    pub rows_written: u64,

    /// Rows lost to transformation or load errors
    pub rows_failed: u64,

    /// First error observed for this table, kept for diagnostics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_error: Option<ErrorDetail>,
}

impl TableResult {
    /// Records a row-level failure, keeping only the first error detail
    pub fn record_failure(&mut self, detail: ErrorDetail) {
        self.rows_failed += 1;
        if self.first_error.is_none() {
            self.first_error = Some(detail);
        }
    }
}

/// One timed run of a job definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobExecution {
    /// Unique per run
    pub execution_id: ExecutionId,

    /// Reference to the job definition; the execution does not own it
    pub job_id: JobId,

    /// When the execution record was created
    pub started_at: DateTime<Utc>,

    /// Set when the execution reaches a terminal state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,

    /// Current lifecycle state
    pub status: ExecutionStatus,

    /// Outcome counters keyed by table name
    #[serde(default)]
    pub per_table_results: BTreeMap<String, TableResult>,

    /// Fatal error detail, present only for FAILED executions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,

    /// Last progress message for operators
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
}

impl JobExecution {
    /// Creates a fresh PENDING execution for a job
    pub fn new(job_id: JobId) -> Self {
        Self {
            execution_id: ExecutionId::generate(),
            job_id,
            started_at: Utc::now(),
            finished_at: None,
            status: ExecutionStatus::Pending,
            per_table_results: BTreeMap::new(),
            error: None,
            last_message: None,
        }
    }

    /// Total rows read across all tables
    pub fn total_rows_read(&self) -> u64 {
        self.per_table_results.values().map(|r| r.rows_read).sum()
    }

    /// Total rows written across all tables
    pub fn total_rows_written(&self) -> u64 {
        self.per_table_results.values().map(|r| r.rows_written).sum()
    }

    /// Total rows failed across all tables
    pub fn total_rows_failed(&self) -> u64 {
        self.per_table_results.values().map(|r| r.rows_failed).sum()
    }

    /// Transitions into RUNNING
    pub fn mark_running(&mut self) {
        self.status = ExecutionStatus::Running;
    }

    /// Transitions into a terminal state and stamps the finish time
    pub fn mark_finished(&mut self, status: ExecutionStatus) {
        debug_assert!(status.is_terminal());
        self.status = status;
        self.finished_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!ExecutionStatus::Pending.is_terminal());
        assert!(!ExecutionStatus::Running.is_terminal());
        assert!(ExecutionStatus::Succeeded.is_terminal());
        assert!(ExecutionStatus::Failed.is_terminal());
        assert!(ExecutionStatus::PartiallySucceeded.is_terminal());
        assert!(ExecutionStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_value(ExecutionStatus::PartiallySucceeded).unwrap(),
            serde_json::json!("PARTIALLY_SUCCEEDED")
        );
        assert_eq!(ExecutionStatus::Cancelled.to_string(), "CANCELLED");
    }

    #[test]
    fn test_new_execution_is_pending() {
        let execution = JobExecution::new(JobId::generate());
        assert_eq!(execution.status, ExecutionStatus::Pending);
        assert!(execution.finished_at.is_none());
        assert!(execution.per_table_results.is_empty());
    }

    #[test]
    fn test_table_result_keeps_first_error() {
        let mut result = TableResult::default();
        result.record_failure(ErrorDetail {
            kind: "missing_field".to_string(),
            message: "first".to_string(),
        });
        result.record_failure(ErrorDetail {
            kind: "conversion".to_string(),
            message: "second".to_string(),
        });
        assert_eq!(result.rows_failed, 2);
        assert_eq!(result.first_error.as_ref().unwrap().message, "first");
    }

    #[test]
    fn test_aggregate_totals() {
        let mut execution = JobExecution::new(JobId::generate());
        execution.per_table_results.insert(
            "a".to_string(),
            TableResult {
                rows_read: 10,
                rows_written: 7,
                rows_failed: 3,
                first_error: None,
            },
        );
        execution.per_table_results.insert(
            "b".to_string(),
            TableResult {
                rows_read: 5,
                rows_written: 5,
                rows_failed: 0,
                first_error: None,
            },
        );
        assert_eq!(execution.total_rows_read(), 15);
        assert_eq!(execution.total_rows_written(), 12);
        assert_eq!(execution.total_rows_failed(), 3);
    }

    #[test]
    fn test_mark_finished_stamps_time() {
        let mut execution = JobExecution::new(JobId::generate());
        execution.mark_running();
        assert_eq!(execution.status, ExecutionStatus::Running);
        execution.mark_finished(ExecutionStatus::Succeeded);
        assert!(execution.finished_at.is_some());
    }
}
