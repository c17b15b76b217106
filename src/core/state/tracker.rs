//! Execution state tracker
//!
//! Owns the `JobExecution` records and exposes lifecycle operations and
//! status queries. Each execution's record is mutated only by the single
//! executor driving that run; readers get cloned snapshots, so a status
//! query may observe a slightly stale but never corrupt view.

use crate::domain::execution::{ExecutionStatus, JobExecution};
use crate::domain::ids::{ExecutionId, JobId};
use crate::domain::result::Result;
use crate::domain::TrellisError;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Tracks every execution known to this process
#[derive(Default)]
pub struct ExecutionTracker {
    executions: RwLock<HashMap<ExecutionId, JobExecution>>,
}

impl ExecutionTracker {
    /// Creates an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new PENDING execution for a job and returns its id
    pub async fn create(&self, job_id: JobId) -> ExecutionId {
        let execution = JobExecution::new(job_id);
        let execution_id = execution.execution_id;
        self.executions
            .write()
            .await
            .insert(execution_id, execution);
        tracing::debug!(
            execution_id = %execution_id,
            job_id = %job_id,
            "Created execution"
        );
        execution_id
    }

    /// Applies a mutation to one execution record
    ///
    /// Only the executor driving the run may call this; there is exactly one
    /// writer per execution.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the execution does not exist.
    pub async fn update<F>(&self, execution_id: ExecutionId, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut JobExecution),
    {
        let mut executions = self.executions.write().await;
        let execution = executions.get_mut(&execution_id).ok_or_else(|| {
            TrellisError::NotFound(format!("execution {execution_id} does not exist"))
        })?;
        mutate(execution);
        Ok(())
    }

    /// Returns a snapshot of one execution
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the execution does not exist.
    pub async fn get(&self, execution_id: ExecutionId) -> Result<JobExecution> {
        self.executions
            .read()
            .await
            .get(&execution_id)
            .cloned()
            .ok_or_else(|| {
                TrellisError::NotFound(format!("execution {execution_id} does not exist"))
            })
    }

    /// Returns snapshots of every execution for a job, oldest first
    pub async fn list_by_job(&self, job_id: JobId) -> Vec<JobExecution> {
        let mut executions: Vec<JobExecution> = self
            .executions
            .read()
            .await
            .values()
            .filter(|e| e.job_id == job_id)
            .cloned()
            .collect();
        executions.sort_by_key(|e| e.started_at);
        executions
    }

    /// Whether any execution of the given job is currently active
    ///
    /// Used to guard job deletion.
    pub async fn has_active_execution(&self, job_id: JobId) -> bool {
        self.executions
            .read()
            .await
            .values()
            .any(|e| e.job_id == job_id && !e.status.is_terminal())
    }
}
