//! Orchestration service
//!
//! Single entry point tying the store, validator, executor, and tracker
//! together. An HTTP layer would sit directly on top of these methods;
//! errors carry stable kinds for status-code mapping.

use crate::adapters::database::ConnectorFactory;
use crate::api::dto::{CreateJobRequest, StartJobResponse};
use crate::api::store::JobStore;
use crate::core::execute::JobExecutor;
use crate::core::state::ExecutionTracker;
use crate::core::validate;
use crate::domain::execution::JobExecution;
use crate::domain::ids::{ExecutionId, JobId};
use crate::domain::job::EtlJobConfig;
use crate::domain::result::Result;
use crate::domain::TrellisError;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

/// Coordinates job definitions and their executions
///
/// Job starts are asynchronous: `start_job` returns as soon as the
/// execution record exists, and the run proceeds on a background task.
pub struct OrchestrationService {
    store: Arc<dyn JobStore>,
    tracker: Arc<ExecutionTracker>,
    factory: Arc<dyn ConnectorFactory>,
    batch_size: usize,
    /// Cancellation handles for in-flight executions, removed at completion
    cancellations: Arc<Mutex<HashMap<ExecutionId, watch::Sender<bool>>>>,
}

impl OrchestrationService {
    /// Creates a service over the given store and connector factory
    pub fn new(
        store: Arc<dyn JobStore>,
        factory: Arc<dyn ConnectorFactory>,
        batch_size: usize,
    ) -> Self {
        Self {
            store,
            tracker: Arc::new(ExecutionTracker::new()),
            factory,
            batch_size,
            cancellations: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The execution tracker backing this service
    pub fn tracker(&self) -> &Arc<ExecutionTracker> {
        &self.tracker
    }

    /// Validates and stores a new job definition
    ///
    /// # Errors
    ///
    /// Returns a definition error if validation fails, or a conflict error
    /// if the job name is already taken.
    pub async fn create_job(&self, request: CreateJobRequest) -> Result<EtlJobConfig> {
        let job = request.into_job();

        let validation = validate::validate(&job);
        if !validation.is_valid() {
            tracing::warn!(
                job_name = %job.job_name,
                error_count = validation.errors().len(),
                "Rejected invalid job definition"
            );
            return Err(TrellisError::Definition(validation.into_errors()));
        }

        if self.store.find_by_name(&job.job_name).await.is_some() {
            return Err(TrellisError::Conflict(format!(
                "Job name '{}' is already in use",
                job.job_name
            )));
        }

        self.store.insert(job.clone()).await?;
        tracing::info!(job_id = %job.job_id, job_name = %job.job_name, "Created job");
        Ok(job)
    }

    /// Lists all stored job definitions
    pub async fn list_jobs(&self) -> Vec<EtlJobConfig> {
        self.store.list().await
    }

    /// Fetches one job definition
    ///
    /// # Errors
    ///
    /// Returns a not-found error for unknown ids.
    pub async fn get_job(&self, job_id: JobId) -> Result<EtlJobConfig> {
        self.store.get(job_id).await
    }

    /// Deletes a job definition
    ///
    /// Past execution records survive deletion; only new starts are
    /// prevented.
    ///
    /// # Errors
    ///
    /// Returns a conflict error while the job has a PENDING or RUNNING
    /// execution.
    pub async fn delete_job(&self, job_id: JobId) -> Result<()> {
        // Existence check first so unknown ids report not-found, not conflict.
        self.store.get(job_id).await?;

        if self.tracker.has_active_execution(job_id).await {
            return Err(TrellisError::Conflict(format!(
                "Job '{job_id}' has an active execution"
            )));
        }

        self.store.remove(job_id).await?;
        tracing::info!(job_id = %job_id, "Deleted job");
        Ok(())
    }

    /// Starts an asynchronous execution of a job
    ///
    /// Returns as soon as the PENDING execution record exists; the run
    /// proceeds on a background task. Poll [`Self::get_execution`] for
    /// progress.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for unknown job ids.
    pub async fn start_job(&self, job_id: JobId) -> Result<StartJobResponse> {
        let job = self.store.get(job_id).await?;
        let execution_id = self.tracker.create(job_id).await;

        let (cancel_tx, cancel_rx) = watch::channel(false);
        self.cancellations
            .lock()
            .await
            .insert(execution_id, cancel_tx);

        let executor = JobExecutor::new(
            Arc::clone(&self.tracker),
            Arc::clone(&self.factory),
            self.batch_size,
        );
        let cancellations = Arc::clone(&self.cancellations);
        tokio::spawn(async move {
            if let Err(error) = executor.run(&job, execution_id, cancel_rx).await {
                tracing::error!(
                    execution_id = %execution_id,
                    error = %error,
                    "Execution task could not record its outcome"
                );
            }
            cancellations.lock().await.remove(&execution_id);
        });

        tracing::info!(job_id = %job_id, execution_id = %execution_id, "Accepted job start");
        Ok(StartJobResponse {
            execution_id,
            job_id,
        })
    }

    /// Fetches a snapshot of one execution
    ///
    /// # Errors
    ///
    /// Returns a not-found error for unknown execution ids.
    pub async fn get_execution(&self, execution_id: ExecutionId) -> Result<JobExecution> {
        self.tracker.get(execution_id).await
    }

    /// Lists all executions of a job, oldest first
    ///
    /// # Errors
    ///
    /// Returns a not-found error for unknown job ids.
    pub async fn list_executions(&self, job_id: JobId) -> Result<Vec<JobExecution>> {
        self.store.get(job_id).await?;
        Ok(self.tracker.list_by_job(job_id).await)
    }

    /// Requests cancellation of a running execution
    ///
    /// Cancellation is cooperative: the executor finishes its in-flight
    /// batch before stopping. Cancelling an already-terminal execution is
    /// a no-op.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for unknown execution ids.
    pub async fn cancel_execution(&self, execution_id: ExecutionId) -> Result<()> {
        // Resolves not-found before consulting the cancellation map.
        let execution = self.tracker.get(execution_id).await?;
        if execution.status.is_terminal() {
            return Ok(());
        }

        if let Some(cancel) = self.cancellations.lock().await.get(&execution_id) {
            // Receiver dropped means the run just finished; nothing to do.
            let _ = cancel.send(true);
            tracing::info!(execution_id = %execution_id, "Requested cancellation");
        }
        Ok(())
    }
}
