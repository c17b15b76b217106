//! Job executor
//!
//! Drives one job run: iterates tables in definition order, applies the
//! rule engine between extraction and loading, and reports progress into
//! the execution state tracker batch by batch.
//!
//! Failure semantics: FAILED is reserved for infrastructure-level problems
//! (unreachable connection, stale definition). Per-row transform and load
//! errors are recorded in per-table results and the run completes as
//! SUCCEEDED or PARTIALLY_SUCCEEDED.

use crate::adapters::database::{ConnectorFactory, TableExtractor, TableLoader};
use crate::core::state::ExecutionTracker;
use crate::core::transform::TableRules;
use crate::core::validate;
use crate::domain::execution::{ErrorDetail, ExecutionStatus, TableResult};
use crate::domain::ids::ExecutionId;
use crate::domain::job::EtlJobConfig;
use crate::domain::result::Result;
use crate::domain::row::RowBatch;
use crate::domain::TrellisError;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Whether to keep going after a table, or stop on a cancellation request
enum Control {
    Continue,
    Cancelled,
}

/// Executes one job run at a time
///
/// One executor instance drives one execution; concurrent executions each
/// get their own instance and their own connection pair.
pub struct JobExecutor {
    tracker: Arc<ExecutionTracker>,
    factory: Arc<dyn ConnectorFactory>,
    batch_size: usize,
}

impl JobExecutor {
    /// Creates an executor reporting into the given tracker
    pub fn new(
        tracker: Arc<ExecutionTracker>,
        factory: Arc<dyn ConnectorFactory>,
        batch_size: usize,
    ) -> Self {
        Self {
            tracker,
            factory,
            batch_size,
        }
    }

    /// Runs a job execution to a terminal state
    ///
    /// The returned status is also recorded on the execution; callers that
    /// only poll the tracker can ignore the return value.
    ///
    /// # Errors
    ///
    /// Returns an error only if the execution record itself cannot be
    /// updated. Fatal job errors (connection, stale definition) are
    /// reported through the FAILED status, not as an `Err`.
    pub async fn run(
        &self,
        job: &EtlJobConfig,
        execution_id: ExecutionId,
        cancel: watch::Receiver<bool>,
    ) -> Result<ExecutionStatus> {
        tracing::info!(
            execution_id = %execution_id,
            job_id = %job.job_id,
            job_name = %job.job_name,
            table_count = job.tables_to_process.len(),
            "Starting job execution"
        );

        self.tracker
            .update(execution_id, |e| {
                e.mark_running();
                e.last_message = Some("Execution started".to_string());
            })
            .await?;

        // Definitions can go stale between creation and start; re-check.
        let validation = validate::validate(job);
        if !validation.is_valid() {
            let error = TrellisError::Definition(validation.into_errors());
            return self.fail(execution_id, error).await;
        }

        // Compile every table's plan up front so a broken rule set fails
        // the run before any data moves.
        let mut plans = Vec::with_capacity(job.tables_to_process.len());
        for table in &job.tables_to_process {
            match TableRules::for_table(job, table) {
                Ok(rules) => plans.push((table.clone(), rules)),
                Err(error) => return self.fail(execution_id, error).await,
            }
        }

        let extractor = match self.factory.source(&job.source_db_config).await {
            Ok(extractor) => extractor,
            Err(error) => return self.fail(execution_id, error).await,
        };
        let loader = match self.factory.target(&job.target_db_config).await {
            Ok(loader) => loader,
            Err(error) => return self.fail(execution_id, error).await,
        };

        let mut cancelled = false;
        for (table, rules) in &plans {
            if *cancel.borrow() {
                cancelled = true;
                break;
            }

            match self
                .process_table(execution_id, table, rules, &*extractor, &*loader, &cancel)
                .await
            {
                Ok(Control::Continue) => {}
                Ok(Control::Cancelled) => {
                    cancelled = true;
                    break;
                }
                Err(error) => return self.fail(execution_id, error).await,
            }
        }

        let snapshot = self.tracker.get(execution_id).await?;
        let status = if cancelled {
            ExecutionStatus::Cancelled
        } else if snapshot.total_rows_failed() > 0 {
            ExecutionStatus::PartiallySucceeded
        } else {
            ExecutionStatus::Succeeded
        };

        self.tracker
            .update(execution_id, |e| {
                e.mark_finished(status);
                e.last_message = Some(format!(
                    "{} rows read, {} written, {} failed",
                    e.total_rows_read(),
                    e.total_rows_written(),
                    e.total_rows_failed()
                ));
            })
            .await?;

        tracing::info!(
            execution_id = %execution_id,
            status = %status,
            rows_read = snapshot.total_rows_read(),
            rows_written = snapshot.total_rows_written(),
            rows_failed = snapshot.total_rows_failed(),
            "Job execution finished"
        );
        Ok(status)
    }

    /// Runs one table's extract -> transform -> load loop
    ///
    /// Extraction of batch N+1 is pipelined with transformation and loading
    /// of batch N through a bounded channel. A cancellation request is
    /// honored after the in-flight batch completes; a partially-loaded
    /// batch is never abandoned.
    async fn process_table(
        &self,
        execution_id: ExecutionId,
        table: &str,
        rules: &TableRules,
        extractor: &dyn TableExtractor,
        loader: &dyn TableLoader,
        cancel: &watch::Receiver<bool>,
    ) -> Result<Control> {
        tracing::info!(execution_id = %execution_id, table = %table, "Processing table");
        self.tracker
            .update(execution_id, |e| {
                e.per_table_results
                    .insert(table.to_string(), TableResult::default());
                e.last_message = Some(format!("Processing table {table}"));
            })
            .await?;

        let mut stream = extractor.extract(table, self.batch_size).await?;

        // Bounded to one in-flight batch: extraction runs ahead of loading
        // by at most one batch.
        let (batch_tx, mut batch_rx) = mpsc::channel::<Result<RowBatch>>(1);
        tokio::spawn(async move {
            loop {
                match stream.next_batch().await {
                    Ok(Some(batch)) => {
                        if batch_tx.send(Ok(batch)).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(error) => {
                        let _ = batch_tx.send(Err(error)).await;
                        break;
                    }
                }
            }
        });

        while let Some(next) = batch_rx.recv().await {
            let batch = next?;
            self.process_batch(execution_id, table, rules, loader, batch)
                .await?;

            if *cancel.borrow() {
                tracing::info!(
                    execution_id = %execution_id,
                    table = %table,
                    "Cancellation requested; stopping after in-flight batch"
                );
                return Ok(Control::Cancelled);
            }
        }

        Ok(Control::Continue)
    }

    /// Transforms and loads one batch, recording per-row outcomes
    ///
    /// Rows that fail transformation never block their batch peers: the
    /// rows that did transform are always submitted for loading.
    async fn process_batch(
        &self,
        execution_id: ExecutionId,
        table: &str,
        rules: &TableRules,
        loader: &dyn TableLoader,
        batch: RowBatch,
    ) -> Result<()> {
        let rows_read = batch.len() as u64;
        let mut transform_failures = Vec::new();
        let mut transformed = Vec::with_capacity(batch.len());

        for row in &batch {
            let outcome = rules.transform(row);
            if outcome.is_failed() {
                // Keep the first rule failure as the row's diagnostic.
                let failure = &outcome.errors[0];
                tracing::debug!(
                    table = %table,
                    target_field = %failure.target_field,
                    error = %failure.error,
                    "Row failed transformation"
                );
                transform_failures.push(ErrorDetail {
                    kind: failure.error.kind().to_string(),
                    message: failure.error.to_string(),
                });
            } else {
                transformed.push(outcome.target_row);
            }
        }

        let load_result = if transformed.is_empty() {
            Default::default()
        } else {
            loader.load(table, transformed).await?
        };

        for failed in &load_result.failed_rows {
            tracing::debug!(table = %table, error = %failed.error, "Row rejected by target");
        }

        self.tracker
            .update(execution_id, |e| {
                let result = e.per_table_results.entry(table.to_string()).or_default();
                result.rows_read += rows_read;
                result.rows_written += load_result.written;
                for detail in transform_failures {
                    result.record_failure(detail);
                }
                for failed in load_result.failed_rows {
                    result.record_failure(ErrorDetail {
                        kind: "load".to_string(),
                        message: failed.error,
                    });
                }
            })
            .await
    }

    /// Records a fatal error and finishes the execution as FAILED
    async fn fail(
        &self,
        execution_id: ExecutionId,
        error: TrellisError,
    ) -> Result<ExecutionStatus> {
        tracing::error!(
            execution_id = %execution_id,
            kind = error.kind(),
            error = %error,
            "Job execution failed"
        );
        self.tracker
            .update(execution_id, |e| {
                e.error = Some(ErrorDetail::from_error(&error));
                e.last_message = Some(error.to_string());
                e.mark_finished(ExecutionStatus::Failed);
            })
            .await?;
        Ok(ExecutionStatus::Failed)
    }
}
