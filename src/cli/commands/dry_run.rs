//! Dry-run command implementation
//!
//! This module implements the `dry-run` command: it runs a job definition
//! against the in-memory database adapter, seeded from a JSON data file,
//! and prints per-table results. Useful for exercising transformation
//! rules before pointing a job at real databases.

use crate::adapters::database::{MemoryConnectorFactory, MemoryDatabase};
use crate::api::{CreateJobRequest, MemoryJobStore, OrchestrationService};
use crate::config::RuntimeConfig;
use crate::domain::execution::ExecutionStatus;
use crate::domain::row::Row;
use clap::Args;
use std::collections::BTreeMap;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Arguments for the dry-run command
#[derive(Args, Debug)]
pub struct DryRunArgs {
    /// Path to a job definition JSON file
    #[arg(short, long)]
    pub job: String,

    /// Path to a JSON file mapping table names to arrays of source rows
    #[arg(short, long)]
    pub data: String,
}

impl DryRunArgs {
    /// Execute the dry-run command
    pub async fn execute(
        &self,
        config: &RuntimeConfig,
        mut shutdown: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(job_path = %self.job, data_path = %self.data, "Starting dry run");

        println!("🚀 Dry run: {}", self.job);
        println!();

        let request: CreateJobRequest = serde_json::from_str(&fs::read_to_string(&self.job)?)?;
        let tables: BTreeMap<String, Vec<Row>> =
            serde_json::from_str(&fs::read_to_string(&self.data)?)?;

        let mut source = MemoryDatabase::new();
        for (name, rows) in tables {
            source = source.with_table(name, rows);
        }
        let target = Arc::new(MemoryDatabase::new());
        let factory = Arc::new(MemoryConnectorFactory::new(
            Arc::new(source),
            Arc::clone(&target),
        ));

        let service = OrchestrationService::new(
            Arc::new(MemoryJobStore::new()),
            factory,
            config.execution.batch_size,
        );

        let job = match service.create_job(request).await {
            Ok(job) => job,
            Err(e) => {
                println!("❌ Job definition rejected");
                for error in e.field_errors() {
                    println!("  - {}: {}", error.path, error.message);
                }
                return Ok(2);
            }
        };
        let started = service.start_job(job.job_id).await?;

        // Poll for completion, forwarding a shutdown signal as cancellation.
        let execution = loop {
            let snapshot = service.get_execution(started.execution_id).await?;
            if snapshot.status.is_terminal() {
                break snapshot;
            }
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_millis(50)) => {}
                _ = shutdown.changed() => {
                    println!("⚠️  Interrupted, cancelling after in-flight batch...");
                    service.cancel_execution(started.execution_id).await?;
                }
            }
        };

        println!("Status: {}", execution.status);
        println!();
        println!("Per-table results:");
        for (table, result) in &execution.per_table_results {
            println!(
                "  {table}: {} read, {} written, {} failed",
                result.rows_read, result.rows_written, result.rows_failed
            );
            if let Some(error) = &result.first_error {
                println!("    first error [{}]: {}", error.kind, error.message);
            }
        }
        if let Some(error) = &execution.error {
            println!();
            println!("❌ Fatal error [{}]: {}", error.kind, error.message);
        }
        println!();

        let exit_code = match execution.status {
            ExecutionStatus::Succeeded => 0,
            ExecutionStatus::PartiallySucceeded => 1,
            ExecutionStatus::Cancelled => 130,
            _ => 4,
        };
        Ok(exit_code)
    }
}
