//! Database abstraction traits
//!
//! This module defines the extractor/loader boundary the executor consumes.
//! Concrete driver-backed implementations live outside this crate; the
//! in-memory implementation in [`super::memory`] backs tests and dry runs.

use crate::domain::job::DatabaseConnectionConfig;
use crate::domain::result::Result;
use crate::domain::row::{Row, RowBatch};
use async_trait::async_trait;

/// A row that the target rejected
///
/// Carries enough context for the executor to record the failure without
/// aborting the batch.
#[derive(Debug, Clone)]
pub struct FailedRow {
    /// The row as it was submitted for loading
    pub row: Row,

    /// Why the target rejected it, e.g. a constraint violation
    pub error: String,
}

/// Result of loading one batch into a target table
#[derive(Debug, Clone, Default)]
pub struct LoadResult {
    /// Number of rows successfully written
    pub written: u64,

    /// Rows the target rejected, with per-row error context
    pub failed_rows: Vec<FailedRow>,
}

/// A finite sequence of row batches from one table
///
/// Streams are not restartable mid-batch; the executor consumes each batch
/// exactly once, in order.
#[async_trait]
pub trait RowBatchStream: Send {
    /// Yields the next batch, or `None` when the table is exhausted
    ///
    /// # Errors
    ///
    /// Returns an error when extraction breaks mid-table; the executor
    /// treats this as fatal to the execution.
    async fn next_batch(&mut self) -> Result<Option<RowBatch>>;
}

/// Reads rows from a source connection in bounded batches
#[async_trait]
pub trait TableExtractor: Send + Sync {
    /// Starts extracting a table, yielding batches of at most `batch_size` rows
    ///
    /// Batching bounds memory use regardless of table size.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be read, e.g. it no longer
    /// exists because the definition went stale.
    async fn extract(&self, table: &str, batch_size: usize) -> Result<Box<dyn RowBatchStream>>;
}

/// Writes transformed rows to a target connection
#[async_trait]
pub trait TableLoader: Send + Sync {
    /// Loads one batch, reporting per-row failures instead of aborting
    ///
    /// # Errors
    ///
    /// Returns an error only for batch-level infrastructure failure; rows
    /// the target rejects individually come back in
    /// [`LoadResult::failed_rows`].
    async fn load(&self, table: &str, batch: RowBatch) -> Result<LoadResult>;
}

/// Opens source and target connections for a job execution
///
/// Each execution holds its own connection pair; connections are never
/// shared across concurrent executions.
#[async_trait]
pub trait ConnectorFactory: Send + Sync {
    /// Opens the source side
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::Connection`](crate::domain::TrellisError::Connection)
    /// if the source cannot be reached; this fails the whole execution.
    async fn source(&self, config: &DatabaseConnectionConfig) -> Result<Box<dyn TableExtractor>>;

    /// Opens the target side
    ///
    /// # Errors
    ///
    /// Same contract as [`Self::source`].
    async fn target(&self, config: &DatabaseConnectionConfig) -> Result<Box<dyn TableLoader>>;
}
