//! In-memory database adapter
//!
//! Backs integration tests and the CLI dry-run path. Failure injection
//! (refused connections, per-row load rejection) lets tests exercise the
//! executor's partial-failure semantics without a real database.

use crate::domain::job::DatabaseConnectionConfig;
use crate::domain::result::Result;
use crate::domain::row::{Row, RowBatch};
use crate::domain::TrellisError;
use async_trait::async_trait;
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

use super::traits::{
    ConnectorFactory, FailedRow, LoadResult, RowBatchStream, TableExtractor, TableLoader,
};

/// Predicate deciding whether the target rejects a row; returns the error
/// message when it does
pub type LoadRejector = dyn Fn(&Row) -> Option<String> + Send + Sync;

/// An in-memory table store acting as either side of a connection
#[derive(Default)]
pub struct MemoryDatabase {
    tables: Mutex<BTreeMap<String, Vec<Row>>>,
    connect_error: Option<String>,
    load_rejector: Option<Box<LoadRejector>>,
}

impl MemoryDatabase {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a table with rows
    pub fn with_table(self, name: impl Into<String>, rows: Vec<Row>) -> Self {
        self.tables
            .lock()
            .expect("memory table lock")
            .insert(name.into(), rows);
        self
    }

    /// Makes every connection attempt fail with the given message
    pub fn with_connect_failure(mut self, message: impl Into<String>) -> Self {
        self.connect_error = Some(message.into());
        self
    }

    /// Installs a per-row load rejection predicate
    pub fn with_load_rejection(
        mut self,
        rejector: impl Fn(&Row) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.load_rejector = Some(Box::new(rejector));
        self
    }

    /// Snapshot of a table's rows, for assertions
    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.tables
            .lock()
            .expect("memory table lock")
            .get(table)
            .cloned()
            .unwrap_or_default()
    }
}

struct MemoryBatchStream {
    batches: VecDeque<RowBatch>,
}

#[async_trait]
impl RowBatchStream for MemoryBatchStream {
    async fn next_batch(&mut self) -> Result<Option<RowBatch>> {
        Ok(self.batches.pop_front())
    }
}

/// One opened side of an in-memory connection
pub struct MemoryConnector {
    database: Arc<MemoryDatabase>,
}

#[async_trait]
impl TableExtractor for MemoryConnector {
    async fn extract(&self, table: &str, batch_size: usize) -> Result<Box<dyn RowBatchStream>> {
        let tables = self
            .database
            .tables
            .lock()
            .map_err(|_| TrellisError::State("memory table lock poisoned".to_string()))?;
        let rows = tables.get(table).ok_or_else(|| {
            // Stale definition: the configured table no longer exists.
            TrellisError::Connection(format!("source table '{table}' does not exist"))
        })?;

        let batches = rows
            .chunks(batch_size.max(1))
            .map(|chunk| chunk.to_vec())
            .collect();
        Ok(Box::new(MemoryBatchStream { batches }))
    }
}

#[async_trait]
impl TableLoader for MemoryConnector {
    async fn load(&self, table: &str, batch: RowBatch) -> Result<LoadResult> {
        let mut result = LoadResult::default();
        let mut accepted = Vec::new();

        for row in batch {
            let rejection = self
                .database
                .load_rejector
                .as_ref()
                .and_then(|rejector| rejector(&row));
            match rejection {
                Some(error) => result.failed_rows.push(FailedRow { row, error }),
                None => accepted.push(row),
            }
        }

        result.written = accepted.len() as u64;
        let mut tables = self
            .database
            .tables
            .lock()
            .map_err(|_| TrellisError::State("memory table lock poisoned".to_string()))?;
        tables.entry(table.to_string()).or_default().extend(accepted);
        Ok(result)
    }
}

/// Connector factory over a pair of in-memory stores
pub struct MemoryConnectorFactory {
    source: Arc<MemoryDatabase>,
    target: Arc<MemoryDatabase>,
}

impl MemoryConnectorFactory {
    /// Creates a factory over the given source and target stores
    pub fn new(source: Arc<MemoryDatabase>, target: Arc<MemoryDatabase>) -> Self {
        Self { source, target }
    }

    fn open(database: &Arc<MemoryDatabase>) -> Result<MemoryConnector> {
        if let Some(message) = &database.connect_error {
            return Err(TrellisError::Connection(message.clone()));
        }
        Ok(MemoryConnector {
            database: database.clone(),
        })
    }
}

#[async_trait]
impl ConnectorFactory for MemoryConnectorFactory {
    async fn source(&self, _config: &DatabaseConnectionConfig) -> Result<Box<dyn TableExtractor>> {
        Ok(Box::new(Self::open(&self.source)?))
    }

    async fn target(&self, _config: &DatabaseConnectionConfig) -> Result<Box<dyn TableLoader>> {
        Ok(Box::new(Self::open(&self.target)?))
    }
}
