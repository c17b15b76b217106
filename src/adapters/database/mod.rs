//! Database adapter boundary
//!
//! Concrete drivers are external collaborators; this crate consumes them
//! through the traits in [`traits`] and ships only the in-memory adapter.

pub mod memory;
pub mod traits;

pub use memory::{MemoryConnector, MemoryConnectorFactory, MemoryDatabase};
pub use traits::{
    ConnectorFactory, FailedRow, LoadResult, RowBatchStream, TableExtractor, TableLoader,
};
