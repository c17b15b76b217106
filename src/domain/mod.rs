//! Domain models and types for Trellis.
//!
//! This module contains the core domain models, types, and business rules.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`JobId`], [`ExecutionId`])
//! - **Job definition model** ([`EtlJobConfig`], [`TransformationRule`])
//! - **Execution records** ([`JobExecution`], [`ExecutionStatus`])
//! - **Error types** ([`TrellisError`], [`RowTransformError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Trellis uses the newtype pattern for identifiers to prevent mixing
//! different ID types:
//!
//! ```rust
//! use trellis::domain::{JobId, ExecutionId};
//!
//! let job_id = JobId::generate();
//! let execution_id = ExecutionId::generate();
//!
//! // This won't compile - type safety prevents mixing IDs
//! // let wrong: JobId = execution_id;  // Compile error!
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T>`](Result) with [`TrellisError`]
//! as the error type; errors convert automatically with the `?` operator.

pub mod errors;
pub mod execution;
pub mod ids;
pub mod job;
pub mod result;
pub mod row;

// Re-export commonly used types for convenience
pub use errors::{FieldError, RowTransformError, TrellisError};
pub use execution::{ErrorDetail, ExecutionStatus, JobExecution, TableResult};
pub use ids::{ExecutionId, JobId};
pub use job::{
    DatabaseConnectionConfig, EtlJobConfig, JobTransformationConfig, TransformationRule,
    TransformationType,
};
pub use result::Result;
pub use row::{Row, RowBatch};
