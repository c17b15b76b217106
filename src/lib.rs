// Trellis - ETL Job Orchestration Tool
// Copyright (c) 2026 Trellis Contributors
// Licensed under the MIT License

//! # Trellis - ETL Job Orchestration
//!
//! Trellis is an ETL orchestration core built in Rust. It stores declarative
//! job definitions (source and target connections, table lists, per-field
//! transformation rules) and executes them as tracked, cancellable runs.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Defining** jobs as declarative configurations with per-table rules
//! - **Validating** definitions field by field before they are accepted
//! - **Transforming** rows with a closed set of rule types (MAP, CONCAT,
//!   CONVERT_TYPE, ...)
//! - **Executing** jobs batch by batch with per-table result tracking
//!
//! ## Architecture
//!
//! Trellis follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`api`] - Orchestration service (create/start/cancel jobs)
//! - [`core`] - Business logic (transform, validate, execute, state)
//! - [`adapters`] - Database extractor/loader boundary
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use trellis::adapters::database::{MemoryConnectorFactory, MemoryDatabase};
//! use trellis::api::{MemoryJobStore, OrchestrationService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = Arc::new(MemoryDatabase::new());
//!     let target = Arc::new(MemoryDatabase::new());
//!     let factory = Arc::new(MemoryConnectorFactory::new(source, target));
//!
//!     let service = OrchestrationService::new(Arc::new(MemoryJobStore::new()), factory, 500);
//!     for job in service.list_jobs().await {
//!         println!("{}: {}", job.job_id, job.job_name);
//!     }
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
