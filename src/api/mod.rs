//! Orchestration API
//!
//! The service surface a transport layer would expose: create, list, and
//! delete job definitions; start, inspect, and cancel executions.

pub mod dto;
pub mod service;
pub mod store;

pub use dto::{CreateJobRequest, StartJobResponse};
pub use service::OrchestrationService;
pub use store::{JobStore, MemoryJobStore};
