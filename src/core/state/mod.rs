//! Execution state management
//!
//! The tracker owns execution records and serves status queries while an
//! executor drives the run.

pub mod tracker;

pub use tracker::ExecutionTracker;
