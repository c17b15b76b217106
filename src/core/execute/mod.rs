//! Job execution

pub mod executor;

pub use executor::JobExecutor;
