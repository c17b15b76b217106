//! Core job processing
//!
//! The pipeline stages in dependency order: `transform` compiles and
//! applies rules, `validate` checks definitions, `execute` drives runs,
//! and `state` tracks their progress.

pub mod execute;
pub mod state;
pub mod transform;
pub mod validate;
