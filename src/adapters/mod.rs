//! External integrations
//!
//! Adapters wrap everything outside the core: database connectors today,
//! driver-backed implementations in downstream crates.

pub mod database;
