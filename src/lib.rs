/// realty-scout library
///
/// Acquisition pipeline for residential project facts: ask the answering
/// service, normalize its answer into a fixed schema, append it to a CSV
/// table, and log what went wrong.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod input;
pub mod schema;
pub mod service;
pub mod store;

// Re-exports for convenience
pub use config::Config;
pub use error::{Result, ScoutError};
