/// Storage module for realty-scout
///
/// Handles the results table and the error log, both plain delimited files.

pub mod codec;
pub mod error_log;
pub mod models;
pub mod table;

pub use error_log::ErrorLog;
pub use models::*;
pub use table::ResultTable;
