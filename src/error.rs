/// Error types for realty-scout
///
/// This module defines all possible errors that can occur in the application.
/// Uses thiserror for ergonomic error handling.

use thiserror::Error;

/// Main error type for realty-scout operations
#[derive(Error, Debug)]
pub enum ScoutError {
    /// Network or HTTP failure reaching the answering service
    #[error("Transport error: {0}")]
    Transport(String),

    /// Service replied but the text is not a structured object, even after repair
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Service replied without an answer text
    #[error("Response has no answer: {0}")]
    MissingAnswer(String),

    /// I/O errors (table, error log, name files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Imported file lacks a required column
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Result type alias for realty-scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

impl From<reqwest::Error> for ScoutError {
    fn from(err: reqwest::Error) -> Self {
        ScoutError::Transport(err.to_string())
    }
}

impl ScoutError {
    /// Convert to a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            ScoutError::Transport(e) => {
                format!("Could not reach the answering service. Details: {}", e)
            }
            ScoutError::MalformedResponse(e) => {
                format!("The service answer could not be read as JSON. Details: {}", e)
            }
            ScoutError::MissingAnswer(e) => {
                format!("The service returned no answer. Details: {}", e)
            }
            ScoutError::Io(e) => {
                format!("File system error. Check permissions and disk space. Details: {}", e)
            }
            ScoutError::Serialization(e) => format!("Data format error: {}", e),
            ScoutError::Config(msg) => format!("Configuration issue: {}", msg),
            ScoutError::MissingColumn(col) => {
                format!("Input file must contain a '{}' column", col)
            }
            ScoutError::Generic(msg) => msg.clone(),
        }
    }
}
