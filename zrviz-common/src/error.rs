//! Common error types for zrviz

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for zrviz operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across zrviz crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Malformed line in an upstream pipeline file
    #[error("Parse error in {file} line {line}: {reason}")]
    Parse {
        file: String,
        line: usize,
        reason: String,
    },

    /// Audio decoding, resampling or encoding failure
    #[error("Audio error: {0}")]
    Audio(String),

    /// Output path does not carry the `.wav` container extension
    #[error("Wrong file extension: {} (expected .wav)", .0.display())]
    WrongFileExtension(PathBuf),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Shorthand for a `Parse` error
    pub fn parse(file: impl Into<String>, line: usize, reason: impl Into<String>) -> Self {
        Error::Parse {
            file: file.into(),
            line,
            reason: reason.into(),
        }
    }
}
