//! Error types for the sales pipeline.

use crate::schema::StoreName;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the sales pipeline.
///
/// Only fatal conditions are represented here. Row-local data quality issues
/// (an unparseable price or quantity, a missing value) are absorbed by the cleaning
/// policy and never surface as errors.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    // Input errors (20-29)
    #[error("input is missing required column '{column}'")]
    MissingColumn { column: String },

    #[error("malformed input at line {line}: {reason}")]
    MalformedInput { line: u64, reason: String },

    #[error("invalid date '{value}' at line {line}")]
    InvalidDate { line: u64, value: String },

    // Store errors (30-39)
    #[error("failed to write store '{store}': {reason}")]
    Store { store: StoreName, reason: String },

    #[error("cannot open database '{}': {reason}", .path.display())]
    StoreOpen { path: PathBuf, reason: String },

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns the error code for this error type.
    /// Used for detailed error reporting in JSON output.
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::MissingColumn { .. } => 20,
            Error::MalformedInput { .. } => 21,
            Error::InvalidDate { .. } => 22,
            Error::Store { .. } => 30,
            Error::StoreOpen { .. } => 31,
            Error::Io(_) => 60,
        }
    }

    /// The store a write failure refers to, if any.
    pub fn store(&self) -> Option<StoreName> {
        match self {
            Error::Store { store, .. } => Some(*store),
            _ => None,
        }
    }
}
