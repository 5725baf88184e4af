//! Semantic validation of resolved settings.

use crate::settings::Settings;
use std::path::PathBuf;
use thiserror::Error;

/// A setting that parses but cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("input path is empty")]
    EmptyInput,

    #[error("database path is empty")]
    EmptyDatabase,

    #[error("input and database are the same file: {0}")]
    InputIsDatabase(PathBuf),

    #[error("log filter is empty")]
    EmptyLogFilter,
}

/// Check settings for values that would make a run meaningless.
pub fn validate(settings: &Settings) -> Result<(), ValidationError> {
    if settings.input.as_os_str().is_empty() {
        return Err(ValidationError::EmptyInput);
    }
    if settings.database.as_os_str().is_empty() {
        return Err(ValidationError::EmptyDatabase);
    }
    if settings.input == settings.database {
        return Err(ValidationError::InputIsDatabase(settings.input.clone()));
    }
    if settings.logging.filter.trim().is_empty() {
        return Err(ValidationError::EmptyLogFilter);
    }
    Ok(())
}
