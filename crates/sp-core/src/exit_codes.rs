//! Exit codes for the sales-pipeline CLI.
//!
//! Exit codes communicate the run outcome without requiring output parsing.
//! They are stable across releases. Usage errors exit with 2, raised by the
//! argument parser before any of these apply.

use sp_common::Error;

/// Exit codes for sales-pipeline operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Run completed and every store was refreshed
    Clean = 0,

    /// Configuration error
    ConfigError = 10,

    /// Input could not be loaded or cleaned
    InputError = 11,

    /// A store could not be written or read
    StoreError = 12,

    /// I/O error
    IoError = 13,

    /// Internal/unknown error
    InternalError = 99,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Map a pipeline error to its exit code.
    pub fn for_error(err: &Error) -> Self {
        match err.code() {
            10..=19 => ExitCode::ConfigError,
            20..=29 => ExitCode::InputError,
            30..=39 => ExitCode::StoreError,
            60..=69 => ExitCode::IoError,
            _ => ExitCode::InternalError,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}
