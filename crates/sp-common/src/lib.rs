//! Sales pipeline common types, ids, and errors.
//!
//! This crate provides foundational types shared across the pipeline crates:
//! - Raw input rows and cleaned transaction records
//! - Category aggregate rows
//! - Output store names and column layouts
//! - Run identity and output format selection
//! - The unified error type

pub mod error;
pub mod id;
pub mod output;
pub mod record;
pub mod schema;

pub use error::{Error, Result};
pub use id::RunId;
pub use output::OutputFormat;
pub use record::{CategoryDay, CategoryMean, CategoryRevenue, RawRecord, Transaction};
pub use schema::{StoreName, REQUIRED_COLUMNS, SCHEMA_VERSION};
