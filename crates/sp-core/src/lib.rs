//! Sales pipeline core library.
//!
//! Batch pipeline over per-transaction sales records:
//! - [`load`]: delimited input file to raw records
//! - [`clean`]: validation, imputation, and derived fields
//! - [`aggregate`]: per-category mean price, revenue, and peak day
//! - [`outlier`]: per-category two-sigma quantity partition
//! - [`persist`]: store replacement and the read-only query side
//! - [`pipeline`]: one full run tying the stages together

pub mod aggregate;
pub mod clean;
pub mod exit_codes;
pub mod load;
pub mod logging;
pub mod outlier;
pub mod persist;
pub mod pipeline;
pub mod query_cli;

pub use clean::{clean, CleanReport, Cleaned};
pub use exit_codes::ExitCode;
pub use load::{CsvLoader, LoadedInput};
pub use outlier::{partition, Partition};
pub use persist::{
    persist_all, ArtifactStore, Artifacts, CategoryStats, SalesFilter, SqliteStore, StoreError,
    StoreWrite,
};
pub use pipeline::{run, run_with_store, RunSummary};
