//! CLI commands for reading persisted stores.
//!
//! Provides sales, outliers, and categories subcommands. The database is only
//! ever opened read-only.

use crate::exit_codes::ExitCode;
use crate::persist::sqlite::STORE_DATE_FORMAT;
use crate::persist::{SalesFilter, SqliteStore};
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use serde::Serialize;
use sp_common::SCHEMA_VERSION;
use std::path::Path;

/// Arguments for the query command
#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Database to read (overrides config and environment)
    #[arg(long, value_name = "PATH")]
    pub database: Option<std::path::PathBuf>,

    /// Config file to read the database location from
    #[arg(long, value_name = "PATH")]
    pub config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: QueryCommands,
}

/// Query subcommands
#[derive(Subcommand, Debug)]
pub enum QueryCommands {
    /// Normal (non-outlier) transactions
    Sales {
        /// Only rows for this product
        #[arg(long)]
        product: Option<String>,
        /// Only rows in this category
        #[arg(long)]
        category: Option<String>,
        /// First date to include (YYYY-MM-DD)
        #[arg(long, value_parser = parse_cli_date)]
        start_date: Option<NaiveDate>,
        /// Last date to include (YYYY-MM-DD)
        #[arg(long, value_parser = parse_cli_date)]
        end_date: Option<NaiveDate>,
    },
    /// Transactions flagged as quantity outliers
    Outliers,
    /// Per-category revenue, mean price and peak day
    Categories,
}

impl QueryCommands {
    fn name(&self) -> &'static str {
        match self {
            QueryCommands::Sales { .. } => "query sales",
            QueryCommands::Outliers => "query outliers",
            QueryCommands::Categories => "query categories",
        }
    }
}

/// Parse a `YYYY-MM-DD` date argument.
pub fn parse_cli_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, STORE_DATE_FORMAT)
        .map_err(|_| format!("invalid date '{s}' (expected YYYY-MM-DD)"))
}

/// Run the query command dispatcher
pub fn run_query(database: &Path, command: &QueryCommands) -> ExitCode {
    let store = match SqliteStore::open_read_only(database) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Failed to open {}: {}", database.display(), e);
            return ExitCode::StoreError;
        }
    };

    let result = match command {
        QueryCommands::Sales {
            product,
            category,
            start_date,
            end_date,
        } => {
            let filter = SalesFilter {
                product: product.clone(),
                category: category.clone(),
                start_date: *start_date,
                end_date: *end_date,
            };
            store.sales(&filter).map(|rows| envelope(command, &rows))
        }
        QueryCommands::Outliers => store.outliers().map(|rows| envelope(command, &rows)),
        QueryCommands::Categories => store.category_stats().map(|stats| {
            serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "command": command.name(),
                "category_revenue": stats.revenue,
                "category_mean": stats.mean,
                "category_day": stats.day,
            })
        }),
    };

    match result {
        Ok(output) => match serde_json::to_string_pretty(&output) {
            Ok(text) => {
                println!("{text}");
                ExitCode::Clean
            }
            Err(e) => {
                eprintln!("Failed to serialize: {e}");
                ExitCode::InternalError
            }
        },
        Err(e) => {
            eprintln!("Failed to read {}: {}", database.display(), e);
            ExitCode::StoreError
        }
    }
}

fn envelope<T: Serialize>(command: &QueryCommands, rows: &[T]) -> serde_json::Value {
    serde_json::json!({
        "schema_version": SCHEMA_VERSION,
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "command": command.name(),
        "rows": rows,
        "count": rows.len(),
    })
}
