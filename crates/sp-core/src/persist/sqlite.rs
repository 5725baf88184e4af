//! SQLite-backed artifact store.
//!
//! One table per store. A replace is `DROP TABLE IF EXISTS`, `CREATE TABLE`,
//! inserts, then commit, all inside a single transaction for that table.
//! Dates are `YYYY-MM-DD` text and `high_volume` is an integer 0/1.

use super::{ArtifactStore, StoreError};
use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, OpenFlags, Row};
use serde::Serialize;
use sp_common::record::parse_weekday_name;
use sp_common::{CategoryDay, CategoryMean, CategoryRevenue, StoreName, Transaction};
use std::path::Path;
use tracing::debug;

/// Text form of dates in every store.
pub const STORE_DATE_FORMAT: &str = "%Y-%m-%d";

const TRANSACTION_TABLE_SQL: &str = "(
    date TEXT NOT NULL,
    category TEXT NOT NULL,
    product TEXT NOT NULL,
    quantity REAL NOT NULL,
    price REAL NOT NULL,
    total_sales REAL NOT NULL,
    day_of_week TEXT NOT NULL,
    high_volume INTEGER NOT NULL
)";

const SALES_INDEXES: [&str; 2] = [
    "CREATE INDEX idx_sales_date ON sales(date)",
    "CREATE INDEX idx_sales_category_product ON sales(category, product)",
];

/// Read-side filter over `sales`.
///
/// Set fields combine with AND. Date bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SalesFilter {
    pub product: Option<String>,
    pub category: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl SalesFilter {
    fn where_clause(&self) -> (String, Vec<String>) {
        let mut clauses = Vec::new();
        let mut values = Vec::new();
        if let Some(product) = &self.product {
            clauses.push("product = ?");
            values.push(product.clone());
        }
        if let Some(category) = &self.category {
            clauses.push("category = ?");
            values.push(category.clone());
        }
        if let Some(start) = self.start_date {
            clauses.push("date >= ?");
            values.push(start.format(STORE_DATE_FORMAT).to_string());
        }
        if let Some(end) = self.end_date {
            clauses.push("date <= ?");
            values.push(end.format(STORE_DATE_FORMAT).to_string());
        }
        if clauses.is_empty() {
            (String::new(), values)
        } else {
            (format!(" WHERE {}", clauses.join(" AND ")), values)
        }
    }
}

/// The three category views, each in key order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryStats {
    pub revenue: Vec<CategoryRevenue>,
    pub mean: Vec<CategoryMean>,
    pub day: Vec<CategoryDay>,
}

/// Artifact store in a single SQLite database file.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open for writing, creating the file if needed.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags)?;
        debug!(path = %path.display(), "opened store database");
        Ok(Self { conn })
    }

    /// Open an existing database for queries only.
    pub fn open_read_only(path: &Path) -> Result<Self, StoreError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags)?;
        Ok(Self { conn })
    }

    /// Private in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Rows currently held by `store`.
    pub fn row_count(&self, store: StoreName) -> Result<usize, StoreError> {
        let sql = format!("SELECT COUNT(*) FROM {}", store.as_str());
        let n: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(n as usize)
    }

    /// Replace one table inside its own transaction.
    fn replace_table<F>(
        &mut self,
        store: StoreName,
        definition: &str,
        indexes: &[&str],
        fill: F,
    ) -> Result<(), StoreError>
    where
        F: FnOnce(&rusqlite::Transaction<'_>) -> rusqlite::Result<usize>,
    {
        let name = store.as_str();
        let tx = self.conn.transaction()?;
        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS {name}; CREATE TABLE {name} {definition};"
        ))?;
        for index in indexes {
            tx.execute(index, [])?;
        }
        let inserted = fill(&tx)?;
        tx.commit()?;
        debug!(store = name, rows = inserted, "table replaced");
        Ok(())
    }

    /// `sales` rows matching `filter`, in stored order.
    pub fn sales(&self, filter: &SalesFilter) -> Result<Vec<Transaction>, StoreError> {
        let (clause, values) = filter.where_clause();
        let sql = format!(
            "SELECT date, category, product, quantity, price, total_sales, day_of_week, \
             high_volume FROM sales{clause} ORDER BY rowid"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(values.iter()), row_to_transaction)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Every `outliers` row, in stored order.
    pub fn outliers(&self) -> Result<Vec<Transaction>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT date, category, product, quantity, price, total_sales, day_of_week,
                    high_volume
             FROM outliers ORDER BY rowid",
        )?;
        let rows = stmt
            .query_map([], row_to_transaction)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// The revenue, mean-price and peak-day views.
    pub fn category_stats(&self) -> Result<CategoryStats, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT category, total_sales FROM category_revenue ORDER BY category")?;
        let revenue = stmt
            .query_map([], |row| {
                Ok(CategoryRevenue {
                    category: row.get(0)?,
                    total_sales: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT category, product, price FROM category_mean ORDER BY category, product",
        )?;
        let mean = stmt
            .query_map([], |row| {
                Ok(CategoryMean {
                    category: row.get(0)?,
                    product: row.get(1)?,
                    price: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT category, date, total_sales FROM category_day ORDER BY category, date",
        )?;
        let day = stmt
            .query_map([], |row| {
                Ok(CategoryDay {
                    category: row.get(0)?,
                    date: date_column(row, 1)?,
                    total_sales: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(CategoryStats { revenue, mean, day })
    }
}

impl ArtifactStore for SqliteStore {
    fn replace_transactions(
        &mut self,
        store: StoreName,
        rows: &[Transaction],
    ) -> Result<(), StoreError> {
        let indexes: &[&str] = if store == StoreName::Sales {
            &SALES_INDEXES
        } else {
            &[]
        };
        let insert = format!(
            "INSERT INTO {} (date, category, product, quantity, price, total_sales, \
             day_of_week, high_volume) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            store.as_str()
        );
        self.replace_table(store, TRANSACTION_TABLE_SQL, indexes, |tx| {
            let mut stmt = tx.prepare(&insert)?;
            for row in rows {
                stmt.execute(params![
                    row.date.format(STORE_DATE_FORMAT).to_string(),
                    row.category,
                    row.product,
                    row.quantity,
                    row.price,
                    row.total_sales,
                    row.day_name(),
                    row.high_volume,
                ])?;
            }
            Ok(rows.len())
        })
    }

    fn replace_category_day(&mut self, rows: &[CategoryDay]) -> Result<(), StoreError> {
        self.replace_table(
            StoreName::CategoryDay,
            "(category TEXT NOT NULL, date TEXT NOT NULL, total_sales REAL NOT NULL)",
            &[],
            |tx| {
                let mut stmt = tx.prepare(
                    "INSERT INTO category_day (category, date, total_sales) VALUES (?1, ?2, ?3)",
                )?;
                for row in rows {
                    stmt.execute(params![
                        row.category,
                        row.date.format(STORE_DATE_FORMAT).to_string(),
                        row.total_sales,
                    ])?;
                }
                Ok(rows.len())
            },
        )
    }

    fn replace_category_mean(&mut self, rows: &[CategoryMean]) -> Result<(), StoreError> {
        self.replace_table(
            StoreName::CategoryMean,
            "(category TEXT NOT NULL, product TEXT NOT NULL, price REAL NOT NULL)",
            &[],
            |tx| {
                let mut stmt = tx.prepare(
                    "INSERT INTO category_mean (category, product, price) VALUES (?1, ?2, ?3)",
                )?;
                for row in rows {
                    stmt.execute(params![row.category, row.product, row.price])?;
                }
                Ok(rows.len())
            },
        )
    }

    fn replace_category_revenue(&mut self, rows: &[CategoryRevenue]) -> Result<(), StoreError> {
        self.replace_table(
            StoreName::CategoryRevenue,
            "(category TEXT NOT NULL, total_sales REAL NOT NULL)",
            &[],
            |tx| {
                let mut stmt = tx.prepare(
                    "INSERT INTO category_revenue (category, total_sales) VALUES (?1, ?2)",
                )?;
                for row in rows {
                    stmt.execute(params![row.category, row.total_sales])?;
                }
                Ok(rows.len())
            },
        )
    }

    fn backend_type(&self) -> &'static str {
        "sqlite"
    }
}

fn date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let text: String = row.get(idx)?;
    NaiveDate::parse_from_str(&text, STORE_DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let day: String = row.get(6)?;
    let day_of_week = parse_weekday_name(&day).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            6,
            Type::Text,
            format!("unknown weekday '{day}'").into(),
        )
    })?;
    Ok(Transaction {
        date: date_column(row, 0)?,
        category: row.get(1)?,
        product: row.get(2)?,
        quantity: row.get(3)?,
        price: row.get(4)?,
        total_sales: row.get(5)?,
        day_of_week,
        high_volume: row.get(7)?,
    })
}
