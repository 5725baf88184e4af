//! Persister: write the five run artifacts to named stores.
//!
//! Each store is fully replaced. Stores are written one after another in
//! [`StoreName::ALL`] order; the first failure aborts the run. Stores written
//! before the failure keep this run's contents and stores after it keep
//! whatever they held before. There is no transaction spanning stores.

pub mod sqlite;

use crate::aggregate::{category_mean, category_peak_day, category_revenue};
use crate::outlier::partition;
use serde::Serialize;
use sp_common::{
    CategoryDay, CategoryMean, CategoryRevenue, Error, Result, StoreName, Transaction,
};
use tracing::{error, info};

pub use sqlite::{CategoryStats, SalesFilter, SqliteStore};

/// Failure inside a store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("{0}")]
    Backend(String),
}

/// Destination for run artifacts.
///
/// Every `replace_*` call discards what the named store held and leaves
/// exactly the given rows in it.
pub trait ArtifactStore {
    /// Replace a transaction-shaped store (`sales` or `outliers`).
    fn replace_transactions(
        &mut self,
        store: StoreName,
        rows: &[Transaction],
    ) -> std::result::Result<(), StoreError>;

    fn replace_category_day(
        &mut self,
        rows: &[CategoryDay],
    ) -> std::result::Result<(), StoreError>;

    fn replace_category_mean(
        &mut self,
        rows: &[CategoryMean],
    ) -> std::result::Result<(), StoreError>;

    fn replace_category_revenue(
        &mut self,
        rows: &[CategoryRevenue],
    ) -> std::result::Result<(), StoreError>;

    /// Backend name for logging.
    fn backend_type(&self) -> &'static str;
}

/// Everything a run persists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Artifacts {
    pub sales: Vec<Transaction>,
    pub outliers: Vec<Transaction>,
    pub category_day: Vec<CategoryDay>,
    pub category_mean: Vec<CategoryMean>,
    pub category_revenue: Vec<CategoryRevenue>,
}

impl Artifacts {
    /// Derive all artifacts from the cleaned table.
    ///
    /// Aggregates see every cleaned row, outliers included; only the
    /// `sales`/`outliers` split depends on outlier detection.
    pub fn compute(rows: &[Transaction]) -> Self {
        let split = partition(rows);
        Self {
            sales: split.normal,
            outliers: split.outliers,
            category_day: category_peak_day(rows),
            category_mean: category_mean(rows),
            category_revenue: category_revenue(rows),
        }
    }

    /// Number of rows destined for `store`.
    pub fn row_count(&self, store: StoreName) -> usize {
        match store {
            StoreName::Sales => self.sales.len(),
            StoreName::Outliers => self.outliers.len(),
            StoreName::CategoryDay => self.category_day.len(),
            StoreName::CategoryMean => self.category_mean.len(),
            StoreName::CategoryRevenue => self.category_revenue.len(),
        }
    }
}

/// One store written by a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreWrite {
    pub store: StoreName,
    pub rows: usize,
}

/// Write every artifact, in store order, stopping at the first failure.
pub fn persist_all<S: ArtifactStore + ?Sized>(
    backend: &mut S,
    artifacts: &Artifacts,
) -> Result<Vec<StoreWrite>> {
    let mut written = Vec::with_capacity(StoreName::ALL.len());
    for store in StoreName::ALL {
        let outcome = match store {
            StoreName::Sales | StoreName::Outliers => {
                let rows = if store == StoreName::Sales {
                    &artifacts.sales
                } else {
                    &artifacts.outliers
                };
                backend.replace_transactions(store, rows)
            }
            StoreName::CategoryDay => backend.replace_category_day(&artifacts.category_day),
            StoreName::CategoryMean => backend.replace_category_mean(&artifacts.category_mean),
            StoreName::CategoryRevenue => {
                backend.replace_category_revenue(&artifacts.category_revenue)
            }
        };

        if let Err(e) = outcome {
            error!(
                store = %store,
                backend = backend.backend_type(),
                error = %e,
                "store write failed; run aborted"
            );
            return Err(Error::Store {
                store,
                reason: e.to_string(),
            });
        }

        let rows = artifacts.row_count(store);
        info!(store = %store, rows, "store replaced");
        written.push(StoreWrite { store, rows });
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    /// Records calls and fails on one chosen store.
    #[derive(Default)]
    struct RecordingStore {
        calls: Vec<StoreName>,
        fail_on: Option<StoreName>,
    }

    impl RecordingStore {
        fn hit(&mut self, store: StoreName) -> std::result::Result<(), StoreError> {
            if self.fail_on == Some(store) {
                return Err(StoreError::Backend("disk full".to_string()));
            }
            self.calls.push(store);
            Ok(())
        }
    }

    impl ArtifactStore for RecordingStore {
        fn replace_transactions(
            &mut self,
            store: StoreName,
            _rows: &[Transaction],
        ) -> std::result::Result<(), StoreError> {
            self.hit(store)
        }

        fn replace_category_day(
            &mut self,
            _rows: &[CategoryDay],
        ) -> std::result::Result<(), StoreError> {
            self.hit(StoreName::CategoryDay)
        }

        fn replace_category_mean(
            &mut self,
            _rows: &[CategoryMean],
        ) -> std::result::Result<(), StoreError> {
            self.hit(StoreName::CategoryMean)
        }

        fn replace_category_revenue(
            &mut self,
            _rows: &[CategoryRevenue],
        ) -> std::result::Result<(), StoreError> {
            self.hit(StoreName::CategoryRevenue)
        }

        fn backend_type(&self) -> &'static str {
            "recording"
        }
    }

    fn rows() -> Vec<Transaction> {
        let d = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        vec![
            Transaction::new(d, "Widget", "A", 2.0, 3.0),
            Transaction::new(d, "Gadget", "B", 1.0, 4.0),
        ]
    }

    #[test]
    fn writes_every_store_in_order() {
        let artifacts = Artifacts::compute(&rows());
        let mut store = RecordingStore::default();
        let written = persist_all(&mut store, &artifacts).unwrap();
        assert_eq!(store.calls, StoreName::ALL.to_vec());
        assert_eq!(written.len(), 5);
        assert_eq!(written[0].rows, 2);
    }

    #[test]
    fn first_failure_aborts_with_store_name() {
        let artifacts = Artifacts::compute(&rows());
        let mut store = RecordingStore {
            fail_on: Some(StoreName::CategoryDay),
            ..Default::default()
        };
        let err = persist_all(&mut store, &artifacts).unwrap_err();
        assert_eq!(err.store(), Some(StoreName::CategoryDay));
        assert!(err.to_string().contains("category_day"));
        assert!(err.to_string().contains("disk full"));
        assert_eq!(store.calls, vec![StoreName::Sales, StoreName::Outliers]);
    }

    #[test]
    fn aggregates_include_outliers() {
        let d = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let mut cleaned: Vec<Transaction> = (0..10)
            .map(|_| Transaction::new(d, "Widget", "A", 10.0, 1.0))
            .collect();
        cleaned.push(Transaction::new(d, "Widget", "A", 100.0, 1.0));

        let artifacts = Artifacts::compute(&cleaned);
        assert_eq!(artifacts.outliers.len(), 1);
        assert_eq!(artifacts.category_revenue[0].total_sales, 200.0);
        assert_eq!(artifacts.row_count(StoreName::Sales), 10);
    }
}
