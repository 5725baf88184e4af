//! OutlierDetector: per-category two-sigma rule on `quantity`.
//!
//! A row is an outlier when its quantity lies strictly outside
//! `mean ± 2·s` of its category, with `s` the sample standard deviation.
//! Categories with fewer than two rows have no defined spread and are exempt:
//! none of their rows is ever flagged.

use sp_common::Transaction;
use sp_math::{Dispersion, MIN_SAMPLE_FOR_VARIANCE};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Width of the normal band in standard deviations.
pub const OUTLIER_SIGMAS: f64 = 2.0;

/// Smallest category that takes part in outlier detection.
pub const MIN_ROWS_FOR_DETECTION: usize = MIN_SAMPLE_FOR_VARIANCE;

/// Cleaned rows split into normal rows and outliers.
///
/// Both halves keep the input order. Every input row lands in exactly one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    pub normal: Vec<Transaction>,
    pub outliers: Vec<Transaction>,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.normal.len() + self.outliers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Quantity dispersion per category.
pub fn category_dispersion(rows: &[Transaction]) -> BTreeMap<&str, Dispersion> {
    let mut quantities: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for tx in rows {
        quantities
            .entry(tx.category.as_str())
            .or_default()
            .push(tx.quantity);
    }
    quantities
        .into_iter()
        .filter_map(|(category, values)| {
            Dispersion::from_values(&values).map(|d| (category, d))
        })
        .collect()
}

/// Whether `tx` falls outside its category's band.
fn is_outlier(tx: &Transaction, stats: &BTreeMap<&str, Dispersion>) -> bool {
    match stats.get(tx.category.as_str()) {
        Some(d) if d.count >= MIN_ROWS_FOR_DETECTION => {
            d.is_beyond(tx.quantity, OUTLIER_SIGMAS)
        }
        _ => false,
    }
}

/// Split the cleaned table into normal rows and outliers.
pub fn partition(rows: &[Transaction]) -> Partition {
    let stats = category_dispersion(rows);
    for (category, d) in &stats {
        debug!(
            category,
            count = d.count,
            mean = d.mean,
            std_dev = ?d.std_dev,
            "category quantity dispersion"
        );
    }

    let mut out = Partition::default();
    for tx in rows {
        if is_outlier(tx, &stats) {
            out.outliers.push(tx.clone());
        } else {
            out.normal.push(tx.clone());
        }
    }

    info!(
        normal = out.normal.len(),
        outliers = out.outliers.len(),
        "partitioned outliers"
    );
    out
}
