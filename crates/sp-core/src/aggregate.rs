//! Aggregator: category reductions over the cleaned table.
//!
//! Each reduction is a pure function of the cleaned rows. Outputs are ordered
//! by key, and sums accumulate in input row order so identical input yields
//! bit-identical output.

use chrono::NaiveDate;
use sp_common::{CategoryDay, CategoryMean, CategoryRevenue, Transaction};
use std::collections::BTreeMap;
use tracing::debug;

/// Mean `price` per (category, product).
pub fn category_mean(rows: &[Transaction]) -> Vec<CategoryMean> {
    let mut groups: BTreeMap<(&str, &str), (f64, usize)> = BTreeMap::new();
    for tx in rows {
        let entry = groups
            .entry((tx.category.as_str(), tx.product.as_str()))
            .or_insert((0.0, 0));
        entry.0 += tx.price;
        entry.1 += 1;
    }
    groups
        .into_iter()
        .map(|((category, product), (sum, count))| CategoryMean {
            category: category.to_string(),
            product: product.to_string(),
            price: sum / count as f64,
        })
        .collect()
}

/// Summed `total_sales` per category.
pub fn category_revenue(rows: &[Transaction]) -> Vec<CategoryRevenue> {
    let mut groups: BTreeMap<&str, f64> = BTreeMap::new();
    for tx in rows {
        *groups.entry(tx.category.as_str()).or_insert(0.0) += tx.total_sales;
    }
    groups
        .into_iter()
        .map(|(category, total_sales)| CategoryRevenue {
            category: category.to_string(),
            total_sales,
        })
        .collect()
}

/// Daily `total_sales` per (category, date).
pub fn daily_totals(rows: &[Transaction]) -> BTreeMap<(&str, NaiveDate), f64> {
    let mut days: BTreeMap<(&str, NaiveDate), f64> = BTreeMap::new();
    for tx in rows {
        *days.entry((tx.category.as_str(), tx.date)).or_insert(0.0) += tx.total_sales;
    }
    days
}

/// Peak-sales day(s) per category.
///
/// Every day whose daily total equals the category maximum is kept. The
/// comparison is exact floating-point equality against the maximum of the
/// same computed totals, so ties are only those the summation actually
/// produced.
pub fn category_peak_day(rows: &[Transaction]) -> Vec<CategoryDay> {
    let days = daily_totals(rows);

    let mut peaks: BTreeMap<&str, f64> = BTreeMap::new();
    for (&(category, _), &total) in &days {
        peaks
            .entry(category)
            .and_modify(|max| *max = max.max(total))
            .or_insert(total);
    }

    let out: Vec<CategoryDay> = days
        .iter()
        .filter(|(key, total)| peaks.get(key.0) == Some(*total))
        .map(|(&(category, date), &total_sales)| CategoryDay {
            category: category.to_string(),
            date,
            total_sales,
        })
        .collect();

    debug!(
        categories = peaks.len(),
        peak_rows = out.len(),
        "computed category peak days"
    );
    out
}
