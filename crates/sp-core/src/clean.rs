//! Cleaner: raw records → validated, enriched transactions.
//!
//! Policy, applied in order:
//! 1. `quantity` and `price` are coerced to numbers. Blank cells and the usual
//!    missing-value markers (`NA`, `N/A`, `NaN`, `null`, `None`, ...) are
//!    missing; anything else that is not a finite, non-negative number is
//!    coerced to missing and counted. Row-local, never an error.
//! 2. Rows missing **both** `quantity` and `price` are dropped. A row missing
//!    only one of them is repaired, not dropped.
//! 3. Missing `quantity` becomes 0.
//! 4. Missing `price` becomes the median of the valid prices in the row's
//!    category, or 0 when the category has none.
//! 5. `date` is parsed for every surviving row; failure aborts the run.
//! 6. Derived fields are computed by [`Transaction::new`].
//!
//! Missingness exists only inside this module. The returned rows carry plain
//! numbers.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sp_common::{Error, RawRecord, Result, Transaction};
use sp_math::median;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Value used for a missing quantity.
pub const QUANTITY_FILL: f64 = 0.0;

/// Value used for a missing price when the category has no valid price.
pub const PRICE_FALLBACK: f64 = 0.0;

/// Cell contents read as a missing value rather than as bad data.
const MISSING_MARKERS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Counts of every repair the cleaner made.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanReport {
    pub rows_read: usize,
    pub rows_dropped: usize,
    pub rows_kept: usize,
    /// Non-blank prices that could not be used as a price.
    pub prices_coerced: usize,
    /// Non-blank quantities that could not be used as a quantity.
    pub quantities_coerced: usize,
    pub quantities_imputed: usize,
    pub prices_imputed_median: usize,
    /// Missing prices in categories with no valid price at all.
    pub prices_imputed_fallback: usize,
}

/// Output of [`clean`].
#[derive(Debug, Clone)]
pub struct Cleaned {
    pub rows: Vec<Transaction>,
    pub report: CleanReport,
}

/// A numeric field before imputation.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Numeric {
    Value(f64),
    Blank,
    Unusable,
}

fn parse_numeric(raw: &str) -> Numeric {
    let raw = raw.trim();
    if raw.is_empty() || MISSING_MARKERS.iter().any(|m| *m == raw) {
        return Numeric::Blank;
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_nan() => Numeric::Blank,
        Ok(v) if v.is_finite() && v >= 0.0 => Numeric::Value(v),
        _ => Numeric::Unusable,
    }
}

/// Row after numeric coercion, before imputation.
struct Pending<'a> {
    raw: &'a RawRecord,
    quantity: Option<f64>,
    price: Option<f64>,
}

/// Parse a calendar date.
///
/// Accepts `YYYY-MM-DD`, `YYYY/MM/DD`, `YYYY-MM-DD HH:MM:SS`,
/// `YYYY-MM-DDTHH:MM:SS` and RFC 3339 timestamps; any time part is discarded.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(ts.date());
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.date_naive())
}

/// Clean a raw table.
///
/// # Errors
/// [`Error::InvalidDate`] for a surviving row whose date does not parse.
pub fn clean(records: &[RawRecord]) -> Result<Cleaned> {
    let mut report = CleanReport {
        rows_read: records.len(),
        ..CleanReport::default()
    };

    let mut pending = Vec::with_capacity(records.len());
    for raw in records {
        let price = match parse_numeric(&raw.price) {
            Numeric::Value(v) => Some(v),
            Numeric::Blank => None,
            Numeric::Unusable => {
                report.prices_coerced += 1;
                debug!(line = raw.line, value = %raw.price, "price coerced to missing");
                None
            }
        };
        let quantity = match parse_numeric(&raw.quantity) {
            Numeric::Value(v) => Some(v),
            Numeric::Blank => None,
            Numeric::Unusable => {
                report.quantities_coerced += 1;
                debug!(line = raw.line, value = %raw.quantity, "quantity coerced to missing");
                None
            }
        };

        if quantity.is_none() && price.is_none() {
            report.rows_dropped += 1;
            continue;
        }
        pending.push(Pending {
            raw,
            quantity,
            price,
        });
    }

    let medians = category_medians(&pending);

    let mut rows = Vec::with_capacity(pending.len());
    for row in pending {
        let raw = row.raw;
        let date = parse_date(&raw.date).ok_or_else(|| Error::InvalidDate {
            line: raw.line,
            value: raw.date.clone(),
        })?;

        let quantity = match row.quantity {
            Some(q) => q,
            None => {
                report.quantities_imputed += 1;
                debug!(line = raw.line, "quantity imputed");
                QUANTITY_FILL
            }
        };

        let price = match row.price {
            Some(p) => p,
            None => match medians.get(raw.category.as_str()) {
                Some(&m) => {
                    report.prices_imputed_median += 1;
                    debug!(
                        line = raw.line,
                        category = %raw.category,
                        median = m,
                        "price imputed from category median"
                    );
                    m
                }
                None => {
                    report.prices_imputed_fallback += 1;
                    debug!(
                        line = raw.line,
                        category = %raw.category,
                        "category has no valid price; price set to fallback"
                    );
                    PRICE_FALLBACK
                }
            },
        };

        rows.push(Transaction::new(
            date,
            raw.category.clone(),
            raw.product.clone(),
            quantity,
            price,
        ));
    }
    report.rows_kept = rows.len();

    if report.prices_coerced > 0 || report.quantities_coerced > 0 {
        warn!(
            prices_coerced = report.prices_coerced,
            quantities_coerced = report.quantities_coerced,
            "input contained unusable numbers"
        );
    }
    info!(
        rows_read = report.rows_read,
        rows_kept = report.rows_kept,
        rows_dropped = report.rows_dropped,
        quantities_imputed = report.quantities_imputed,
        prices_imputed = report.prices_imputed_median + report.prices_imputed_fallback,
        "cleaned input"
    );

    Ok(Cleaned { rows, report })
}

/// Median valid price per category, over rows that survived the drop step.
/// Categories without any valid price are absent.
fn category_medians<'a>(rows: &[Pending<'a>]) -> BTreeMap<&'a str, f64> {
    let mut prices: BTreeMap<&'a str, Vec<f64>> = BTreeMap::new();
    for row in rows {
        if let Some(p) = row.price {
            prices.entry(row.raw.category.as_str()).or_default().push(p);
        }
    }
    prices
        .into_iter()
        .filter_map(|(category, values)| median(&values).map(|m| (category, m)))
        .collect()
}
