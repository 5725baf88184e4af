//! Input columns, output store names, and schema versioning.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Current schema version of the persisted stores and JSON outputs.
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Header columns the input file must carry. Extra columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 5] = ["date", "category", "product", "quantity", "price"];

/// The five named output stores, in write order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreName {
    /// Cleaned rows that are not outliers.
    Sales,
    /// Rows flagged by the per-category two-sigma rule.
    Outliers,
    /// Peak-sales day(s) per category.
    CategoryDay,
    /// Mean price per (category, product).
    CategoryMean,
    /// Summed sales per category.
    CategoryRevenue,
}

impl StoreName {
    /// All stores in the order a run writes them.
    pub const ALL: [StoreName; 5] = [
        StoreName::Sales,
        StoreName::Outliers,
        StoreName::CategoryDay,
        StoreName::CategoryMean,
        StoreName::CategoryRevenue,
    ];

    /// Table name used by the store.
    pub fn as_str(self) -> &'static str {
        match self {
            StoreName::Sales => "sales",
            StoreName::Outliers => "outliers",
            StoreName::CategoryDay => "category_day",
            StoreName::CategoryMean => "category_mean",
            StoreName::CategoryRevenue => "category_revenue",
        }
    }
}

impl fmt::Display for StoreName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
