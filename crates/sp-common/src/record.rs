//! Row types flowing through the pipeline.
//!
//! [`RawRecord`] is what the loader hands over: untouched strings plus the
//! source line. Everything downstream of the cleaner works on
//! [`Transaction`], which by construction has no missing values and whose
//! derived fields cannot drift from the fields they are computed from.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Quantity above which a transaction counts as high volume.
pub const HIGH_VOLUME_THRESHOLD: f64 = 10.0;

/// One unvalidated input row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// 1-based line in the source file (the header is line 1).
    pub line: u64,
    pub date: String,
    pub category: String,
    pub product: String,
    pub quantity: String,
    pub price: String,
}

/// One cleaned, enriched transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub category: String,
    pub product: String,
    pub quantity: f64,
    pub price: f64,
    pub total_sales: f64,
    #[serde(with = "day_name")]
    pub day_of_week: Weekday,
    pub high_volume: bool,
}

impl Transaction {
    /// Build a transaction, deriving `total_sales`, `day_of_week` and
    /// `high_volume` from the given fields.
    pub fn new(
        date: NaiveDate,
        category: impl Into<String>,
        product: impl Into<String>,
        quantity: f64,
        price: f64,
    ) -> Self {
        Self {
            date,
            category: category.into(),
            product: product.into(),
            quantity,
            price,
            total_sales: quantity * price,
            day_of_week: date.weekday(),
            high_volume: quantity > HIGH_VOLUME_THRESHOLD,
        }
    }

    /// Full English name of the transaction's weekday.
    pub fn day_name(&self) -> &'static str {
        weekday_name(self.day_of_week)
    }
}

/// Mean price of one (category, product) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryMean {
    pub category: String,
    pub product: String,
    pub price: f64,
}

/// Summed sales of one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRevenue {
    pub category: String,
    pub total_sales: f64,
}

/// A peak-sales day of one category. Several rows per category on ties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDay {
    pub category: String,
    pub date: NaiveDate,
    pub total_sales: f64,
}

/// Full English weekday name, e.g. `Monday`.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Inverse of [`weekday_name`].
pub fn parse_weekday_name(name: &str) -> Option<Weekday> {
    match name {
        "Monday" => Some(Weekday::Mon),
        "Tuesday" => Some(Weekday::Tue),
        "Wednesday" => Some(Weekday::Wed),
        "Thursday" => Some(Weekday::Thu),
        "Friday" => Some(Weekday::Fri),
        "Saturday" => Some(Weekday::Sat),
        "Sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

mod day_name {
    use super::{parse_weekday_name, weekday_name};
    use chrono::Weekday;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(day: &Weekday, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(weekday_name(*day))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Weekday, D::Error> {
        let name = String::deserialize(d)?;
        parse_weekday_name(&name)
            .ok_or_else(|| de::Error::custom(format!("unknown weekday '{name}'")))
    }
}
