//! Property-based tests for cleaning, aggregation and outlier invariants.

use chrono::{Datelike, NaiveDate};
use proptest::prelude::*;
use sp_common::RawRecord;
use sp_core::aggregate::{category_mean, category_peak_day, category_revenue};
use sp_core::{clean, partition};
use std::collections::{BTreeMap, BTreeSet};

const CATEGORIES: [&str; 4] = ["Widget", "Gadget", "Doodad", "Gizmo"];

fn quantity_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        1 => Just(String::new()),
        6 => (0u32..40).prop_map(|q| q.to_string()),
        1 => (0u32..2000).prop_map(|q| format!("{}.5", q)),
        2 => prop::sample::select(vec!["NA", "null", "NaN", "N/A", "None"])
            .prop_map(str::to_string),
        1 => prop::sample::select(vec!["-2", "lots", "inf"]).prop_map(str::to_string),
    ]
}

fn price_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        1 => Just(String::new()),
        1 => Just("n/a".to_string()),
        1 => Just("-3".to_string()),
        6 => (0u32..10_000).prop_map(|cents| format!("{}.{:02}", cents / 100, cents % 100)),
    ]
}

fn raw_table() -> impl Strategy<Value = Vec<RawRecord>> {
    prop::collection::vec(
        (0usize..CATEGORIES.len(), 1u32..=28, quantity_strategy(), price_strategy()),
        0..60,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (cat, day, quantity, price))| RawRecord {
                line: i as u64 + 2,
                date: format!("2024-02-{:02}", day),
                category: CATEGORIES[cat].to_string(),
                product: format!("p{i}"),
                quantity,
                price,
            })
            .collect()
    })
}

fn is_usable_number(raw: &str) -> bool {
    matches!(raw.parse::<f64>(), Ok(v) if v.is_finite() && v >= 0.0)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn missing_or_bad_numbers_never_fail_the_run(raw in raw_table()) {
        let result = clean(&raw);
        prop_assert!(result.is_ok(), "clean failed: {:?}", result.as_ref().err());
        let report = result.unwrap().report;
        let bad_quantities = raw
            .iter()
            .filter(|r| matches!(r.quantity.as_str(), "-2" | "lots" | "inf"))
            .count();
        prop_assert_eq!(report.quantities_coerced, bad_quantities);
    }

    #[test]
    fn cleaned_rows_are_complete_and_consistent(raw in raw_table()) {
        let cleaned = clean(&raw).unwrap();
        for tx in &cleaned.rows {
            prop_assert!(tx.quantity.is_finite() && tx.quantity >= 0.0);
            prop_assert!(tx.price.is_finite() && tx.price >= 0.0);
            prop_assert_eq!(tx.total_sales, tx.quantity * tx.price);
            prop_assert_eq!(tx.day_of_week, tx.date.weekday());
            prop_assert_eq!(tx.high_volume, tx.quantity > 10.0);
        }
    }

    #[test]
    fn only_rows_missing_both_fields_are_dropped(raw in raw_table()) {
        let cleaned = clean(&raw).unwrap();
        let expected: Vec<&str> = raw
            .iter()
            .filter(|r| is_usable_number(&r.quantity) || is_usable_number(&r.price))
            .map(|r| r.product.as_str())
            .collect();
        let kept: Vec<&str> = cleaned.rows.iter().map(|t| t.product.as_str()).collect();
        prop_assert_eq!(kept, expected);

        let report = &cleaned.report;
        prop_assert_eq!(report.rows_kept + report.rows_dropped, report.rows_read);
        prop_assert_eq!(report.rows_read, raw.len());
    }

    #[test]
    fn partition_is_disjoint_and_complete(raw in raw_table()) {
        let cleaned = clean(&raw).unwrap();
        let split = partition(&cleaned.rows);
        prop_assert_eq!(split.len(), cleaned.rows.len());

        let normal: BTreeSet<&str> = split.normal.iter().map(|t| t.product.as_str()).collect();
        let outliers: BTreeSet<&str> = split.outliers.iter().map(|t| t.product.as_str()).collect();
        let all: BTreeSet<&str> = cleaned.rows.iter().map(|t| t.product.as_str()).collect();
        prop_assert!(normal.is_disjoint(&outliers));
        let union: BTreeSet<&str> = normal.union(&outliers).copied().collect();
        prop_assert_eq!(union, all);
    }

    #[test]
    fn single_row_categories_are_never_outliers(raw in raw_table()) {
        let cleaned = clean(&raw).unwrap();
        let mut sizes: BTreeMap<&str, usize> = BTreeMap::new();
        for tx in &cleaned.rows {
            *sizes.entry(tx.category.as_str()).or_default() += 1;
        }
        let split = partition(&cleaned.rows);
        for tx in &split.outliers {
            prop_assert!(sizes[tx.category.as_str()] >= 2);
        }
    }

    #[test]
    fn aggregates_have_no_missing_values(raw in raw_table()) {
        let cleaned = clean(&raw).unwrap();
        for m in category_mean(&cleaned.rows) {
            prop_assert!(m.price.is_finite() && m.price >= 0.0);
        }
        let revenue = category_revenue(&cleaned.rows);
        for r in &revenue {
            prop_assert!(r.total_sales.is_finite() && r.total_sales >= 0.0);
        }
        let categories: BTreeSet<&str> = cleaned.rows.iter().map(|t| t.category.as_str()).collect();
        prop_assert_eq!(revenue.len(), categories.len());
    }

    #[test]
    fn peak_days_are_one_per_category_unless_tied(raw in raw_table()) {
        let cleaned = clean(&raw).unwrap();
        let peaks = category_peak_day(&cleaned.rows);

        let mut per_category: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for p in &peaks {
            per_category.entry(p.category.as_str()).or_default().push(p.total_sales);
        }
        let categories: BTreeSet<&str> = cleaned.rows.iter().map(|t| t.category.as_str()).collect();
        prop_assert_eq!(per_category.len(), categories.len());

        for (category, totals) in &per_category {
            let first = totals[0];
            prop_assert!(totals.iter().all(|t| *t == first), "{} has unequal peaks", category);
            let best_day = cleaned
                .rows
                .iter()
                .filter(|t| t.category == *category)
                .fold(BTreeMap::<NaiveDate, f64>::new(), |mut acc, t| {
                    *acc.entry(t.date).or_insert(0.0) += t.total_sales;
                    acc
                })
                .into_values()
                .fold(f64::NEG_INFINITY, f64::max);
            prop_assert_eq!(first, best_day);
        }
    }
}
