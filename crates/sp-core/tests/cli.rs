//! CLI E2E tests for the sales-pipeline binary.
//!
//! Validates:
//! - `run` writes the database and prints a text or JSON summary
//! - Settings precedence between flags, environment and config file
//! - `query` subcommands read back filtered rows as JSON
//! - Exit codes for input, config, store and usage errors

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;

// ============================================================================
// Helpers
// ============================================================================

const SAMPLE: &str = "\
date,category,product,quantity,price
2024-07-01,Widget,Widget-A,10,9.99
2024-07-01,Gadget,Gadget-X,5,19.99
2024-07-02,Doodad,Doodad-1,4,4.99
2024-07-03,Widget,Widget-A,3,
2024-07-03,Gadget,Gadget-X,,
2024-07-03,Widget,Widget-B,,5.0
";

/// Command isolated from the caller's environment and config directory.
fn sales_pipeline(home: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("sales-pipeline");
    cmd.timeout(Duration::from_secs(60))
        .env_remove("SALES_PIPELINE_INPUT")
        .env_remove("SALES_PIPELINE_DB")
        .env_remove("SALES_PIPELINE_LOG_FORMAT")
        .env_remove("RUST_LOG")
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("HOME", home);
    cmd
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

fn run_sample(dir: &Path) -> std::path::PathBuf {
    let input = dir.join("sales.csv");
    let db = dir.join("sales.db");
    fs::write(&input, SAMPLE).unwrap();
    sales_pipeline(dir)
        .arg("run")
        .arg("--input")
        .arg(&input)
        .arg("--database")
        .arg(&db)
        .assert()
        .success();
    db
}

// ============================================================================
// run
// ============================================================================

#[test]
fn test_run_text_summary() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("sales.csv");
    fs::write(&input, SAMPLE).unwrap();

    sales_pipeline(dir.path())
        .arg("run")
        .arg("--input")
        .arg(&input)
        .arg("--database")
        .arg(dir.path().join("out.db"))
        .assert()
        .success()
        .code(0)
        .stdout(predicate::str::contains("category_revenue"))
        .stdout(predicate::str::contains("1 dropped"));

    assert!(dir.path().join("out.db").exists());
}

#[test]
fn test_run_json_summary() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("sales.csv");
    fs::write(&input, SAMPLE).unwrap();

    let output = sales_pipeline(dir.path())
        .args(["run", "--format", "json", "--input"])
        .arg(&input)
        .arg("--database")
        .arg(dir.path().join("out.db"))
        .assert()
        .success()
        .get_output()
        .clone();

    let json = stdout_json(&output);
    assert_eq!(json["command"], "run");
    assert!(json.get("schema_version").is_some());
    let summary = &json["summary"];
    assert!(summary["run_id"].as_str().unwrap().starts_with("run-"));
    assert_eq!(summary["clean"]["rows_read"], 6);
    assert_eq!(summary["clean"]["rows_dropped"], 1);
    assert_eq!(summary["categories"], 3);
    assert_eq!(summary["stores"].as_array().unwrap().len(), 5);
    assert_eq!(summary["stores"][0]["store"], "sales");
    assert_eq!(summary["input_sha256"].as_str().unwrap().len(), 64);
}

#[test]
fn test_run_reads_paths_from_environment() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("env.csv");
    let db = dir.path().join("env.db");
    fs::write(&input, SAMPLE).unwrap();

    sales_pipeline(dir.path())
        .env("SALES_PIPELINE_INPUT", &input)
        .env("SALES_PIPELINE_DB", &db)
        .arg("run")
        .assert()
        .success();
    assert!(db.exists());
}

#[test]
fn test_run_flag_beats_config_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("sales.csv");
    fs::write(&input, SAMPLE).unwrap();
    let config = dir.path().join("pipeline.toml");
    fs::write(
        &config,
        format!(
            "input = {:?}\ndatabase = {:?}\n",
            input.display().to_string(),
            dir.path().join("from-config.db").display().to_string()
        ),
    )
    .unwrap();

    sales_pipeline(dir.path())
        .arg("run")
        .arg("--config")
        .arg(&config)
        .arg("--database")
        .arg(dir.path().join("from-flag.db"))
        .assert()
        .success();

    assert!(dir.path().join("from-flag.db").exists());
    assert!(!dir.path().join("from-config.db").exists());
}

// ============================================================================
// Error exit codes
// ============================================================================

#[test]
fn test_run_invalid_date_exits_11() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("bad.csv");
    fs::write(
        &input,
        "date,category,product,quantity,price\nyesterday,Widget,A,1,1\n",
    )
    .unwrap();

    sales_pipeline(dir.path())
        .arg("run")
        .arg("--input")
        .arg(&input)
        .arg("--database")
        .arg(dir.path().join("out.db"))
        .assert()
        .code(11)
        .stderr(predicate::str::contains("yesterday"));
    assert!(!dir.path().join("out.db").exists());
}

#[test]
fn test_run_missing_column_json_error() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("bad.csv");
    fs::write(&input, "date,category,product,quantity\n2024-07-01,W,A,1\n").unwrap();

    let output = sales_pipeline(dir.path())
        .args(["run", "--format", "json", "--input"])
        .arg(&input)
        .arg("--database")
        .arg(dir.path().join("out.db"))
        .assert()
        .code(11)
        .get_output()
        .clone();

    let json = stdout_json(&output);
    assert_eq!(json["error"]["code"], 20);
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("price"));
}

#[test]
fn test_run_missing_config_file_exits_10() {
    let dir = tempdir().unwrap();
    sales_pipeline(dir.path())
        .arg("run")
        .arg("--config")
        .arg(dir.path().join("absent.toml"))
        .assert()
        .code(10);
}

#[test]
fn test_run_unwritable_database_exits_12() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("sales.csv");
    fs::write(&input, SAMPLE).unwrap();

    sales_pipeline(dir.path())
        .arg("run")
        .arg("--input")
        .arg(&input)
        .arg("--database")
        .arg(dir.path().join("no-such-dir").join("out.db"))
        .assert()
        .code(12)
        .stderr(predicate::str::contains("cannot open database"));
}

// ============================================================================
// query
// ============================================================================

#[test]
fn test_query_sales_with_filters() {
    let dir = tempdir().unwrap();
    let db = run_sample(dir.path());

    let output = sales_pipeline(dir.path())
        .args(["query", "--database"])
        .arg(&db)
        .args([
            "sales",
            "--category",
            "Widget",
            "--start-date",
            "2024-07-03",
            "--end-date",
            "2024-07-03",
        ])
        .assert()
        .success()
        .get_output()
        .clone();

    let json = stdout_json(&output);
    assert_eq!(json["command"], "query sales");
    assert_eq!(json["count"], 2);
    for row in json["rows"].as_array().unwrap() {
        assert_eq!(row["category"], "Widget");
        assert_eq!(row["date"], "2024-07-03");
        assert_eq!(row["day_of_week"], "Wednesday");
    }
}

#[test]
fn test_query_categories() {
    let dir = tempdir().unwrap();
    let db = run_sample(dir.path());

    let output = sales_pipeline(dir.path())
        .args(["query", "--database"])
        .arg(&db)
        .arg("categories")
        .assert()
        .success()
        .get_output()
        .clone();

    let json = stdout_json(&output);
    assert_eq!(json["category_revenue"].as_array().unwrap().len(), 3);
    assert_eq!(json["category_day"].as_array().unwrap().len(), 3);
    assert_eq!(json["category_mean"][0]["category"], "Doodad");
}

#[test]
fn test_query_outliers_empty_for_sample() {
    let dir = tempdir().unwrap();
    let db = run_sample(dir.path());

    sales_pipeline(dir.path())
        .args(["query", "--database"])
        .arg(&db)
        .arg("outliers")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"count\": 0"));
}

#[test]
fn test_query_invalid_date_is_usage_error() {
    let dir = tempdir().unwrap();
    sales_pipeline(dir.path())
        .args(["query", "sales", "--start-date", "07/01/2024"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("YYYY-MM-DD"));
}

#[test]
fn test_query_missing_database_exits_12() {
    let dir = tempdir().unwrap();
    sales_pipeline(dir.path())
        .args(["query", "--database"])
        .arg(dir.path().join("absent.db"))
        .arg("outliers")
        .assert()
        .code(12);
}
