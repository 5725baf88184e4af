//! One full batch run: load, clean, derive, persist.
//!
//! Every run recomputes all artifacts from the input file and replaces every
//! store. Nothing is carried over between runs.

use crate::clean::{clean, CleanReport};
use crate::load::CsvLoader;
use crate::persist::{persist_all, ArtifactStore, Artifacts, SqliteStore, StoreWrite};
use serde::Serialize;
use sp_common::{Error, Result, RunId};
use sp_config::Settings;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{info, info_span};

/// What a completed run did.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: RunId,
    pub input: PathBuf,
    pub input_sha256: String,
    pub database: PathBuf,
    pub clean: CleanReport,
    pub normal_rows: usize,
    pub outlier_rows: usize,
    pub categories: usize,
    pub stores: Vec<StoreWrite>,
}

impl RunSummary {
    /// Human-readable rendering for terminal output.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# Sales pipeline run {}", self.run_id);
        let _ = writeln!(out);
        let _ = writeln!(out, "  Input:     {}", self.input.display());
        let _ = writeln!(out, "  SHA-256:   {}", self.input_sha256);
        let _ = writeln!(out, "  Database:  {}", self.database.display());
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "  Rows: {} read, {} dropped, {} kept",
            self.clean.rows_read, self.clean.rows_dropped, self.clean.rows_kept
        );
        let _ = writeln!(
            out,
            "  Repairs: {} prices coerced, {} quantities coerced, {} quantities imputed",
            self.clean.prices_coerced,
            self.clean.quantities_coerced,
            self.clean.quantities_imputed
        );
        let _ = writeln!(
            out,
            "           {} prices from category median, {} prices zero-filled",
            self.clean.prices_imputed_median, self.clean.prices_imputed_fallback
        );
        let _ = writeln!(
            out,
            "  Partition: {} normal, {} outliers across {} categories",
            self.normal_rows, self.outlier_rows, self.categories
        );
        let _ = writeln!(out);
        for write in &self.stores {
            let _ = writeln!(out, "  {:<18} {} rows", write.store.as_str(), write.rows);
        }
        out
    }
}

/// Run the pipeline against the SQLite database named in `settings`.
pub fn run(settings: &Settings) -> Result<RunSummary> {
    let run_id = RunId::new();
    let span = info_span!("run", run_id = %run_id);
    let _guard = span.enter();

    let (digest, report, artifacts) = prepare(&settings.input)?;

    let mut store = SqliteStore::open(&settings.database).map_err(|e| Error::StoreOpen {
        path: settings.database.clone(),
        reason: e.to_string(),
    })?;
    let stores = persist_all(&mut store, &artifacts)?;

    Ok(finish(
        run_id,
        settings.input.clone(),
        settings.database.clone(),
        digest,
        report,
        &artifacts,
        stores,
    ))
}

/// Run the pipeline against any artifact store.
///
/// `database` is only recorded in the summary.
pub fn run_with_store<S: ArtifactStore + ?Sized>(
    input: &Path,
    database: &Path,
    store: &mut S,
) -> Result<RunSummary> {
    let run_id = RunId::new();
    let span = info_span!("run", run_id = %run_id);
    let _guard = span.enter();

    let (digest, report, artifacts) = prepare(input)?;
    let stores = persist_all(store, &artifacts)?;

    Ok(finish(
        run_id,
        input.to_path_buf(),
        database.to_path_buf(),
        digest,
        report,
        &artifacts,
        stores,
    ))
}

/// Everything up to the first store write. Fails before any store is touched.
fn prepare(input: &Path) -> Result<(String, CleanReport, Artifacts)> {
    let loaded = CsvLoader::new().load_path(input)?;
    let cleaned = clean(&loaded.records)?;
    let artifacts = Artifacts::compute(&cleaned.rows);
    info!(
        sales = artifacts.sales.len(),
        outliers = artifacts.outliers.len(),
        categories = artifacts.category_revenue.len(),
        "derived artifacts"
    );
    Ok((loaded.sha256, cleaned.report, artifacts))
}

fn finish(
    run_id: RunId,
    input: PathBuf,
    database: PathBuf,
    input_sha256: String,
    clean: CleanReport,
    artifacts: &Artifacts,
    stores: Vec<StoreWrite>,
) -> RunSummary {
    info!(run_id = %run_id, "run complete");
    RunSummary {
        run_id,
        input,
        input_sha256,
        database,
        clean,
        normal_rows: artifacts.sales.len(),
        outlier_rows: artifacts.outliers.len(),
        categories: artifacts.category_revenue.len(),
        stores,
    }
}
