//! Loader: delimited input file → raw records.
//!
//! No field is interpreted here. Columns are located by header name, values
//! are kept as trimmed strings, and each record remembers its source line so
//! later stages can point at the offending row.

use csv::{ReaderBuilder, StringRecord, Trim};
use sha2::{Digest, Sha256};
use sp_common::{Error, RawRecord, Result, REQUIRED_COLUMNS};
use std::path::Path;
use tracing::{debug, info};

/// Raw records plus a fingerprint of the bytes they came from.
#[derive(Debug, Clone)]
pub struct LoadedInput {
    pub records: Vec<RawRecord>,
    /// Hex SHA-256 of the input bytes.
    pub sha256: String,
}

/// CSV loader for the fixed sales column set.
#[derive(Debug, Clone)]
pub struct CsvLoader {
    delimiter: u8,
}

impl Default for CsvLoader {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Read and parse a file.
    pub fn load_path(&self, path: &Path) -> Result<LoadedInput> {
        let bytes = std::fs::read(path)?;
        let loaded = self.load_bytes(&bytes)?;
        info!(
            path = %path.display(),
            rows = loaded.records.len(),
            "loaded input"
        );
        Ok(loaded)
    }

    /// Parse input already in memory.
    pub fn load_bytes(&self, bytes: &[u8]) -> Result<LoadedInput> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(Trim::All)
            .flexible(true)
            .from_reader(bytes);

        let headers = reader
            .headers()
            .map_err(|e| Error::MalformedInput {
                line: 1,
                reason: format!("failed to read header: {e}"),
            })?
            .clone();
        let layout = ColumnLayout::from_headers(&headers)?;
        debug!(?layout, "resolved input columns");

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| Error::MalformedInput {
                line: e.position().map(|p| p.line()).unwrap_or(0),
                reason: e.to_string(),
            })?;
            records.push(layout.extract(&record));
        }

        Ok(LoadedInput {
            records,
            sha256: hex::encode(Sha256::digest(bytes)),
        })
    }
}

/// Index of each required column in the header.
#[derive(Debug, Clone, Copy)]
struct ColumnLayout {
    date: usize,
    category: usize,
    product: usize,
    quantity: usize,
    price: usize,
}

impl ColumnLayout {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| Error::MissingColumn {
                    column: name.to_string(),
                })
        };
        let [date, category, product, quantity, price] = REQUIRED_COLUMNS;
        Ok(Self {
            date: find(date)?,
            category: find(category)?,
            product: find(product)?,
            quantity: find(quantity)?,
            price: find(price)?,
        })
    }

    fn extract(&self, record: &StringRecord) -> RawRecord {
        // Short rows are allowed; absent trailing fields read as blank.
        let field = |idx: usize| record.get(idx).unwrap_or("").to_string();
        RawRecord {
            line: record.position().map(|p| p.line()).unwrap_or(0),
            date: field(self.date),
            category: field(self.category),
            product: field(self.product),
            quantity: field(self.quantity),
            price: field(self.price),
        }
    }
}
