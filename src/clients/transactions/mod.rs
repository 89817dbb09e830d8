//! Local DVF transaction table.
//!
//! The table is the CSV written by [`prepare`](prepare::prepare). It is read
//! once at startup and indexed by its `adresse_complete` column, which holds
//! addresses in normalized form.

pub mod prepare;

use super::{ClientError, TransactionSource};
use crate::normalize::normalize;
use crate::record::{CandidateRow, CandidateSet, FieldValue, Source};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

pub use prepare::{prepare, PrepareStats};

/// Column holding the normalized address of each row.
pub const ADDRESS_COLUMN: &str = "adresse_complete";

/// In-memory transaction table keyed by normalized address.
#[derive(Debug, Default)]
pub struct CsvTransactionTable {
    schema: Vec<String>,
    rows: Vec<CandidateRow>,
    index: HashMap<String, Vec<usize>>,
}

impl CsvTransactionTable {
    /// Load a prepared table from disk.
    pub fn load(path: &Path) -> Result<Self, ClientError> {
        let file = std::fs::File::open(path).map_err(|e| {
            ClientError::Table(format!("cannot open {}: {}", path.display(), e))
        })?;
        let table = Self::from_reader(file)?;
        tracing::info!(
            path = %path.display(),
            rows = table.len(),
            addresses = table.index.len(),
            "Transaction table loaded"
        );
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ClientError> {
        let mut csv = csv::ReaderBuilder::new().flexible(false).from_reader(reader);
        let schema: Vec<String> = csv.headers()?.iter().map(str::to_string).collect();

        let address_col = schema
            .iter()
            .position(|h| h == ADDRESS_COLUMN)
            .ok_or_else(|| {
                ClientError::Table(format!(
                    "missing '{}' column, run `fiche prepare` first",
                    ADDRESS_COLUMN
                ))
            })?;

        let mut rows = Vec::new();
        let mut index: HashMap<String, Vec<usize>> = HashMap::new();
        for record in csv.records() {
            let record = record?;
            let key = normalize(record.get(address_col).unwrap_or_default());
            if key.is_empty() {
                continue;
            }

            let mut row = CandidateRow::new(Source::Dvf);
            for (name, cell) in schema.iter().zip(record.iter()) {
                row.insert(name.as_str(), FieldValue::from_cell(cell));
            }
            index.entry(key).or_default().push(rows.len());
            rows.push(row);
        }

        Ok(Self {
            schema,
            rows,
            index,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn schema(&self) -> &[String] {
        &self.schema
    }
}

impl TransactionSource for CsvTransactionTable {
    fn by_address(&self, normalized: &str) -> CandidateSet {
        let matches = self.index.get(&normalize(normalized));
        let rows: Vec<CandidateRow> = matches
            .into_iter()
            .flatten()
            .map(|&i| self.rows[i].clone())
            .collect();

        tracing::debug!(address = normalized, rows = rows.len(), "Transaction lookup");

        let mut set = CandidateSet::with_schema(Source::Dvf, self.schema.clone());
        if !rows.is_empty() {
            set = CandidateSet::from_rows(Source::Dvf, rows);
        }
        set
    }
}
