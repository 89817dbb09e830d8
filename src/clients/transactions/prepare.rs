//! Cleaning pass turning a raw DVF export into the lookup table.

use super::ADDRESS_COLUMN;
use crate::clients::ClientError;
use crate::normalize::normalize;
use serde::Serialize;
use std::collections::HashSet;
use std::io::{Read, Write};

/// Property types kept: 1 = house, 2 = apartment.
const KEPT_PROPERTY_TYPES: [&str; 2] = ["1", "2"];

const INTEGER_COLUMNS: [&str; 6] = [
    "adresse_numero",
    "code_postal",
    "code_type_local",
    "surface_reelle_bati",
    "nombre_pieces_principales",
    "surface_terrain",
];

const DEDUP_COLUMNS: [&str; 6] = [
    ADDRESS_COLUMN,
    "id_parcelle",
    "type_local",
    "date_mutation",
    "longitude",
    "latitude",
];

const POSTAL_CODE_WIDTH: usize = 5;

/// Row counts from one [`prepare`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PrepareStats {
    pub read: usize,
    /// Repeated header lines from concatenated exports
    pub header_rows: usize,
    /// Rows that are neither a house nor an apartment
    pub other_types: usize,
    pub duplicates: usize,
    pub written: usize,
}

/// Positions of the columns the cleaning pass reads.
struct Columns {
    type_local_code: usize,
    integers: Vec<(usize, &'static str)>,
    numero: Option<usize>,
    suffixe: Option<usize>,
    voie: Option<usize>,
    postal: Option<usize>,
    commune: Option<usize>,
    /// `adresse_complete`, existing or appended after the last column
    address: usize,
    dedup: Vec<Option<usize>>,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Result<Self, ClientError> {
        let find = |name: &str| headers.iter().position(|h| h == name);

        let type_local_code = find("code_type_local").ok_or_else(|| {
            ClientError::Table("missing 'code_type_local' column".to_string())
        })?;
        let address = find(ADDRESS_COLUMN).unwrap_or(headers.len());

        Ok(Self {
            type_local_code,
            integers: INTEGER_COLUMNS
                .iter()
                .filter_map(|&name| find(name).map(|i| (i, name)))
                .collect(),
            numero: find("adresse_numero"),
            suffixe: find("adresse_suffixe"),
            voie: find("adresse_nom_voie"),
            postal: find("code_postal"),
            commune: find("nom_commune"),
            address,
            dedup: DEDUP_COLUMNS
                .iter()
                .map(|&name| {
                    if name == ADDRESS_COLUMN {
                        Some(address)
                    } else {
                        find(name)
                    }
                })
                .collect(),
        })
    }
}

/// Clean a raw DVF CSV export.
///
/// Drops repeated header lines, keeps houses and apartments, normalizes
/// integer columns, derives `adresse_complete` and removes duplicate
/// mutations. Row order is preserved.
pub fn prepare<R: Read, W: Write>(input: R, output: W) -> Result<PrepareStats, ClientError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
    let headers = reader.headers()?.clone();
    let columns = Columns::locate(&headers)?;

    let mut out_headers = headers.clone();
    if columns.address == headers.len() {
        out_headers.push_field(ADDRESS_COLUMN);
    }
    let width = out_headers.len();

    let mut writer = csv::Writer::from_writer(output);
    writer.write_record(&out_headers)?;

    let mut stats = PrepareStats::default();
    let mut seen: HashSet<Vec<String>> = HashSet::new();

    for record in reader.records() {
        let record = record?;
        stats.read += 1;

        if record
            .iter()
            .zip(headers.iter())
            .any(|(cell, name)| cell == name)
        {
            stats.header_rows += 1;
            continue;
        }

        let mut cells: Vec<String> = (0..width)
            .map(|i| record.get(i).unwrap_or_default().to_string())
            .collect();

        for &(i, name) in &columns.integers {
            cells[i] = if name == "code_postal" {
                clean_postal_code(&cells[i])
            } else {
                clean_integer(&cells[i])
            };
        }

        if !KEPT_PROPERTY_TYPES.contains(&cells[columns.type_local_code].as_str()) {
            stats.other_types += 1;
            continue;
        }

        cells[columns.address] = complete_address(&columns, &cells);

        let key: Vec<String> = columns
            .dedup
            .iter()
            .map(|col| col.map(|i| cells[i].clone()).unwrap_or_default())
            .collect();
        if !seen.insert(key) {
            stats.duplicates += 1;
            continue;
        }

        writer.write_record(&cells)?;
        stats.written += 1;
    }

    writer.flush()?;
    tracing::info!(
        read = stats.read,
        written = stats.written,
        header_rows = stats.header_rows,
        other_types = stats.other_types,
        duplicates = stats.duplicates,
        "Transaction table prepared"
    );
    Ok(stats)
}

/// `"80.0"` → `"80"`; anything that is not a whole number becomes empty.
fn clean_integer(raw: &str) -> String {
    let s = raw.trim();
    if let Ok(i) = s.parse::<i64>() {
        return i.to_string();
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 => (f as i64).to_string(),
        _ => String::new(),
    }
}

/// Like [`clean_integer`] but keeps leading zeros, restoring the ones a
/// float export dropped.
fn clean_postal_code(raw: &str) -> String {
    let s = raw.trim();
    if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
        return s.to_string();
    }
    let cleaned = clean_integer(s);
    if cleaned.is_empty() || cleaned.starts_with('-') {
        return String::new();
    }
    format!("{:0>width$}", cleaned, width = POSTAL_CODE_WIDTH)
}

fn complete_address(columns: &Columns, cells: &[String]) -> String {
    let cell = |col: Option<usize>| col.map(|i| cells[i].trim()).unwrap_or_default();

    let voie = cell(columns.voie);
    let voie = if voie.is_empty() {
        String::new()
    } else {
        format!("{},", voie)
    };
    let commune = cell(columns.commune).to_uppercase();

    let parts = [
        cell(columns.numero),
        cell(columns.suffixe),
        voie.as_str(),
        cell(columns.postal),
        commune.as_str(),
    ];
    let joined = parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    normalize(&joined)
}
