//! Shared test utilities for fiche integration tests.
//!
//! Provides mock dataset servers, transaction tables and scripted choosers
//! so each test file only states what its scenario is about.

#![allow(dead_code)]

use fiche::clients::CsvTransactionTable;
use fiche::config::FicheConfig;
use fiche::pipeline::QueryPipeline;
use fiche::record::FieldValue;
use fiche::reduce::Chooser;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// Well-Known Test Constants
// =============================================================================

pub const TOKEN: &str = "test-token";

pub const LABEL: &str = "8 Boulevard du Port 80000 Amiens";

/// `LABEL` once normalized, the key of the transaction table.
pub const NORMALIZED: &str = "8 BOULEVARD DU PORT 80000 AMIENS";

pub const X: f64 = 648952.58;
pub const Y: f64 = 6977867.25;

pub const GEOCODER_PATH: &str = "/search/";
pub const DIAGNOSTICS_PATH: &str = "/lines";
pub const PARCELS_PATH: &str = "/reverse";

// =============================================================================
// Configuration
// =============================================================================

/// Defaults with every endpoint pointed at `server`.
pub fn config_for(server: &MockServer) -> FicheConfig {
    let mut config = FicheConfig::default();
    config.geocoder.url = format!("{}{}", server.uri(), GEOCODER_PATH);
    config.diagnostics.url = format!("{}{}", server.uri(), DIAGNOSTICS_PATH);
    config.parcels.url = format!("{}{}", server.uri(), PARCELS_PATH);
    config.parcels.enabled = false;
    config.geocoder.timeout_seconds = 1;
    config
}

pub fn pipeline_for(config: &FicheConfig, table: CsvTransactionTable) -> QueryPipeline {
    QueryPipeline::from_config(config, TOKEN.to_string(), table).unwrap()
}

// =============================================================================
// Mock Dataset Servers
// =============================================================================

pub fn geocoder_body() -> Value {
    json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [2.290084, 49.897443]},
            "properties": {
                "label": LABEL,
                "citycode": "80021",
                "postcode": "80000",
                "x": X,
                "y": Y
            }
        }]
    })
}

pub async fn mount_geocoder(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(GEOCODER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(geocoder_body()))
        .mount(server)
        .await;
}

/// Diagnostic API answering `results` to every query, expecting `calls` hits.
pub async fn mount_diagnostics(server: &MockServer, results: Value, calls: u64) {
    Mock::given(method("GET"))
        .and(path(DIAGNOSTICS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": results.as_array().map_or(0, |r| r.len()),
            "results": results
        })))
        .expect(calls)
        .mount(server)
        .await;
}

pub fn diagnostic(numero: &str, surface: f64, etiquette: &str) -> Value {
    json!({
        "numero_dpe": numero,
        "adresse_ban": LABEL,
        "surface_habitable_logement": surface,
        "etiquette_dpe": etiquette,
        "_score": 12.5
    })
}

// =============================================================================
// Transaction Tables
// =============================================================================

pub const TABLE_HEADER: &str = "id_mutation,date_mutation,id_parcelle,surface_reelle_bati,nombre_pieces_principales,surface_terrain,adresse_complete";

/// Table whose rows all sit at `NORMALIZED`.
///
/// Each entry is `(date_mutation, surface_reelle_bati, nombre_pieces_principales, surface_terrain)`.
pub fn table(rows: &[(&str, &str, &str, &str)]) -> CsvTransactionTable {
    let mut csv = format!("{}\n", TABLE_HEADER);
    for (i, (date, bati, pieces, terrain)) in rows.iter().enumerate() {
        csv.push_str(&format!(
            "M{},{},80021000AB0012,{},{},{},{}\n",
            i, date, bati, pieces, terrain, NORMALIZED
        ));
    }
    CsvTransactionTable::from_reader(csv.as_bytes()).unwrap()
}

pub fn empty_table() -> CsvTransactionTable {
    table(&[])
}

// =============================================================================
// Choosers
// =============================================================================

/// Answers from a script and records every question asked.
#[derive(Debug, Default)]
pub struct Scripted {
    answers: Vec<Option<usize>>,
    pub calls: Vec<(String, Vec<FieldValue>)>,
}

impl Scripted {
    pub fn new(answers: &[Option<usize>]) -> Self {
        Self {
            answers: answers.iter().rev().copied().collect(),
            calls: Vec::new(),
        }
    }
}

impl Chooser for Scripted {
    fn choose(&mut self, dimension: &str, options: &[FieldValue]) -> Option<usize> {
        self.calls.push((dimension.to_string(), options.to_vec()));
        self.answers.pop().unwrap_or(None)
    }
}
