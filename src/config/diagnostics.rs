//! Diagnostic (DPE) dataset configuration

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How diagnostics are looked up for a geocoded address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticQuery {
    /// Exact match on the projected BAN coordinates
    #[default]
    Coordinates,
    /// Full-text match on the normalized BAN address
    Address,
}

impl FromStr for DiagnosticQuery {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "coordinates" => Ok(DiagnosticQuery::Coordinates),
            "address" => Ok(DiagnosticQuery::Address),
            _ => Err(format!("Invalid diagnostic query mode: {}", s)),
        }
    }
}

/// ADEME `dpe03existant` dataset access
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    pub url: String,
    /// Environment variable holding the bearer token
    pub token_env: String,
    /// Inline token, used when `token_env` is unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Maximum rows fetched per query
    pub limit: u32,
    pub timeout_seconds: u64,
    pub query: DiagnosticQuery,
    /// Disambiguation dimensions, highest priority first
    pub dimensions: Vec<String>,
    /// Fields copied into the reconciled record
    pub fields: Vec<String>,
    /// Also copy every other column returned by the dataset
    pub include_all_columns: bool,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            url: "https://data.ademe.fr/data-fair/api/v1/datasets/dpe03existant/lines".to_string(),
            token_env: "ADEME_TOKEN".to_string(),
            token: None,
            limit: 10,
            timeout_seconds: 10,
            query: DiagnosticQuery::Coordinates,
            dimensions: vec![
                "surface_habitable_logement".to_string(),
                "numero_dpe".to_string(),
            ],
            fields: [
                "numero_dpe",
                "adresse_ban",
                "etiquette_dpe",
                "etiquette_ges",
                "date_etablissement_dpe",
                "date_derniere_modification_dpe",
                "conso_5_usages_par_m2_ef",
                "conso_5_usages_par_m2_ep",
                "emission_ges_5_usages_par_m2",
                "annee_construction",
                "type_batiment",
                "nombre_niveau_logement",
                "complement_adresse_logement",
                "surface_habitable_logement",
                "type_installation_chauffage",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            include_all_columns: false,
        }
    }
}
