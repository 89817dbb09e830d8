//! Transaction (DVF) table configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Local, pre-cleaned DVF table and how its rows are reduced and reconciled
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionsConfig {
    /// CSV produced by `fiche prepare`
    pub path: PathBuf,
    /// Disambiguation dimensions, highest priority first
    pub dimensions: Vec<String>,
    /// Fields copied into the reconciled record
    pub fields: Vec<String>,
}

impl Default for TransactionsConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("dvf_ok.csv"),
            dimensions: vec!["date_mutation".to_string()],
            fields: vec![
                "surface_reelle_bati".to_string(),
                "nombre_pieces_principales".to_string(),
                "surface_terrain".to_string(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transactions_config_defaults() {
        let config = TransactionsConfig::default();
        assert_eq!(config.path, PathBuf::from("dvf_ok.csv"));
        assert_eq!(config.dimensions, vec!["date_mutation"]);
        assert_eq!(config.fields.len(), 3);
    }

    #[test]
    fn test_transactions_config_no_dimensions() {
        let config: TransactionsConfig = toml::from_str("dimensions = []").unwrap();
        assert!(config.dimensions.is_empty());
        assert_eq!(config.fields.len(), 3);
    }
}
