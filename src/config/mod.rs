//! Configuration module for fiche
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`FICHE_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use fiche::config::FicheConfig;
//!
//! let config = FicheConfig::default();
//! assert_eq!(config.diagnostics.limit, 10);
//!
//! let toml = r#"
//! [diagnostics]
//! limit = 5
//! "#;
//! let config: FicheConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.diagnostics.limit, 5);
//! ```

pub mod diagnostics;
pub mod error;
pub mod geocoder;
pub mod logging;
pub mod transactions;

pub use diagnostics::{DiagnosticQuery, DiagnosticsConfig};
pub use error::ConfigError;
pub use geocoder::{GeocoderConfig, ParcelConfig};
pub use logging::{LogFormat, LoggingConfig};
pub use transactions::TransactionsConfig;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Upper bound on rows fetched from the diagnostic dataset.
pub const MAX_DIAGNOSTIC_LIMIT: u32 = 100;

/// Unified configuration for a lookup session.
///
/// Passed explicitly to the client constructors; nothing is read from
/// process-wide state after startup.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FicheConfig {
    pub geocoder: GeocoderConfig,
    pub parcels: ParcelConfig,
    pub diagnostics: DiagnosticsConfig,
    pub transactions: TransactionsConfig,
    pub logging: LoggingConfig,
}

impl FicheConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supports FICHE_* environment variables for common settings.
    /// Invalid values are silently ignored (defaults are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(level) = std::env::var("FICHE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("FICHE_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        if let Ok(path) = std::env::var("FICHE_DVF_PATH") {
            self.transactions.path = path.into();
        }

        if let Ok(limit) = std::env::var("FICHE_DPE_LIMIT") {
            if let Ok(l) = limit.parse() {
                self.diagnostics.limit = l;
            }
        }
        if let Ok(query) = std::env::var("FICHE_DPE_QUERY") {
            if let Ok(q) = query.parse() {
                self.diagnostics.query = q;
            }
        }

        if let Ok(url) = std::env::var("FICHE_GEOCODER_URL") {
            self.geocoder.url = url;
        }
        if let Ok(url) = std::env::var("FICHE_DIAGNOSTICS_URL") {
            self.diagnostics.url = url;
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let urls = [
            ("geocoder.url", &self.geocoder.url),
            ("parcels.url", &self.parcels.url),
            ("diagnostics.url", &self.diagnostics.url),
        ];
        for (field, url) in urls {
            if url.trim().is_empty() {
                return Err(validation(field, "URL cannot be empty"));
            }
        }

        let timeouts = [
            ("geocoder.timeout_seconds", self.geocoder.timeout_seconds),
            ("parcels.timeout_seconds", self.parcels.timeout_seconds),
            ("diagnostics.timeout_seconds", self.diagnostics.timeout_seconds),
        ];
        for (field, timeout) in timeouts {
            if timeout == 0 {
                return Err(validation(field, "timeout must be non-zero"));
            }
        }

        if self.diagnostics.limit == 0 || self.diagnostics.limit > MAX_DIAGNOSTIC_LIMIT {
            return Err(validation(
                "diagnostics.limit",
                &format!("must be between 1 and {}", MAX_DIAGNOSTIC_LIMIT),
            ));
        }

        if self.diagnostics.token_env.trim().is_empty() && self.diagnostics.token.is_none() {
            return Err(validation(
                "diagnostics.token_env",
                "set a token variable name or an inline token",
            ));
        }

        if self.transactions.fields.is_empty() {
            return Err(validation(
                "transactions.fields",
                "at least one field must be tracked",
            ));
        }

        let names = [
            ("transactions.dimensions", &self.transactions.dimensions),
            ("transactions.fields", &self.transactions.fields),
            ("diagnostics.dimensions", &self.diagnostics.dimensions),
            ("diagnostics.fields", &self.diagnostics.fields),
        ];
        for (field, list) in names {
            if let Some(i) = list.iter().position(|name| name.trim().is_empty()) {
                return Err(validation(
                    &format!("{}[{}]", field, i),
                    "field name cannot be blank",
                ));
            }
        }

        Ok(())
    }

    /// Resolve the diagnostic API bearer token.
    ///
    /// The environment variable named by `diagnostics.token_env` wins over
    /// an inline `diagnostics.token`. Without either, the tool cannot run.
    pub fn resolve_token(&self) -> Result<String, ConfigError> {
        let from_env = std::env::var(&self.diagnostics.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty());
        let inline = self
            .diagnostics
            .token
            .clone()
            .filter(|t| !t.trim().is_empty());

        from_env.or(inline).ok_or_else(|| {
            ConfigError::MissingField(format!(
                "diagnostic API token (set ${} or diagnostics.token)",
                self.diagnostics.token_env
            ))
        })
    }
}

fn validation(field: &str, message: &str) -> ConfigError {
    ConfigError::Validation {
        field: field.to_string(),
        message: message.to_string(),
    }
}
