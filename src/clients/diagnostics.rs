//! ADEME `dpe03existant` dataset client.

use super::{read_json, ClientError, DiagnosticFetch, DiagnosticSource};
use crate::config::DiagnosticsConfig;
use crate::record::{CandidateRow, CandidateSet, FieldValue, Source};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

const SORT_FIELD: &str = "date_derniere_modification_dpe";

/// Internal columns added by the dataset API. `_geopoint` is kept.
fn is_internal_column(name: &str) -> bool {
    name.starts_with('_') && name != "_geopoint"
}

/// Fetches energy-performance diagnostics with bearer authentication.
pub struct AdemeDiagnostics {
    url: String,
    token: String,
    limit: u32,
    timeout: Duration,
    /// Comma-separated `select`, or `None` to get every column
    select: Option<String>,
    client: Arc<Client>,
}

impl AdemeDiagnostics {
    pub fn new(config: &DiagnosticsConfig, token: String, client: Arc<Client>) -> Self {
        let select = (!config.include_all_columns).then(|| {
            let mut columns: Vec<&str> = Vec::new();
            for name in config.fields.iter().chain(&config.dimensions) {
                if !columns.contains(&name.as_str()) {
                    columns.push(name);
                }
            }
            columns.join(",")
        });

        Self {
            url: config.url.clone(),
            token,
            limit: config.limit,
            timeout: Duration::from_secs(config.timeout_seconds),
            select,
            client,
        }
    }

    async fn fetch(&self, filter: &[(&str, String)]) -> Result<CandidateSet, ClientError> {
        let mut params: Vec<(&str, String)> = vec![
            ("sort", SORT_FIELD.to_string()),
            ("size", self.limit.to_string()),
        ];
        if let Some(select) = &self.select {
            params.push(("select", select.clone()));
        }
        params.extend_from_slice(filter);

        let response = self
            .client
            .get(&self.url)
            .bearer_auth(&self.token)
            .query(&params)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ClientError::from_transport(e, self.timeout))?;

        let body = read_json(response, self.timeout).await?;
        let results = body
            .get("results")
            .and_then(|r| r.as_array())
            .ok_or_else(|| ClientError::InvalidResponse("missing 'results' array".to_string()))?;

        let rows = results
            .iter()
            .map(|line| {
                let object = line.as_object().ok_or_else(|| {
                    ClientError::InvalidResponse("result line is not an object".to_string())
                })?;
                let mut row = CandidateRow::new(Source::Dpe);
                for (key, value) in object.iter().filter(|(k, _)| !is_internal_column(k)) {
                    row.insert(key.as_str(), FieldValue::from_json(value));
                }
                Ok(row)
            })
            .collect::<Result<Vec<_>, ClientError>>()?;

        Ok(CandidateSet::from_rows(Source::Dpe, rows))
    }

    fn into_fetch(result: Result<CandidateSet, ClientError>) -> DiagnosticFetch {
        match result {
            Ok(set) if set.is_empty() => DiagnosticFetch::NoneOnFile,
            Ok(set) => {
                tracing::debug!(rows = set.len(), "Diagnostics fetched");
                DiagnosticFetch::Found(set)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Diagnostic fetch failed");
                DiagnosticFetch::Failed(e)
            }
        }
    }
}

#[async_trait]
impl DiagnosticSource for AdemeDiagnostics {
    async fn by_coordinates(&self, x: f64, y: f64) -> DiagnosticFetch {
        let filter = [
            ("coordonnee_cartographique_x_ban_eq", x.to_string()),
            ("coordonnee_cartographique_y_ban_eq", y.to_string()),
        ];
        Self::into_fetch(self.fetch(&filter).await)
    }

    async fn by_address(&self, normalized: &str) -> DiagnosticFetch {
        let filter = [
            ("q", normalized.to_uppercase()),
            ("q_fields", "adresse_ban".to_string()),
        ];
        Self::into_fetch(self.fetch(&filter).await)
    }
}
