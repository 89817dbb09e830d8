//! Cadastral parcel reverse lookup on the Géoplateforme.

use super::{read_json, ClientError, ParcelLookup};
use crate::config::ParcelConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

pub struct GeoplateformeParcels {
    url: String,
    limit: u32,
    timeout: Duration,
    client: Arc<Client>,
}

impl GeoplateformeParcels {
    pub fn new(config: &ParcelConfig, client: Arc<Client>) -> Self {
        Self {
            url: config.url.clone(),
            limit: config.limit,
            timeout: Duration::from_secs(config.timeout_seconds),
            client,
        }
    }
}

#[derive(Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    features: Vec<ParcelFeature>,
}

#[derive(Deserialize)]
struct ParcelFeature {
    #[serde(default)]
    properties: ParcelProperties,
}

#[derive(Deserialize, Default)]
struct ParcelProperties {
    id: Option<String>,
}

#[async_trait]
impl ParcelLookup for GeoplateformeParcels {
    async fn parcels_at(&self, longitude: f64, latitude: f64) -> Result<Vec<String>, ClientError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("lon", longitude.to_string()),
                ("lat", latitude.to_string()),
                ("index", "parcel".to_string()),
                ("limit", self.limit.to_string()),
                ("returntruegeometry", "false".to_string()),
            ])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ClientError::from_transport(e, self.timeout))?;

        let body = read_json(response, self.timeout).await?;
        let reverse: ReverseResponse = serde_json::from_value(body)
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        if reverse.features.is_empty() {
            return Err(ClientError::NotFound(format!(
                "no parcel at {}, {}",
                longitude, latitude
            )));
        }

        Ok(reverse
            .features
            .into_iter()
            .filter_map(|f| f.properties.id)
            .collect())
    }
}
