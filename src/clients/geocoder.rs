//! Base Adresse Nationale geocoder.

use super::{read_json, ClientError, GeoLocation, GeoLookup};
use crate::config::GeocoderConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Geocodes addresses through the BAN `/search/` endpoint.
pub struct BanGeocoder {
    url: String,
    timeout: Duration,
    client: Arc<Client>,
}

impl BanGeocoder {
    pub fn new(config: &GeocoderConfig, client: Arc<Client>) -> Self {
        Self {
            url: config.url.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
            client,
        }
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    geometry: Geometry,
    properties: Properties,
}

#[derive(Deserialize)]
struct Geometry {
    /// `[longitude, latitude]`
    coordinates: (f64, f64),
}

#[derive(Deserialize)]
struct Properties {
    label: String,
    citycode: Option<String>,
    postcode: Option<String>,
    x: Option<f64>,
    y: Option<f64>,
}

impl Feature {
    fn into_location(self) -> Result<GeoLocation, ClientError> {
        let (longitude, latitude) = self.geometry.coordinates;
        let props = self.properties;
        let (Some(x), Some(y)) = (props.x, props.y) else {
            return Err(ClientError::InvalidResponse(format!(
                "no projected coordinates for '{}'",
                props.label
            )));
        };

        Ok(GeoLocation {
            label: props.label,
            latitude,
            longitude,
            city_code: props.citycode,
            postal_code: props.postcode,
            x,
            y,
        })
    }
}

#[async_trait]
impl GeoLookup for BanGeocoder {
    async fn lookup(&self, address: &str) -> Result<GeoLocation, ClientError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("q", address), ("limit", "1")])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ClientError::from_transport(e, self.timeout))?;

        let body = read_json(response, self.timeout).await?;
        let search: SearchResponse = serde_json::from_value(body)
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        let feature = search
            .features
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::NotFound(format!("no address matches '{}'", address)))?;

        let location = feature.into_location()?;
        tracing::debug!(label = %location.label, x = location.x, y = location.y, "Address geocoded");
        Ok(location)
    }
}
