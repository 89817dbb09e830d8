//! Geocoder and parcel lookup configuration

use serde::{Deserialize, Serialize};

/// Address geocoder (Base Adresse Nationale search endpoint)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub url: String,
    pub timeout_seconds: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            url: "https://api-adresse.data.gouv.fr/search/".to_string(),
            timeout_seconds: 5,
        }
    }
}

/// Reverse lookup of cadastral parcels from coordinates
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParcelConfig {
    pub enabled: bool,
    pub url: String,
    pub limit: u32,
    pub timeout_seconds: u64,
}

impl Default for ParcelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: "https://data.geopf.fr/geocodage/reverse".to_string(),
            limit: 3,
            timeout_seconds: 5,
        }
    }
}
