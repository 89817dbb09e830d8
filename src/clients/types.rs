//! Data returned by the external sources.

use crate::record::CandidateSet;
use serde::Serialize;

use super::ClientError;

/// A geocoded address.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoLocation {
    /// Normalized label from the geocoder, e.g. "8 Boulevard du Port 80000 Amiens"
    pub label: String,
    pub latitude: f64,
    pub longitude: f64,
    /// INSEE city code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    /// Projected (Lambert-93) easting
    pub x: f64,
    /// Projected (Lambert-93) northing
    pub y: f64,
}

/// Result of a diagnostic fetch.
///
/// "Nothing on file" and "the fetch failed" are kept apart so the caller
/// can decide whether a retry makes sense.
#[derive(Debug)]
pub enum DiagnosticFetch {
    Found(CandidateSet),
    NoneOnFile,
    Failed(ClientError),
}
