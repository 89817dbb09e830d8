//! External data sources.
//!
//! Each source sits behind a small trait so the query pipeline can be driven
//! by the real HTTP clients, by `wiremock` servers in tests, or by in-memory
//! fakes. Transport and decoding errors are mapped to [`ClientError`] inside
//! the implementations.

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

pub mod diagnostics;
pub mod error;
pub mod geocoder;
pub mod parcel;
pub mod transactions;
pub mod types;

pub use diagnostics::AdemeDiagnostics;
pub use error::ClientError;
pub use geocoder::BanGeocoder;
pub use parcel::GeoplateformeParcels;
pub use transactions::CsvTransactionTable;
pub use types::{DiagnosticFetch, GeoLocation};

use crate::record::CandidateSet;

/// Address geocoding.
#[async_trait]
pub trait GeoLookup: Send + Sync {
    /// Resolve `address` to its best match.
    ///
    /// Returns [`ClientError::NotFound`] when the service matches nothing.
    async fn lookup(&self, address: &str) -> Result<GeoLocation, ClientError>;
}

/// Cadastral parcel ids around a point.
#[async_trait]
pub trait ParcelLookup: Send + Sync {
    async fn parcels_at(&self, longitude: f64, latitude: f64) -> Result<Vec<String>, ClientError>;
}

/// Energy-performance diagnostics.
///
/// Never returns an error directly: failures are reported as
/// [`DiagnosticFetch::Failed`] so they can be told apart from an empty result.
#[async_trait]
pub trait DiagnosticSource: Send + Sync {
    /// Exact match on projected BAN coordinates.
    async fn by_coordinates(&self, x: f64, y: f64) -> DiagnosticFetch;

    /// Full-text match on a normalized address.
    async fn by_address(&self, normalized: &str) -> DiagnosticFetch;
}

/// Recorded property transactions, looked up by normalized address.
pub trait TransactionSource: Send + Sync {
    /// Matching rows, possibly none.
    fn by_address(&self, normalized: &str) -> CandidateSet;
}

/// Shared HTTP client. Per-request timeouts are set by each source.
pub fn build_http_client() -> Result<Arc<Client>, ClientError> {
    Client::builder()
        .user_agent(concat!("fiche/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(5))
        .build()
        .map(Arc::new)
        .map_err(|e| ClientError::Network(e.to_string()))
}

/// Read a JSON body, mapping HTTP and decoding failures.
pub(crate) async fn read_json(
    response: reqwest::Response,
    timeout: Duration,
) -> Result<serde_json::Value, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::Upstream {
            status: status.as_u16(),
            message: if body.is_empty() {
                status.to_string()
            } else {
                body
            },
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| ClientError::from_transport(e, timeout))?;

    serde_json::from_str(&body).map_err(|e| ClientError::InvalidResponse(e.to_string()))
}
