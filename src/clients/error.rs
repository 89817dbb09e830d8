//! Error types for client operations.

use thiserror::Error;

/// Errors raised at the boundary of an external data source.
///
/// Transport failures are converted into these variants inside each client,
/// so nothing from `reqwest` or `csv` reaches the core.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Network connectivity error (DNS, connection refused, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded deadline.
    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    /// Service returned an error response (4xx, 5xx).
    #[error("Service error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Response doesn't match the expected format.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The service answered but matched nothing.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Local table could not be read or has the wrong shape.
    #[error("Table error: {0}")]
    Table(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Map a `reqwest` send/read error, reporting `timeout` for deadline hits.
    pub(crate) fn from_transport(err: reqwest::Error, timeout: std::time::Duration) -> Self {
        if err.is_timeout() {
            ClientError::Timeout(timeout.as_millis() as u64)
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<csv::Error> for ClientError {
    fn from(err: csv::Error) -> Self {
        ClientError::Table(err.to_string())
    }
}
