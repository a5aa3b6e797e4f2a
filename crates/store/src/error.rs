use vizfolio_core::error::CoreError;

/// Errors from the remote store boundary.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The store returned a non-2xx status code.
    #[error("Store API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The response could not be decoded (bad JSON, bad `Content-Range`).
    #[error("Malformed store response: {0}")]
    Decode(String),

    /// A row decoded but failed validation at the boundary.
    #[error("Invalid {resource} row: {source}")]
    InvalidRow {
        resource: &'static str,
        #[source]
        source: CoreError,
    },

    /// The store is not reachable or not configured.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Decode(err.to_string())
    }
}
