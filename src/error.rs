//! Error taxonomy for upstream metadata-service calls.

use thiserror::Error;

/// Transport, status, and decoding failures from the metadata service.
///
/// The pipeline treats every variant the same way (the failing search
/// strategy or probe simply produced nothing), so the distinction exists for
/// logging and for callers using the client directly.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request to {endpoint} failed: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned status {status}")]
    Status { endpoint: String, status: u16 },

    #[error("could not decode {endpoint} response: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}
