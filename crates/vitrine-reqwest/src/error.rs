//! Error types for the reqwest upload client.

use thiserror::Error;

/// Result type alias for reqwest operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for reqwest operations.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// Response body could not be decoded.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Configured API URL is invalid.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
    /// The endpoint answered with a non-success status.
    #[error("Upload endpoint returned {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },
}

impl From<Error> for vitrine_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Reqwest(e) => {
                if e.is_timeout() {
                    vitrine_core::Error::timeout()
                        .with_message(e.to_string())
                        .with_source(e)
                } else if e.is_connect() {
                    vitrine_core::Error::network_error()
                        .with_message("Connection failed")
                        .with_source(e)
                } else {
                    vitrine_core::Error::network_error()
                        .with_message(e.to_string())
                        .with_source(e)
                }
            }
            Error::Serde(e) => vitrine_core::Error::serialization()
                .with_message(e.to_string())
                .with_source(e),
            Error::Url(e) => vitrine_core::Error::configuration()
                .with_message(e.to_string())
                .with_source(e),
            Error::Status { status } => {
                let message = format!("Upload endpoint returned {status}");
                match status {
                    401 | 403 => vitrine_core::Error::authentication().with_message(message),
                    500.. => vitrine_core::Error::service_unavailable().with_message(message),
                    _ => vitrine_core::Error::external_error().with_message(message),
                }
            }
        }
    }
}
