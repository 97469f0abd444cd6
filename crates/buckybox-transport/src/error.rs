//! Transport error types

use thiserror::Error;

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

/// Errors that can occur while performing an HTTP round trip.
///
/// A transport error means no HTTP status was obtained. Responses with an
/// error status are returned as regular [`HttpResponse`](crate::HttpResponse)
/// values and classified by the caller.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request/response error
    #[error("HTTP error: {0}")]
    Http(String),

    /// Connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Timeout error
    #[error("Timeout")]
    Timeout,

    /// The request used a method the transport does not speak
    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Transport could not be configured
    #[error("Transport configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
