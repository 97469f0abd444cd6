//! Error types for the Bucky Box client
//!
//! API failures are classified from the HTTP status: 404 becomes
//! [`Error::NotFound`], any other non-success status becomes
//! [`Error::Response`]. Both carry a [`ResponseError`], so callers that only
//! care about "the API said no" can use [`Error::response_error`].

use buckybox_transport::TransportError;
use thiserror::Error;

use crate::coerce::CoercionError;
use crate::value::Value;

/// Result type alias for operations that can fail with a Bucky Box client error.
pub type Result<T> = std::result::Result<T, Error>;

/// Statuses treated as success. Anything else is classified as an error.
pub const SUCCESS_STATUSES: [u16; 2] = [200, 201];

/// Message used when an error response has no body.
pub const EMPTY_RESPONSE_MESSAGE: &str = "Empty response";

/// An error status returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Error {status} - {message}")]
pub struct ResponseError {
    /// HTTP status code
    pub status: u16,
    /// Message derived from the response body
    pub message: String,
}

impl ResponseError {
    /// Whether this is a 404.
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

/// Main error type for the Bucky Box client.
#[derive(Debug, Error)]
pub enum Error {
    /// The API returned 404.
    #[error(transparent)]
    NotFound(ResponseError),

    /// The API returned a status other than 200, 201 or 404.
    #[error(transparent)]
    Response(ResponseError),

    /// An envelope was asked for a key the response does not contain.
    #[error("undefined attribute `{attribute}`")]
    Attribute {
        /// The missing key
        attribute: String,
    },

    /// An envelope was built from something other than an object.
    #[error("{0} must be an object")]
    Argument(String),

    /// An envelope attribute holds a different JSON type than requested.
    #[error("attribute `{attribute}` is {found}, not {expected}")]
    TypeMismatch {
        /// The attribute looked up
        attribute: String,
        /// What the caller asked for
        expected: &'static str,
        /// What the response holds
        found: &'static str,
    },

    /// A query result had a different shape than the call expects.
    #[error("expected {expected} response, got {found}")]
    UnexpectedResponse {
        /// Shape the call expects
        expected: &'static str,
        /// Shape the response has
        found: &'static str,
    },

    /// A type map named an attribute the response does not contain.
    #[error("cannot coerce missing attribute `{attribute}`")]
    MissingAttribute {
        /// The mapped attribute
        attribute: String,
    },

    /// A type map coercion rejected an attribute's value.
    #[error("cannot coerce attribute `{attribute}`: {source}")]
    Coercion {
        /// The mapped attribute
        attribute: String,
        /// Why the value was rejected
        #[source]
        source: CoercionError,
    },

    /// A success response carried a body that is not JSON.
    #[error("Failed to parse API response: {0}")]
    Decode(#[source] serde_json::Error),

    /// Serialization error while building a request.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The HTTP round trip itself failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Invalid request parameters.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid HTTP header name.
    #[error("Invalid HTTP header name: {0}")]
    InvalidHeaderName(String),

    /// Invalid HTTP header value.
    #[error("Invalid HTTP header value: {0}")]
    InvalidHeaderValue(String),

    /// The configured environment is not one of the known endpoints.
    #[error("Unknown environment `{0}` (expected production, staging, development or test)")]
    UnknownEnvironment(String),

    /// Missing required configuration.
    #[error("Missing required configuration: {0}")]
    MissingConfig(String),
}

impl Error {
    /// Classify an error response.
    ///
    /// The message comes from the body's `message` field when there is one,
    /// otherwise from the whole body, or `"Empty response"` when the body is
    /// empty or `null`.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let error = ResponseError {
            status,
            message: response_message(body),
        };

        if error.is_not_found() {
            Error::NotFound(error)
        } else {
            Error::Response(error)
        }
    }

    /// `Ok(())` for 200 and 201, the classified error otherwise.
    pub fn check_status(status: u16, body: &[u8]) -> Result<()> {
        if SUCCESS_STATUSES.contains(&status) {
            Ok(())
        } else {
            Err(Self::from_response(status, body))
        }
    }

    /// The API error behind this failure, for both 404 and other statuses.
    pub fn response_error(&self) -> Option<&ResponseError> {
        match self {
            Error::NotFound(e) | Error::Response(e) => Some(e),
            _ => None,
        }
    }

    /// Whether the API returned 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// HTTP status of an API error.
    pub fn status(&self) -> Option<u16> {
        self.response_error().map(|e| e.status)
    }
}

fn response_message(body: &[u8]) -> String {
    match Value::parse(body) {
        Ok(Value::Null) => EMPTY_RESPONSE_MESSAGE.to_string(),
        Ok(Value::Object(object)) => match object.get("message") {
            Some(Value::String(message)) => message.clone(),
            Some(message) if !message.is_null() => message.dump(),
            _ => Value::Object(object).dump(),
        },
        Ok(other) => match other {
            Value::String(text) => text,
            other => other.dump(),
        },
        Err(_) => String::from_utf8_lossy(body).trim().to_string(),
    }
}
