//! Transport trait and the plain-data request/response types it exchanges.

use crate::error::Result;
use async_trait::async_trait;
use http::{HeaderMap, HeaderName, HeaderValue, Method};

/// Plain-data HTTP request handed to a transport
///
/// Represents one fully-built HTTP request: the URL already carries its
/// query string and the body, if any, is already encoded.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method (GET, POST, etc.)
    pub method: Method,

    /// Request URL
    pub url: String,

    /// Request headers
    pub headers: HeaderMap,

    /// Request body (optional)
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Create a new HTTP request
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Replace all request headers
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Add a header to the request
    pub fn with_header(mut self, key: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(key, value);
        self
    }

    /// Set the request body
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Set the request body from string
    pub fn with_text_body(mut self, text: impl Into<String>) -> Self {
        self.body = Some(text.into().into_bytes());
        self
    }

    /// Size of the body in bytes, if there is one
    pub fn body_len(&self) -> Option<usize> {
        self.body.as_ref().map(Vec::len)
    }
}

/// HTTP response
///
/// Represents an HTTP response received from the server. Error statuses are
/// not transport failures and arrive here like any other response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,

    /// Response headers
    pub headers: HeaderMap,

    /// Response body
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Create a new HTTP response
    pub fn new(status: u16, headers: HeaderMap, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Shorthand for a response with no headers
    pub fn with_body(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self::new(status, HeaderMap::new(), body.into())
    }

    /// Check if response is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get the response body as a string, replacing invalid UTF-8
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parse response body as JSON
    ///
    /// # Errors
    ///
    /// Returns an error if the response body cannot be parsed as valid JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Get a header value by name (case-insensitive)
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Performs HTTP round trips on behalf of the API client.
///
/// Implementations must be cheap to share between tasks; the client holds one
/// behind an `Arc` and calls it concurrently.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send an HTTP request and receive a response
    async fn send_http(&self, request: HttpRequest) -> Result<HttpResponse>;

    /// Short name used in log events
    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_success_range() {
        assert!(HttpResponse::with_body(200, "").is_success());
        assert!(HttpResponse::with_body(204, "").is_success());
        assert!(!HttpResponse::with_body(404, "").is_success());
        assert!(!HttpResponse::with_body(500, "").is_success());
    }

    #[test]
    fn test_response_json() {
        let response = HttpResponse::with_body(200, r#"{"name":"Joe"}"#);
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["name"], "Joe");
    }

    #[test]
    fn test_response_header_lookup_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        let response = HttpResponse::new(200, headers, Vec::new());
        assert_eq!(response.get_header("Content-Type"), Some("application/json"));
        assert_eq!(response.get_header("x-missing"), None);
    }

    #[test]
    fn test_request_body_len() {
        let request = HttpRequest::new(Method::POST, "https://example.com").with_text_body("{}");
        assert_eq!(request.body_len(), Some(2));
        assert_eq!(HttpRequest::new(Method::GET, "https://example.com").body_len(), None);
    }
}
