//! Query dispatch
//!
//! [`QueryDispatcher::query`] turns one logical call into an HTTP request,
//! sends it through the transport, classifies failures, coerces the decoded
//! body and wraps the result. GET results go through the response cache;
//! every other method always hits the transport.

use std::sync::Arc;

use buckybox_transport::{HttpRequest, Transport};
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue, Method};

use crate::cache::{CacheKey, ResponseCache, header_digest};
use crate::clock::Clock;
use crate::coerce::{TypeMap, coerce};
use crate::envelope::ResponseEnvelope;
use crate::error::{Error, Result};
use crate::observability::{
    RequestMetadata, RequestTimer, ResponseMetadata, log_cache_flush, log_cache_hit,
    log_cache_miss, log_cache_store,
};
use crate::params::Params;
use crate::value::Value;

/// Per-call output options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// Wrap results in envelopes (`true`) or return the decoded value (`false`).
    pub as_object: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self { as_object: true }
    }
}

impl QueryOptions {
    /// Options returning the decoded value unwrapped.
    pub fn raw() -> Self {
        Self { as_object: false }
    }
}

/// Result of one query.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// A single object, wrapped.
    Object(ResponseEnvelope),
    /// An array of objects, each wrapped.
    List(Vec<ResponseEnvelope>),
    /// The decoded (and coerced) value, when raw output was requested.
    Raw(Arc<Value>),
}

impl Response {
    /// The single envelope of an object response.
    pub fn into_object(self) -> Result<ResponseEnvelope> {
        match self {
            Response::Object(envelope) => Ok(envelope),
            other => Err(other.unexpected("object")),
        }
    }

    /// The envelopes of an array response.
    pub fn into_list(self) -> Result<Vec<ResponseEnvelope>> {
        match self {
            Response::List(envelopes) => Ok(envelopes),
            other => Err(other.unexpected("array")),
        }
    }

    /// The decoded value of a raw response.
    pub fn into_raw(self) -> Result<Arc<Value>> {
        match self {
            Response::Raw(value) => Ok(value),
            other => Err(other.unexpected("raw value")),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Response::Object(_) => "object",
            Response::List(_) => "array",
            Response::Raw(_) => "raw value",
        }
    }

    fn unexpected(&self, expected: &'static str) -> Error {
        Error::UnexpectedResponse {
            expected,
            found: self.kind(),
        }
    }
}

/// Sends queries for one client and owns its response cache.
pub struct QueryDispatcher {
    base_url: String,
    headers: HeaderMap,
    header_digest: String,
    transport: Arc<dyn Transport>,
    cache: ResponseCache,
}

impl QueryDispatcher {
    /// Create a dispatcher for `base_url` sending `headers` on every call.
    ///
    /// `headers` are fixed for the dispatcher's lifetime; their digest is
    /// part of every cache key.
    pub fn new(
        base_url: &str,
        headers: HeaderMap,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            header_digest: header_digest(&headers),
            headers,
            transport,
            cache: ResponseCache::with_clock(clock),
        }
    }

    /// Base URL every path is appended to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Headers sent with every request.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The response cache.
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Drop every cached response.
    pub fn flush_cache(&self) {
        let entries = self.cache.len();
        self.cache.flush();
        log_cache_flush(entries);
    }

    /// Cache key a GET of `path` with `params` would use.
    ///
    /// Returns `None` for JSON bodies, which are never sent on GET.
    pub fn cache_key(&self, path: &str, params: &Params) -> Option<CacheKey> {
        params
            .query()
            .map(|query| CacheKey::new(self.header_digest.as_str(), path, query))
    }

    /// Run one logical call.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] / [`Error::Response`] for non-success statuses
    /// - [`Error::Transport`] when no response was obtained
    /// - [`Error::Decode`] when a success body is not JSON
    /// - [`Error::MissingAttribute`] / [`Error::Coercion`] from the type map
    /// - [`Error::Argument`] when wrapping a non-object result
    pub async fn query(
        &self,
        method: Method,
        path: &str,
        params: Params,
        options: QueryOptions,
        types: &TypeMap,
    ) -> Result<Response> {
        let value = if method == Method::GET {
            self.query_cached(path, &params, types).await?
        } else {
            Arc::new(self.query_fresh(&method, path, &params, types).await?)
        };

        wrap(value, options)
    }

    async fn query_cached(&self, path: &str, params: &Params, types: &TypeMap) -> Result<Arc<Value>> {
        let key = self.cache_key(path, params).ok_or_else(|| {
            Error::InvalidRequest("GET requests take query parameters, not a JSON body".to_string())
        })?;

        if let Some(value) = self.cache.get(&key) {
            log_cache_hit(&key);
            return Ok(value);
        }
        log_cache_miss(&key);

        let generation = self.cache.generation();
        let value = Arc::new(self.query_fresh(&Method::GET, path, params, types).await?);
        if self.cache.put_if_generation(key.clone(), Arc::clone(&value), generation) {
            log_cache_store(&key);
        } else {
            tracing::debug!(key = %key, "cache flushed during request, result not stored");
        }

        Ok(value)
    }

    async fn query_fresh(
        &self,
        method: &Method,
        path: &str,
        params: &Params,
        types: &TypeMap,
    ) -> Result<Value> {
        let request = self.build_request(method, path, params)?;
        let metadata =
            RequestMetadata::new(method.as_str(), path).with_body_size(request.body_len());
        metadata.log_request();

        let timer = RequestTimer::start();
        let response = self.transport.send_http(request).await.map_err(|err| {
            tracing::warn!(
                method = %metadata.method,
                path = %metadata.path,
                transport = self.transport.name(),
                error = %err,
                "HTTP transport failed"
            );
            Error::from(err)
        })?;
        let response_metadata =
            ResponseMetadata::new(response.status, response.body.len(), timer.elapsed());

        if let Err(err) = Error::check_status(response.status, &response.body) {
            response_metadata.log_error(&metadata, &err.to_string());
            return Err(err);
        }
        response_metadata.log_success(&metadata);

        let value = Value::parse(&response.body).map_err(Error::Decode)?;
        coerce(value, types)
    }

    /// Build the HTTP request for one call without sending it.
    pub fn build_request(&self, method: &Method, path: &str, params: &Params) -> Result<HttpRequest> {
        let mut url = format!("{}{}", self.base_url, path);

        let request = match params {
            Params::Pairs(pairs) if *method == Method::GET => {
                let query = pairs.to_query();
                if !query.is_empty() {
                    url.push('?');
                    url.push_str(&query);
                }
                HttpRequest::new(method.clone(), url).with_headers(self.headers.clone())
            }
            Params::Pairs(pairs) => {
                let request =
                    HttpRequest::new(method.clone(), url).with_headers(self.headers.clone());
                if pairs.is_empty() {
                    request
                } else {
                    request
                        .with_header(
                            CONTENT_TYPE,
                            HeaderValue::from_static("application/x-www-form-urlencoded"),
                        )
                        .with_text_body(pairs.to_query())
                }
            }
            Params::Json(_) if *method == Method::GET => {
                return Err(Error::InvalidRequest(
                    "GET requests take query parameters, not a JSON body".to_string(),
                ));
            }
            Params::Json(body) => HttpRequest::new(method.clone(), url)
                .with_headers(self.headers.clone())
                .with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .with_text_body(body.clone()),
        };

        Ok(request)
    }
}

impl std::fmt::Debug for QueryDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryDispatcher")
            .field("base_url", &self.base_url)
            .field("transport", &self.transport.name())
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

/// Shape a decoded value per `options`.
fn wrap(value: Arc<Value>, options: QueryOptions) -> Result<Response> {
    if !options.as_object {
        return Ok(Response::Raw(value));
    }

    let value = Arc::try_unwrap(value).unwrap_or_else(|shared| shared.as_ref().clone());
    match value {
        Value::Array(items) => ResponseEnvelope::wrap_all(items).map(Response::List),
        other => ResponseEnvelope::new(other).map(Response::Object),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::money::Money;
    use crate::params::QueryParams;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use buckybox_transport::{HttpResponse, TransportError};
    use std::sync::Mutex;

    /// Replies with a fixed response and records every request.
    struct StubTransport {
        status: u16,
        body: &'static str,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl StubTransport {
        fn new(status: u16, body: &'static str) -> Arc<Self> {
            Arc::new(Self {
                status,
                body,
                requests: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn last(&self) -> HttpRequest {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn send_http(
            &self,
            request: HttpRequest,
        ) -> std::result::Result<HttpResponse, TransportError> {
            self.requests.lock().unwrap().push(request);
            Ok(HttpResponse::with_body(self.status, self.body))
        }

        fn name(&self) -> &'static str {
            "stub"
        }
    }

    fn dispatcher(transport: Arc<StubTransport>) -> (QueryDispatcher, ManualClock) {
        let clock = ManualClock::new(1_000);
        let mut headers = HeaderMap::new();
        headers.insert("api-key", HeaderValue::from_static("key"));
        let dispatcher = QueryDispatcher::new(
            "https://api.example.test/v1/",
            headers,
            transport,
            Arc::new(clock.clone()),
        );
        (dispatcher, clock)
    }

    fn price_types() -> TypeMap {
        TypeMap::new().with("price", Money::coerce)
    }

    #[tokio::test]
    async fn test_get_builds_url_with_canonical_query() {
        let transport = StubTransport::new(200, "[]");
        let (dispatcher, _) = dispatcher(transport.clone());

        let params = QueryParams::new().with("embed", "images").with("a", "1");
        dispatcher
            .query(Method::GET, "/boxes", params.into(), QueryOptions::default(), &TypeMap::new())
            .await
            .unwrap();

        let request = transport.last();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.url, "https://api.example.test/v1/boxes?a=1&embed=images");
        assert_eq!(request.headers.get("api-key").unwrap(), "key");
        assert!(request.body.is_none());
    }

    #[tokio::test]
    async fn test_object_result_is_wrapped_and_coerced() {
        let transport = StubTransport::new(200, r#"{"id":1,"price":"12.50"}"#);
        let (dispatcher, _) = dispatcher(transport);

        let envelope = dispatcher
            .query(Method::GET, "/boxes/1", Params::none(), QueryOptions::default(), &price_types())
            .await
            .unwrap()
            .into_object()
            .unwrap();

        assert_eq!(envelope.get_money("price").unwrap(), Money::from_cents(1250));
        assert_eq!(envelope.get_i64("id").unwrap(), 1);
    }

    #[tokio::test]
    async fn test_array_result_wraps_each_element() {
        let transport = StubTransport::new(200, r#"[{"price":1},{"price":2}]"#);
        let (dispatcher, _) = dispatcher(transport);

        let list = dispatcher
            .query(Method::GET, "/boxes", Params::none(), QueryOptions::default(), &price_types())
            .await
            .unwrap()
            .into_list()
            .unwrap();

        assert_eq!(list.len(), 2);
        assert_eq!(list[1].get_money("price").unwrap(), Money::from_cents(200));
    }

    #[tokio::test]
    async fn test_raw_output_is_unwrapped() {
        let transport = StubTransport::new(200, r#"[{"price":"3"}]"#);
        let (dispatcher, _) = dispatcher(transport);

        let raw = dispatcher
            .query(Method::GET, "/boxes", Params::none(), QueryOptions::raw(), &price_types())
            .await
            .unwrap()
            .into_raw()
            .unwrap();

        let items = raw.as_array().unwrap();
        assert_eq!(items[0].as_object().unwrap()["price"].as_money(), Some(Money::from_cents(300)));
    }

    #[tokio::test]
    async fn test_get_is_cached_within_ttl() {
        let transport = StubTransport::new(200, r#"{"name":"Webstore"}"#);
        let (dispatcher, clock) = dispatcher(transport.clone());

        for _ in 0..3 {
            dispatcher
                .query(Method::GET, "/webstore", Params::none(), QueryOptions::default(), &TypeMap::new())
                .await
                .unwrap();
            clock.advance(20);
        }

        assert_eq!(transport.calls(), 1);
        assert_eq!(dispatcher.cache().len(), 1);
    }

    #[tokio::test]
    async fn test_get_after_ttl_is_fresh() {
        let transport = StubTransport::new(200, r#"{"name":"Webstore"}"#);
        let (dispatcher, clock) = dispatcher(transport.clone());

        let types = TypeMap::new();
        let run = || {
            dispatcher.query(Method::GET, "/webstore", Params::none(), QueryOptions::default(), &types)
        };
        run().await.unwrap();
        clock.advance(61);
        run().await.unwrap();

        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_flush_forces_fresh_call() {
        let transport = StubTransport::new(200, "{}");
        let (dispatcher, _) = dispatcher(transport.clone());

        let types = TypeMap::new();
        dispatcher
            .query(Method::GET, "/webstore", Params::none(), QueryOptions::default(), &types)
            .await
            .unwrap();
        dispatcher.flush_cache();
        dispatcher
            .query(Method::GET, "/webstore", Params::none(), QueryOptions::default(), &types)
            .await
            .unwrap();

        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_post_is_never_cached() {
        let transport = StubTransport::new(201, r#"{"id":7}"#);
        let (dispatcher, _) = dispatcher(transport.clone());

        for _ in 0..2 {
            dispatcher
                .query(
                    Method::POST,
                    "/orders",
                    Params::Json(r#"{"box_id":1}"#.to_string()),
                    QueryOptions::default(),
                    &TypeMap::new(),
                )
                .await
                .unwrap();
        }

        assert_eq!(transport.calls(), 2);
        assert!(dispatcher.cache().is_empty());

        let request = transport.last();
        assert_eq!(request.url, "https://api.example.test/v1/orders");
        assert_eq!(request.headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(request.body.as_deref(), Some(br#"{"box_id":1}"#.as_slice()));
    }

    #[tokio::test]
    async fn test_post_pairs_are_form_encoded() {
        let transport = StubTransport::new(200, r#"{"id":1}"#);
        let (dispatcher, _) = dispatcher(transport.clone());

        let params = QueryParams::new().with("email", "joe@example.net").with("password", "nope");
        dispatcher
            .query(Method::POST, "/customers/sign_in", params.into(), QueryOptions::default(), &TypeMap::new())
            .await
            .unwrap();

        let request = transport.last();
        assert_eq!(
            request.headers.get(CONTENT_TYPE).unwrap(),
            "application/x-www-form-urlencoded"
        );
        assert_eq!(
            request.body.as_deref(),
            Some(b"email=joe%40example.net&password=nope".as_slice())
        );
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let transport = StubTransport::new(404, r#"{"message":"not found"}"#);
        let (dispatcher, _) = dispatcher(transport.clone());

        for _ in 0..2 {
            let err = dispatcher
                .query(Method::GET, "/boxes/0", Params::none(), QueryOptions::default(), &TypeMap::new())
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), "Error 404 - not found");
        }

        assert_eq!(transport.calls(), 2);
        assert!(dispatcher.cache().is_empty());
    }

    #[tokio::test]
    async fn test_coercion_failure_is_not_cached() {
        let transport = StubTransport::new(200, r#"{"name":"no price"}"#);
        let (dispatcher, _) = dispatcher(transport);

        let err = dispatcher
            .query(Method::GET, "/boxes/1", Params::none(), QueryOptions::default(), &price_types())
            .await
            .unwrap_err();

        assert_matches!(err, Error::MissingAttribute { .. });
        assert!(dispatcher.cache().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_json_success_body() {
        let transport = StubTransport::new(200, "<html>");
        let (dispatcher, _) = dispatcher(transport);

        let err = dispatcher
            .query(Method::GET, "/webstore", Params::none(), QueryOptions::default(), &TypeMap::new())
            .await
            .unwrap_err();

        assert_matches!(err, Error::Decode(_));
    }

    #[tokio::test]
    async fn test_json_body_on_get_is_rejected() {
        let transport = StubTransport::new(200, "{}");
        let (dispatcher, _) = dispatcher(transport.clone());

        let err = dispatcher
            .query(Method::GET, "/webstore", Params::Json("{}".to_string()), QueryOptions::default(), &TypeMap::new())
            .await
            .unwrap_err();

        assert_matches!(err, Error::InvalidRequest(_));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_scalar_result_cannot_be_wrapped() {
        let transport = StubTransport::new(200, "");
        let (dispatcher, _) = dispatcher(transport);

        let err = dispatcher
            .query(Method::POST, "/orders", Params::none(), QueryOptions::default(), &TypeMap::new())
            .await
            .unwrap_err();

        assert_matches!(err, Error::Argument(_));
    }

    #[test]
    fn test_cache_key_depends_on_params_not_order() {
        let (dispatcher, _) = dispatcher(StubTransport::new(200, "{}"));
        let a: Params = QueryParams::new().with("x", 1).with("y", 2).into();
        let b: Params = QueryParams::new().with("y", 2).with("x", 1).into();
        let c: Params = QueryParams::new().with("y", 3).with("x", 1).into();

        assert_eq!(dispatcher.cache_key("/boxes", &a), dispatcher.cache_key("/boxes", &b));
        assert_ne!(dispatcher.cache_key("/boxes", &a), dispatcher.cache_key("/boxes", &c));
        assert_ne!(dispatcher.cache_key("/boxes", &a), dispatcher.cache_key("/customers", &a));
        assert_eq!(dispatcher.cache_key("/boxes", &Params::Json("{}".into())), None);
    }
}
