//! Main client implementation for the Bucky Box API

use std::sync::Arc;
use std::time::Duration;

use buckybox_transport::{HttpTransport, HttpTransportConfig, Transport};
use http::{HeaderMap, Method};
use secrecy::SecretString;

use crate::{
    clock::{Clock, SystemClock},
    coerce::TypeMap,
    config::{ClientConfig, Environment, parse_header},
    dispatch::{QueryDispatcher, QueryOptions, Response},
    error::Result,
    params::Params,
};

/// Client for the Bucky Box API.
///
/// Cloning is cheap and clones share one response cache. Resource methods
/// live in [`crate::resources`].
///
/// # Example
///
/// ```rust,no_run
/// use buckybox::Client;
///
/// # async fn example() -> buckybox::Result<()> {
/// let client = Client::new("api-key", "api-secret")?;
/// for box_ in client.boxes().await? {
///     println!("{} costs {}", box_.get_str("name")?, box_.get_money("price")?);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    environment: Environment,
    dispatcher: QueryDispatcher,
}

impl Client {
    /// Create a client sending `API-Key` and `API-Secret` headers.
    ///
    /// The environment comes from `BUCKYBOX_ENV` (or `RAILS_ENV`) when the
    /// `env` feature is enabled, production otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A credential is not a valid header value
    /// - The environment variable names an unknown environment
    /// - The HTTP transport cannot be built
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Result<Self> {
        Self::builder().api_key(api_key).api_secret(api_secret).build()
    }

    /// Create a new client builder for advanced configuration.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Create a client from a configuration object, using the default
    /// reqwest transport and the system clock.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let transport = default_transport(config.timeout)?;
        Self::assemble(config, transport, Arc::new(SystemClock))
    }

    fn assemble(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        let headers = config.headers()?;
        let dispatcher =
            QueryDispatcher::new(config.resolved_base_url().trim(), headers, transport, clock);

        tracing::debug!(
            environment = %config.environment,
            base_url = %dispatcher.base_url(),
            "Created Bucky Box client"
        );

        Ok(Self {
            inner: Arc::new(ClientInner {
                environment: config.environment,
                dispatcher,
            }),
        })
    }

    /// Issue a call to any API path.
    ///
    /// GET results are cached for 60 seconds per client; see
    /// [`QueryDispatcher::query`] for the full pipeline.
    pub async fn query(
        &self,
        method: Method,
        path: &str,
        params: Params,
        options: QueryOptions,
        types: &TypeMap,
    ) -> Result<Response> {
        self.inner
            .dispatcher
            .query(method, path, params, options, types)
            .await
    }

    /// Drop every cached response. No HTTP call is made.
    pub fn flush_cache(&self) {
        self.inner.dispatcher.flush_cache();
    }

    /// Number of cached responses, fresh or expired.
    pub fn cache_len(&self) -> usize {
        self.inner.dispatcher.cache().len()
    }

    /// Endpoint every path is appended to.
    pub fn base_url(&self) -> &str {
        self.inner.dispatcher.base_url()
    }

    /// Environment the client was built for.
    pub fn environment(&self) -> Environment {
        self.inner.environment
    }

    /// Headers sent with every request.
    pub fn headers(&self) -> &HeaderMap {
        self.inner.dispatcher.headers()
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("environment", &self.inner.environment)
            .field("dispatcher", &self.inner.dispatcher)
            .finish()
    }
}

fn default_transport(timeout: Duration) -> Result<Arc<dyn Transport>> {
    let transport = HttpTransport::with_config(HttpTransportConfig::default().with_timeout(timeout))?;
    Ok(Arc::new(transport))
}

/// Builder for creating a configured Client.
#[derive(Default)]
pub struct ClientBuilder {
    config: ClientConfig,
    environment_set: bool,
    transport: Option<Arc<dyn Transport>>,
    clock: Option<Arc<dyn Clock>>,
}

impl ClientBuilder {
    /// Set the environment. Unset, it is read from the process environment.
    pub fn environment(mut self, environment: Environment) -> Self {
        self.config.environment = environment;
        self.environment_set = true;
        self
    }

    /// Override the environment's endpoint.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = Some(base_url.into());
        self
    }

    /// Set the API key.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.api_key = Some(SecretString::from(api_key.into()));
        self
    }

    /// Set the API secret.
    pub fn api_secret(mut self, api_secret: impl Into<String>) -> Self {
        self.config.api_secret = Some(SecretString::from(api_secret.into()));
        self
    }

    /// Add a header sent with every request.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid according to HTTP specifications.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let (key, value) = parse_header(key.into(), value.into())?;
        self.config.default_headers.insert(key, value);
        Ok(self)
    }

    /// Set the timeout of the default transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Send requests through `transport` instead of the default reqwest one.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Read cache time from `clock` instead of the system clock.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Build the client with the configured options.
    pub fn build(mut self) -> Result<Client> {
        if !self.environment_set {
            self.config.environment = Environment::from_env()?;
        }

        let transport = match self.transport {
            Some(transport) => transport,
            None => default_transport(self.config.timeout)?,
        };
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        Client::assemble(self.config, transport, clock)
    }
}

impl From<ClientConfig> for ClientBuilder {
    fn from(config: ClientConfig) -> Self {
        Self {
            config,
            environment_set: true,
            transport: None,
            clock: None,
        }
    }
}
