//! Configuration for the Bucky Box client

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use http::{HeaderMap, HeaderName, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use crate::error::{Error, Result};

/// Header carrying the API key (sent as `API-Key`; header names are case-insensitive).
pub const API_KEY_HEADER: &str = "api-key";

/// Header carrying the API secret.
pub const API_SECRET_HEADER: &str = "api-secret";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Deployment the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Environment {
    /// Live API
    #[default]
    Production,
    /// Staging API
    Staging,
    /// Local development server
    Development,
    /// Test runs (same endpoint as production)
    Test,
}

impl Environment {
    /// Every known environment.
    pub const ALL: [Environment; 4] = [
        Environment::Production,
        Environment::Staging,
        Environment::Development,
        Environment::Test,
    ];

    /// Base endpoint of this environment.
    pub fn endpoint(self) -> &'static str {
        match self {
            Environment::Production | Environment::Test => "https://api.buckybox.com/v1",
            Environment::Staging => "https://api-staging.buckybox.com/v1",
            Environment::Development => "http://api.buckybox.local:3000/v1",
        }
    }

    /// Name as used in `BUCKYBOX_ENV`.
    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Staging => "staging",
            Environment::Development => "development",
            Environment::Test => "test",
        }
    }

    /// Environment named by `BUCKYBOX_ENV`, then `RAILS_ENV`, else production.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownEnvironment`] when the variable names no known
    /// environment.
    #[cfg(feature = "env")]
    pub fn from_env() -> Result<Self> {
        match dotenvy::var("BUCKYBOX_ENV").or_else(|_| dotenvy::var("RAILS_ENV")) {
            Ok(name) if !name.trim().is_empty() => name.parse(),
            _ => Ok(Environment::default()),
        }
    }

    /// Without the `env` feature the environment is always production.
    #[cfg(not(feature = "env"))]
    pub fn from_env() -> Result<Self> {
        Ok(Environment::default())
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        let name = name.trim();
        Environment::ALL
            .into_iter()
            .find(|env| env.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::UnknownEnvironment(name.to_string()))
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for the Bucky Box client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Deployment to talk to
    pub environment: Environment,

    /// Overrides the environment's endpoint when set
    pub base_url: Option<String>,

    /// Sent as `API-Key`
    pub api_key: Option<SecretString>,

    /// Sent as `API-Secret`
    pub api_secret: Option<SecretString>,

    /// Extra headers sent with every request
    pub default_headers: HeaderMap,

    /// Per-request timeout of the default transport
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            base_url: None,
            api_key: None,
            api_secret: None,
            default_headers: HeaderMap::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Configuration with API credentials and default settings.
    pub fn with_credentials(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: Some(SecretString::from(api_key.into())),
            api_secret: Some(SecretString::from(api_secret.into())),
            ..Default::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// This will look for:
    /// - `BUCKYBOX_ENV` (or `RAILS_ENV`) for the environment
    /// - `BUCKYBOX_API_KEY` and `BUCKYBOX_API_SECRET` for credentials
    /// - `BUCKYBOX_BASE_URL` for an endpoint override
    /// - `BUCKYBOX_TIMEOUT` for the request timeout (in seconds)
    ///
    /// A `.env` file in the working directory is read as well.
    #[cfg(feature = "env")]
    pub fn from_env() -> Result<Self> {
        let mut config = Self {
            environment: Environment::from_env()?,
            ..Default::default()
        };

        if let Ok(api_key) = dotenvy::var("BUCKYBOX_API_KEY") {
            config.api_key = Some(SecretString::from(api_key));
        }
        if let Ok(api_secret) = dotenvy::var("BUCKYBOX_API_SECRET") {
            config.api_secret = Some(SecretString::from(api_secret));
        }

        if let Ok(base_url) = dotenvy::var("BUCKYBOX_BASE_URL")
            && !base_url.trim().is_empty()
        {
            config.base_url = Some(base_url);
        }

        if let Ok(timeout_str) = dotenvy::var("BUCKYBOX_TIMEOUT")
            && let Ok(timeout_secs) = timeout_str.parse::<u64>()
        {
            config.timeout = Duration::from_secs(timeout_secs);
        }

        Ok(config)
    }

    /// Endpoint every request path is appended to.
    pub fn resolved_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.endpoint())
    }

    /// Headers sent with every request: credentials plus the defaults.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidHeaderValue`] when a credential is not a valid header
    /// value.
    pub fn headers(&self) -> Result<HeaderMap> {
        let mut headers = self.default_headers.clone();

        for (name, secret) in [
            (API_KEY_HEADER, &self.api_key),
            (API_SECRET_HEADER, &self.api_secret),
        ] {
            if let Some(secret) = secret {
                let mut value = HeaderValue::from_str(secret.expose_secret())
                    .map_err(|_| Error::InvalidHeaderValue(format!("{name} (redacted)")))?;
                value.set_sensitive(true);
                headers.insert(HeaderName::from_static(name), value);
            }
        }

        Ok(headers)
    }

    /// Check the base URL is a non-empty http(s) URL.
    pub fn validate(&self) -> Result<()> {
        let base_url = self.resolved_base_url().trim();
        if base_url.is_empty() {
            return Err(Error::InvalidUrl("base URL is empty".to_string()));
        }

        let url =
            url::Url::parse(base_url).map_err(|e| Error::InvalidUrl(format!("{base_url}: {e}")))?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(Error::InvalidUrl(format!(
                "unsupported scheme `{scheme}` in {base_url} (expected http or https)"
            ))),
        }
    }
}

/// Builder for creating ClientConfig with a fluent API.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the environment.
    pub fn environment(mut self, environment: Environment) -> Self {
        self.config.environment = environment;
        self
    }

    /// Override the endpoint.
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

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Add a default header.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid according to HTTP specifications.
    pub fn default_header(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self> {
        let (key, value) = parse_header(key.into(), value.into())?;
        self.config.default_headers.insert(key, value);
        Ok(self)
    }

    /// Build the configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

pub(crate) fn parse_header(key: String, value: String) -> Result<(HeaderName, HeaderValue)> {
    let name: HeaderName = key.parse().map_err(|_| Error::InvalidHeaderName(key.clone()))?;
    let value: HeaderValue = value
        .parse()
        .map_err(|_| Error::InvalidHeaderValue(value.clone()))?;
    Ok((name, value))
}
