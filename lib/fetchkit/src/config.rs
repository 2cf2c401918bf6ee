//! Transport and wrapper configuration.

use std::time::Duration;

use url::Url;

use crate::{Error, Headers, Result, loading::DEFAULT_HIDE_DELAY};

/// Configuration for [`crate::HyperClient`].
///
/// There is no request timeout by default: a dispatched call runs until it
/// completes or the network fails.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Whole-request timeout, if any.
    pub timeout: Option<Duration>,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
    /// Maximum idle connections per host.
    pub pool_idle_per_host: usize,
    /// Idle connection timeout.
    pub pool_idle_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            connect_timeout: Duration::from_secs(10),
            pool_idle_per_host: 32,
            pool_idle_timeout: Duration::from_secs(90),
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    pool_idle_per_host: Option<usize>,
    pool_idle_timeout: Option<Duration>,
}

impl ClientConfigBuilder {
    /// Set a whole-request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connect timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the maximum idle connections per host.
    #[must_use]
    pub const fn pool_idle_per_host(mut self, count: usize) -> Self {
        self.pool_idle_per_host = Some(count);
        self
    }

    /// Set the idle connection timeout.
    #[must_use]
    pub const fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = Some(timeout);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> ClientConfig {
        let defaults = ClientConfig::default();
        ClientConfig {
            timeout: self.timeout.or(defaults.timeout),
            connect_timeout: self.connect_timeout.unwrap_or(defaults.connect_timeout),
            pool_idle_per_host: self
                .pool_idle_per_host
                .unwrap_or(defaults.pool_idle_per_host),
            pool_idle_timeout: self.pool_idle_timeout.unwrap_or(defaults.pool_idle_timeout),
        }
    }
}

/// Configuration of an [`crate::ApiClient`].
///
/// The base URL is validated once and cannot change afterwards.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    base_url: String,
    default_headers: Headers,
    hide_delay: Duration,
}

impl ApiConfig {
    /// Configuration for `base_url` with the default headers
    /// (`Content-Type: application/json`, `Accept: */*`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if `base_url` is not an absolute URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        Url::parse(&base_url)?;

        Ok(Self {
            base_url,
            default_headers: [("Content-Type", "application/json"), ("Accept", "*/*")]
                .into_iter()
                .collect(),
            hide_delay: DEFAULT_HIDE_DELAY,
        })
    }

    /// Sets a default header, replacing any with the same name.
    #[must_use]
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.set(name, value);
        self
    }

    /// Sets the loading indicator hide debounce.
    #[must_use]
    pub const fn hide_delay(mut self, hide_delay: Duration) -> Self {
        self.hide_delay = hide_delay;
        self
    }

    /// The base URL, as given.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Headers sent with every call.
    #[must_use]
    pub const fn default_headers(&self) -> &Headers {
        &self.default_headers
    }

    /// The loading indicator hide debounce.
    #[must_use]
    pub const fn hide_delay_duration(&self) -> Duration {
        self.hide_delay
    }

    /// Full URL of `path`: the base URL followed by `path`, with no doubled
    /// slash between them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the result does not parse.
    pub fn url_for(&self, path: &str) -> Result<Url> {
        let base = if path.starts_with('/') {
            self.base_url.strip_suffix('/').unwrap_or(&self.base_url)
        } else {
            &self.base_url
        };
        Url::parse(&format!("{base}{path}")).map_err(Error::InvalidUrl)
    }
}
