//! HTTP client with retry and request pacing
//!
//! Provides the API client every stream shares:
//! - A minimum interval between requests (cooperative pacing)
//! - Automatic retries driven by [`RetryPolicy`]
//! - JSON body decoding
//! - Normalization of 404 and exhausted retries into "no data"

use super::rate_limit::RequestPacer;
use super::retry::{FetchFailure, RetryPolicy, RetryStep};
use crate::error::{Error, Result};
use crate::types::{JsonValue, StringMap};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, error, warn};

/// Public NHL web API
pub const DEFAULT_BASE_URL: &str = "https://api-web.nhle.com/v1";

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL for all requests
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Maximum number of attempts per request
    pub max_retries: u32,
    /// Base delay for backoff
    pub retry_delay: Duration,
    /// Minimum interval between requests
    pub request_delay: Duration,
    /// Default headers for all requests
    pub default_headers: StringMap,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 5,
            retry_delay: Duration::from_secs(2),
            request_delay: Duration::from_millis(500),
            default_headers: StringMap::new(),
            user_agent: format!("nhl-pipeline/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }

    /// Retry policy described by this config
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, self.retry_delay)
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set max attempts per request
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set the base backoff delay
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.config.retry_delay = delay;
        self
    }

    /// Set the minimum interval between requests
    pub fn request_delay(mut self, delay: Duration) -> Self {
        self.config.request_delay = delay;
        self
    }

    /// Disable request pacing
    pub fn no_request_delay(mut self) -> Self {
        self.config.request_delay = Duration::ZERO;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// Configuration for a single request
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Query parameters
    pub query: StringMap,
    /// Request headers
    pub headers: StringMap,
    /// Override timeout for this request
    pub timeout: Option<Duration>,
}

impl RequestConfig {
    /// Create a new request config
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// API client with retry and request pacing
///
/// One instance is shared (behind an `Arc`) by every stream of a run, so
/// the pacing interval holds across all of them.
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    policy: RetryPolicy,
    pacer: RequestPacer,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        url::Url::parse(&config.base_url)?;

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            client,
            policy: config.retry_policy(),
            pacer: RequestPacer::new(config.request_delay),
            config,
        })
    }

    /// Client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Retry policy in use
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Request pacer in use
    pub fn pacer(&self) -> &RequestPacer {
        &self.pacer
    }

    /// GET an endpoint, returning `None` when there is no data
    ///
    /// `None` covers both a 404 and a request that failed on every attempt.
    pub async fn get(&self, endpoint: &str) -> Option<JsonValue> {
        self.get_with_config(endpoint, &RequestConfig::default())
            .await
    }

    /// GET an endpoint with query parameters or headers
    pub async fn get_with_config(
        &self,
        endpoint: &str,
        config: &RequestConfig,
    ) -> Option<JsonValue> {
        match self.fetch(endpoint, config).await {
            Ok(body) => Some(body),
            Err(e) if e.is_not_found() => None,
            Err(e) => {
                error!("{e}");
                None
            }
        }
    }

    /// GET an endpoint, surfacing why no data came back
    ///
    /// Fails with [`Error::NotFound`] on a 404 and with
    /// [`Error::RetriesExhausted`] once every attempt has failed.
    pub async fn fetch(&self, endpoint: &str, config: &RequestConfig) -> Result<JsonValue> {
        let url = self.build_url(endpoint);
        let attempts = self.policy.attempts();

        self.pacer.wait().await;

        let mut attempt = 0;
        loop {
            self.pacer.mark();

            let failure = match self.attempt(&url, config).await {
                Ok(body) => {
                    debug!("GET {url} succeeded on attempt {}", attempt + 1);
                    return Ok(body);
                }
                Err(failure) => failure,
            };

            match self.policy.decide(attempt, &failure) {
                RetryStep::Absent => {
                    warn!("404 Not Found: {url}");
                    return Err(Error::NotFound { url });
                }
                RetryStep::Retry(delay) => {
                    warn!(
                        "{failure} on attempt {}/{attempts} for {url}, waiting {delay:?} before retry",
                        attempt + 1
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                RetryStep::Exhausted => {
                    warn!("{failure} on attempt {}/{attempts} for {url}", attempt + 1);
                    return Err(Error::RetriesExhausted { url, attempts });
                }
            }
        }
    }

    /// Issue one request and classify the outcome
    async fn attempt(
        &self,
        url: &str,
        config: &RequestConfig,
    ) -> std::result::Result<JsonValue, FetchFailure> {
        let mut req = self.client.get(url);

        for (key, value) in &self.config.default_headers {
            req = req.header(key.as_str(), value.as_str());
        }
        for (key, value) in &config.headers {
            req = req.header(key.as_str(), value.as_str());
        }
        if !config.query.is_empty() {
            req = req.query(&config.query);
        }
        if let Some(timeout) = config.timeout {
            req = req.timeout(timeout);
        }

        let response = req
            .send()
            .await
            .map_err(|e| FetchFailure::Transient(format!("Request error: {e}")))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(FetchFailure::NotFound),
            StatusCode::TOO_MANY_REQUESTS => Err(FetchFailure::RateLimited),
            status if !status.is_success() => Err(FetchFailure::Transient(format!(
                "HTTP error {}",
                status.as_u16()
            ))),
            _ => response
                .json::<JsonValue>()
                .await
                .map_err(|e| FetchFailure::Transient(format!("Invalid JSON body: {e}"))),
        }
    }

    /// Build full URL from an endpoint path
    pub fn build_url(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return endpoint.to_string();
        }

        let base = self.config.base_url.trim_end_matches('/');
        let path = endpoint.trim_start_matches('/');
        format!("{base}/{path}")
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("policy", &self.policy)
            .field("pacer", &self.pacer)
            .finish_non_exhaustive()
    }
}
