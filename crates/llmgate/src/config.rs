//! Configuration for the inference client.

use llmgate_core::RetryConfig;
use secrecy::SecretString;
use std::time::Duration;

/// Configuration for [`HttpInferenceClient`](crate::HttpInferenceClient).
///
/// Everything here is supplied once at construction: the connection pool and
/// timeout settings configure the shared HTTP transport, and the retry
/// configuration governs every call made through the client.
///
/// # Examples
///
/// ```rust
/// use llmgate::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::builder("http://localhost:8000")
///     .timeout(Duration::from_secs(60))
///     .api_key("test-key")
///     .max_retries(3)
///     .build();
///
/// assert_eq!(config.retry.max_retries, 3);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the inference gateway (e.g. `http://localhost:8000`).
    pub base_url: String,

    /// Whole-request timeout.
    pub timeout: Duration,

    /// Maximum idle connections kept in the pool.
    pub max_idle_conns: usize,

    /// How long an idle connection is kept before being closed.
    pub idle_conn_timeout: Duration,

    /// Optional API key, sent as `Authorization: Bearer <key>`.
    pub api_key: Option<SecretString>,

    /// Retry configuration. Leave at default to disable retry.
    pub retry: RetryConfig,
}

impl ClientConfig {
    /// Configuration for `base_url` with default pool, timeout, and retry
    /// settings (5 minute timeout, 100 idle connections, 90s idle timeout,
    /// retry disabled).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(300),
            max_idle_conns: 100,
            idle_conn_timeout: Duration::from_secs(90),
            api_key: None,
            retry: RetryConfig::default(),
        }
    }

    /// Create a builder for fluent configuration.
    pub fn builder(base_url: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::new(base_url),
        }
    }
}

/// Builder for creating a [`ClientConfig`] with a fluent API.
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the whole-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the maximum number of idle pooled connections.
    pub fn max_idle_conns(mut self, max_idle_conns: usize) -> Self {
        self.config.max_idle_conns = max_idle_conns;
        self
    }

    /// Set the idle-connection timeout.
    pub fn idle_conn_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_conn_timeout = timeout;
        self
    }

    /// Set the API key.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.api_key = Some(SecretString::new(api_key.into().into_boxed_str()));
        self
    }

    /// Set the full retry configuration.
    ///
    /// Zero-valued fields are defaulted at client construction when
    /// `max_retries > 0`.
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.config.retry = retry;
        self
    }

    /// Enable retry with up to `max_retries` retries and default backoff.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.retry.max_retries = max_retries;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}
