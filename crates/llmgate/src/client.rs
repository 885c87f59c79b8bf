//! HTTP inference client with automatic retry.
//!
//! [`HttpInferenceClient`] issues one logical inference request per call:
//! a single attempt when retry is disabled, otherwise up to
//! `max_retries + 1` attempts driven by the retry configuration, with a
//! cancellable jittered backoff wait between attempts. Classification of
//! each attempt's outcome happens exactly once, inside the single-attempt
//! executor; the retry loop trusts the resulting category's retryability
//! verdict exclusively.

use crate::config::ClientConfig;
use crate::endpoint::endpoint_for;
use crate::error::{ErrorCategory, InferenceError};
use crate::types::{InferenceRequest, InferenceResponse};
use async_trait::async_trait;
use llmgate_core::{CallContext, CancelCause, RetryConfig};
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};
use url::Url;

/// Correlation header carrying the request id.
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Client interface for issuing inference requests.
///
/// The HTTP implementation is [`HttpInferenceClient`]; callers that want to
/// mock inference in tests implement this trait instead.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Issue one logical inference request, retrying transient failures when
    /// the client is configured to.
    async fn generate(
        &self,
        ctx: &CallContext,
        request: &InferenceRequest,
    ) -> Result<InferenceResponse, InferenceError>;
}

/// HTTP client for OpenAI-compatible inference gateways.
///
/// Handles:
/// - Endpoint selection from the request payload
/// - Automatic retries with jittered exponential backoff
/// - Cancellation at every suspension point (in-flight I/O and backoff
///   waits)
/// - Connection pooling via a shared `reqwest` client
///
/// The client is cheap to clone and safe to share across tasks; retry
/// counters and classification are call-local, so concurrent calls share
/// nothing but the connection pool.
///
/// # Examples
///
/// ```rust,no_run
/// use llmgate::{ClientConfig, HttpInferenceClient, InferenceRequest};
/// use llmgate_core::CallContext;
/// use serde_json::json;
///
/// # async fn example() -> Result<(), llmgate::InferenceError> {
/// let client = HttpInferenceClient::new(
///     ClientConfig::builder("http://localhost:8000")
///         .max_retries(3)
///         .build(),
/// )?;
///
/// let request = InferenceRequest::new("llama-3-70b")
///     .with_param("messages", json!([{"role": "user", "content": "Hello"}]));
///
/// let response = client.generate(&CallContext::background(), &request).await?;
/// println!("{:?}", response.data);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpInferenceClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
    retry: RetryConfig,
}

impl HttpInferenceClient {
    /// Create a client from configuration.
    ///
    /// Validates the base URL (non-empty, http or https) and builds the
    /// shared connection pool. Retry defaults are resolved here, once.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidRequest`-category error when the base URL is
    /// missing or malformed, or when the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, InferenceError> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(InferenceError::new(
                ErrorCategory::InvalidRequest,
                "base URL cannot be empty",
            ));
        }
        let parsed: Url = base_url.parse().map_err(|e| {
            InferenceError::new(
                ErrorCategory::InvalidRequest,
                format!("invalid base URL '{base_url}': {e}"),
            )
            .with_source(e)
        })?;
        match parsed.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(InferenceError::new(
                    ErrorCategory::InvalidRequest,
                    format!("unsupported base URL scheme '{scheme}'"),
                ));
            }
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(config.max_idle_conns)
            .pool_idle_timeout(config.idle_conn_timeout)
            .build()
            .map_err(|e| {
                InferenceError::new(ErrorCategory::InvalidRequest, "failed to build HTTP client")
                    .with_source(e)
            })?;

        Ok(Self {
            http,
            base_url,
            api_key: config.api_key,
            retry: config.retry.resolved(),
        })
    }

    /// The resolved retry configuration in effect for this client.
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Issue one logical inference request.
    ///
    /// With retry disabled (`max_retries == 0`) this performs exactly one
    /// attempt. Otherwise unsuccessful retryable attempts are re-executed
    /// after a jittered exponential backoff, up to `max_retries + 1`
    /// attempts total; the last error wins when retries are exhausted.
    /// Non-retryable failures return immediately, and the context can end
    /// the call at any suspension point.
    pub async fn generate(
        &self,
        ctx: &CallContext,
        request: &InferenceRequest,
    ) -> Result<InferenceResponse, InferenceError> {
        if !self.retry.enabled() {
            return self.generate_once(ctx, request).await;
        }

        let mut attempt: u32 = 0;
        loop {
            match self.generate_once(ctx, request).await {
                Ok(response) => {
                    if attempt > 0 {
                        debug!(
                            request_id = %request.request_id,
                            retries = attempt,
                            "request succeeded after retries"
                        );
                    }
                    return Ok(response);
                }
                Err(err) if !err.is_retryable() => {
                    debug!(
                        request_id = %request.request_id,
                        category = %err.category(),
                        "non-retryable error, not retrying"
                    );
                    return Err(err);
                }
                Err(err) if attempt >= self.retry.max_retries => {
                    debug!(
                        request_id = %request.request_id,
                        max_retries = self.retry.max_retries,
                        "max retries exhausted"
                    );
                    return Err(err);
                }
                Err(err) => {
                    if let Some(cause) = ctx.cause() {
                        debug!(
                            request_id = %request.request_id,
                            "context done, stopping retries"
                        );
                        return Err(InferenceError::new(
                            ErrorCategory::Unknown,
                            "request cancelled before retry",
                        )
                        .with_source(cause));
                    }

                    let delay = self.retry.backoff_delay(attempt);
                    debug!(
                        request_id = %request.request_id,
                        ?delay,
                        attempt = attempt + 1,
                        max_retries = self.retry.max_retries,
                        category = %err.category(),
                        "retrying request after backoff"
                    );

                    if let Err(cause) = ctx.sleep(delay).await {
                        debug!(
                            request_id = %request.request_id,
                            "context done during backoff"
                        );
                        return Err(InferenceError::new(
                            ErrorCategory::Unknown,
                            "request cancelled during retry wait",
                        )
                        .with_source(cause));
                    }
                    attempt += 1;
                }
            }
        }
    }

    /// Perform one attempt and classify its outcome.
    async fn generate_once(
        &self,
        ctx: &CallContext,
        request: &InferenceRequest,
    ) -> Result<InferenceResponse, InferenceError> {
        let endpoint = endpoint_for(&request.params);

        let body = serde_json::to_vec(&request.params).map_err(|e| {
            InferenceError::new(
                ErrorCategory::InvalidRequest,
                format!("failed to serialize request: {e}"),
            )
            .with_source(e)
        })?;

        let url = format!("{}{}", self.base_url, endpoint);
        let mut builder = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(api_key) = &self.api_key {
            builder = builder.header(
                AUTHORIZATION,
                format!("Bearer {}", api_key.expose_secret()),
            );
        }
        if !request.request_id.is_empty() {
            builder = builder.header(REQUEST_ID_HEADER, &request.request_id);
        }

        debug!(
            request_id = %request.request_id,
            model = %request.model,
            %url,
            "sending inference request"
        );

        let attempt = async {
            let response = builder.send().await.map_err(|e| {
                if e.is_timeout() {
                    InferenceError::new(ErrorCategory::Server, "request timeout").with_source(e)
                } else {
                    let message = format!("failed to execute request: {e}");
                    InferenceError::new(ErrorCategory::Server, message).with_source(e)
                }
            })?;

            let status = response.status();
            let bytes = response.bytes().await.map_err(|e| {
                let message = format!("failed to read response body: {e}");
                InferenceError::new(ErrorCategory::Server, message).with_source(e)
            })?;

            if status != StatusCode::OK {
                return Err(InferenceError::from_response(status.as_u16(), &bytes));
            }

            // A body that is not valid JSON is still a successful call.
            let data = match serde_json::from_slice(&bytes) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!(
                        request_id = %request.request_id,
                        error = %e,
                        "failed to parse response body as JSON"
                    );
                    None
                }
            };

            debug!(
                request_id = %request.request_id,
                status = status.as_u16(),
                body_size = bytes.len(),
                "received successful response"
            );

            Ok(InferenceResponse {
                request_id: request.request_id.clone(),
                body: bytes.to_vec(),
                data,
            })
        };

        // Biased so an already-done context never reaches the network.
        tokio::select! {
            biased;
            cause = ctx.done() => Err(attempt_cancelled(cause)),
            result = attempt => result,
        }
    }
}

#[async_trait]
impl InferenceClient for HttpInferenceClient {
    async fn generate(
        &self,
        ctx: &CallContext,
        request: &InferenceRequest,
    ) -> Result<InferenceResponse, InferenceError> {
        HttpInferenceClient::generate(self, ctx, request).await
    }
}

/// Map a context ending mid-attempt onto the error taxonomy.
///
/// An explicit cancel is terminal (Unknown). A deadline firing mid-attempt
/// is a timeout, classified like any other transport timeout (Server,
/// retryable); the retry loop still consults the context before waiting, so
/// an expired whole-call deadline ends the call there.
fn attempt_cancelled(cause: CancelCause) -> InferenceError {
    match cause {
        CancelCause::Cancelled => {
            InferenceError::new(ErrorCategory::Unknown, "request cancelled").with_source(cause)
        }
        CancelCause::DeadlineExceeded => {
            InferenceError::new(ErrorCategory::Server, "request timeout").with_source(cause)
        }
    }
}
