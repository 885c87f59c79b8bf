//! Error types for inference calls.
//!
//! Every failure surfaced by the client is an [`InferenceError`]: a category
//! from a small taxonomy, a human-readable message, and an optional
//! underlying cause for diagnostics. Retryability is a pure function of the
//! category, decided once when the error is classified and never re-derived
//! at call sites.

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Broad classification of an inference failure.
///
/// Only [`RateLimit`](ErrorCategory::RateLimit) and
/// [`Server`](ErrorCategory::Server) are retryable. Malformed requests and
/// bad credentials cannot succeed on retry, and unclassified failures are
/// conservatively terminal to avoid looping on unknown failure modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The request itself is invalid (HTTP 400, or it never reached the
    /// network because it could not be serialized).
    InvalidRequest,
    /// Authentication or authorization failure (HTTP 401, 403).
    Auth,
    /// The gateway is throttling (HTTP 429).
    RateLimit,
    /// Server-side or transport failure (HTTP 5xx, network errors,
    /// timeouts).
    Server,
    /// Anything else, including explicit cancellation and unclassified 4xx.
    Unknown,
}

impl ErrorCategory {
    /// Map an HTTP status code to a category.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => ErrorCategory::InvalidRequest,
            401 | 403 => ErrorCategory::Auth,
            429 => ErrorCategory::RateLimit,
            500 | 502 | 503 | 504 => ErrorCategory::Server,
            s if s >= 500 => ErrorCategory::Server,
            _ => ErrorCategory::Unknown,
        }
    }

    /// Whether a failure in this category may succeed if re-attempted.
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorCategory::RateLimit | ErrorCategory::Server)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::InvalidRequest => "invalid_request",
            ErrorCategory::Auth => "auth",
            ErrorCategory::RateLimit => "rate_limit",
            ErrorCategory::Server => "server",
            ErrorCategory::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// A classified inference failure.
///
/// Immutable value type; the retry loop consults
/// [`InferenceError::is_retryable`] exclusively and never inspects status
/// codes itself.
#[derive(Debug, Error)]
#[error("{category}: {message}")]
pub struct InferenceError {
    category: ErrorCategory,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl InferenceError {
    /// Create an error with a category and message.
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            source: None,
        }
    }

    /// Attach the underlying technical cause.
    pub fn with_source(
        mut self,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Classify a non-2xx HTTP response.
    ///
    /// The body is parsed best-effort against the conventional error
    /// envelope `{"error": {"message": ...}}`; when that fails or the
    /// message is empty, the raw body text is used verbatim.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let mut message = String::from_utf8_lossy(body).into_owned();
        if let Ok(envelope) = serde_json::from_slice::<ErrorEnvelope>(body)
            && let Some(parsed) = envelope.error.message
            && !parsed.is_empty()
        {
            message = parsed;
        }

        Self::new(
            ErrorCategory::from_status(status),
            format!("HTTP {status}: {message}"),
        )
    }

    /// The error's category.
    pub fn category(&self) -> ErrorCategory {
        self.category
    }

    /// Human-readable description of the failure.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether re-attempting the same request may succeed.
    ///
    /// Derived solely from the category; classification happens once at the
    /// point of failure and is never revised.
    pub fn is_retryable(&self) -> bool {
        self.category.is_retryable()
    }
}

/// Conventional gateway error envelope. Fields other than `message` are
/// ignored.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(
            ErrorCategory::from_status(400),
            ErrorCategory::InvalidRequest
        );
        assert_eq!(ErrorCategory::from_status(401), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::from_status(403), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::from_status(429), ErrorCategory::RateLimit);
        assert_eq!(ErrorCategory::from_status(500), ErrorCategory::Server);
        assert_eq!(ErrorCategory::from_status(502), ErrorCategory::Server);
        assert_eq!(ErrorCategory::from_status(503), ErrorCategory::Server);
        assert_eq!(ErrorCategory::from_status(504), ErrorCategory::Server);
        assert_eq!(ErrorCategory::from_status(599), ErrorCategory::Server);
        assert_eq!(ErrorCategory::from_status(404), ErrorCategory::Unknown);
        assert_eq!(ErrorCategory::from_status(418), ErrorCategory::Unknown);
    }

    #[test]
    fn test_retryable_categories() {
        assert!(ErrorCategory::RateLimit.is_retryable());
        assert!(ErrorCategory::Server.is_retryable());
        assert!(!ErrorCategory::InvalidRequest.is_retryable());
        assert!(!ErrorCategory::Auth.is_retryable());
        assert!(!ErrorCategory::Unknown.is_retryable());
    }

    #[test]
    fn test_from_response_parses_envelope() {
        let body = br#"{"error": {"code": 429, "type": "rate_limit", "message": "slow down", "param": ""}}"#;
        let err = InferenceError::from_response(429, body);

        assert_eq!(err.category(), ErrorCategory::RateLimit);
        assert!(err.is_retryable());
        assert_eq!(err.message(), "HTTP 429: slow down");
    }

    #[test]
    fn test_from_response_falls_back_to_raw_body() {
        let err = InferenceError::from_response(500, b"upstream exploded");

        assert_eq!(err.category(), ErrorCategory::Server);
        assert_eq!(err.message(), "HTTP 500: upstream exploded");
    }

    #[test]
    fn test_from_response_ignores_empty_envelope_message() {
        let body = br#"{"error": {"message": ""}}"#;
        let err = InferenceError::from_response(400, body);

        assert_eq!(err.category(), ErrorCategory::InvalidRequest);
        assert_eq!(err.message(), r#"HTTP 400: {"error": {"message": ""}}"#);
    }

    #[test]
    fn test_display_includes_category_and_message() {
        let err = InferenceError::new(ErrorCategory::Auth, "bad key");
        assert_eq!(err.to_string(), "auth: bad key");
    }

    #[test]
    fn test_source_is_preserved() {
        let cause = std::io::Error::other("connection reset");
        let err =
            InferenceError::new(ErrorCategory::Server, "failed to execute request").with_source(cause);

        let source = std::error::Error::source(&err).expect("source should be set");
        assert!(source.to_string().contains("connection reset"));
    }
}
