//! Request and response types for inference calls.

use serde_json::{Map, Value};

/// A single logical inference request.
///
/// `params` is the wire payload, serialized verbatim as the JSON body of the
/// POST. The request is immutable once constructed and is passed by reference
/// for the duration of one call; the client never mutates it.
///
/// # Examples
///
/// ```rust
/// use llmgate::InferenceRequest;
/// use serde_json::json;
///
/// let request = InferenceRequest::new("llama-3-70b")
///     .with_request_id("req-42")
///     .with_param("messages", json!([{"role": "user", "content": "Hello"}]))
///     .with_param("max_tokens", json!(128));
/// ```
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    /// Opaque correlation id; may be empty, in which case no correlation
    /// header is sent.
    pub request_id: String,
    /// Model name, for diagnostics. The gateway reads the model from
    /// `params`.
    pub model: String,
    /// Wire payload sent as the JSON request body.
    pub params: Map<String, Value>,
}

impl InferenceRequest {
    /// Create a request for the given model with no parameters.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            request_id: String::new(),
            model: model.into(),
            params: Map::new(),
        }
    }

    /// Set the correlation id.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    /// Add one payload parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    /// Replace the whole payload.
    pub fn with_params(mut self, params: Map<String, Value>) -> Self {
        self.params = params;
        self
    }
}

/// A successful inference response.
///
/// `data` is a best-effort parse of the body; a malformed or empty body is
/// not an error for the call, so `data` may be `None` while `body` still
/// holds the raw bytes.
#[derive(Debug, Clone)]
pub struct InferenceResponse {
    /// Echo of the request's correlation id.
    pub request_id: String,
    /// Raw response body bytes.
    pub body: Vec<u8>,
    /// Parsed response body, when the body was valid JSON.
    pub data: Option<Value>,
}
