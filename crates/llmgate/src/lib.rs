#![warn(missing_docs)]
#![deny(unsafe_code)]

//! # llmgate
//!
//! Resilient HTTP client for OpenAI-compatible inference gateways:
//! - Chat and text completion endpoints, selected from the request payload
//! - Automatic retries with jittered exponential backoff
//! - A five-category error taxonomy with a single retryability verdict
//! - Cancellation honored in-flight and during backoff waits
//! - Connection pooling shared across concurrent calls
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use llmgate::{ClientConfig, HttpInferenceClient, InferenceRequest};
//! use llmgate_core::CallContext;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), llmgate::InferenceError> {
//!     let client = HttpInferenceClient::new(
//!         ClientConfig::builder("http://localhost:8000")
//!             .api_key("your-api-key")
//!             .max_retries(3)
//!             .build(),
//!     )?;
//!
//!     let request = InferenceRequest::new("llama-3-70b")
//!         .with_request_id("req-1")
//!         .with_param("messages", json!([{"role": "user", "content": "Hello"}]));
//!
//!     let response = client.generate(&CallContext::background(), &request).await?;
//!     println!("{:?}", response.data);
//!     Ok(())
//! }
//! ```

// Re-export commonly used types
pub use client::{HttpInferenceClient, InferenceClient, REQUEST_ID_HEADER};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{ErrorCategory, InferenceError};
pub use types::{InferenceRequest, InferenceResponse};

// Module declarations
pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod types;

// Re-export the core primitives callers need to drive a call
pub use llmgate_core::{CallContext, CancelCause, CancelHandle, RetryConfig};

/// Prelude module for common imports
///
/// # Examples
///
/// ```rust
/// use llmgate::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        CallContext, CancelCause, CancelHandle, ClientConfig, ErrorCategory, HttpInferenceClient,
        InferenceClient, InferenceError, InferenceRequest, InferenceResponse, RetryConfig,
    };
}
