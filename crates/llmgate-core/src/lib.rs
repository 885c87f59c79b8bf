#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Core primitives for the llmgate inference client.
//!
//! This crate holds the transport-agnostic pieces of the client:
//!
//! - **Retry configuration and backoff arithmetic** via [`retry::RetryConfig`]
//!   - Exponential backoff with jitter
//!   - Zero-value defaulting, applied only when retry is enabled
//! - **Cancellable execution contexts** via [`context::CallContext`]
//!   - Explicit cancel handles and optional deadlines
//!   - A cancellable sleep for backoff waits
//!
//! The HTTP client in the `llmgate` crate drives its retry loop with these
//! primitives; nothing in this crate knows about HTTP.
//!
//! # Examples
//!
//! ```rust
//! use llmgate_core::prelude::*;
//! use std::time::Duration;
//!
//! let retry = RetryConfig {
//!     max_retries: 3,
//!     ..Default::default()
//! }
//! .resolved();
//!
//! assert_eq!(retry.initial_backoff, Duration::from_secs(1));
//!
//! let (ctx, handle) = CallContext::cancellable();
//! assert!(ctx.cause().is_none());
//! handle.cancel();
//! assert_eq!(ctx.cause(), Some(CancelCause::Cancelled));
//! ```

pub mod context;
pub mod retry;

pub use context::{CallContext, CancelCause, CancelHandle};
pub use retry::RetryConfig;

/// Prelude module for common imports.
///
/// # Examples
///
/// ```rust
/// use llmgate_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::context::{CallContext, CancelCause, CancelHandle};
    pub use crate::retry::RetryConfig;
}
