//! Retry configuration and backoff arithmetic.
//!
//! # Key Types
//!
//! - [`RetryConfig`] - Retry settings with gated zero-value defaulting
//!
//! Delays between retries grow exponentially, are capped at a maximum, and
//! carry a bounded random jitter so concurrent callers do not retry in
//! lockstep.
//!
//! # Examples
//!
//! ```rust
//! use llmgate_core::retry::RetryConfig;
//! use std::time::Duration;
//!
//! let retry = RetryConfig {
//!     max_retries: 3,
//!     initial_backoff: Duration::from_millis(100),
//!     ..Default::default()
//! }
//! .resolved();
//!
//! // Delay before the first retry is ~100ms (within the jitter bound).
//! let delay = retry.backoff_delay(0);
//! assert!(delay <= Duration::from_millis(110));
//! ```

mod backoff;

pub use backoff::RetryConfig;
