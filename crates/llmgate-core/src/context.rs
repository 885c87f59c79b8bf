//! Cancellable execution contexts.
//!
//! A [`CallContext`] is the cancellation/deadline handle a caller threads
//! through a client call. The client checks it at every suspension point:
//! before each network attempt, around in-flight I/O, and during backoff
//! waits. Waits are implemented as a timer race (`tokio::select!`), never by
//! polling, so cancellation latency stays bounded.
//!
//! # Examples
//!
//! ```rust
//! use llmgate_core::context::{CallContext, CancelCause};
//! use std::time::Duration;
//!
//! # async fn example() {
//! let (ctx, handle) = CallContext::cancellable();
//!
//! tokio::spawn(async move {
//!     // Some external condition decides to abort the call.
//!     handle.cancel();
//! });
//!
//! if let Err(cause) = ctx.sleep(Duration::from_secs(30)).await {
//!     assert_eq!(cause, CancelCause::Cancelled);
//! }
//! # }
//! ```

use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::Instant;

/// Why a context stopped being live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CancelCause {
    /// The caller cancelled explicitly via [`CancelHandle::cancel`].
    #[error("context cancelled")]
    Cancelled,
    /// The context's deadline passed.
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

/// Handle used to cancel an associated [`CallContext`].
///
/// Dropping the handle without calling [`CancelHandle::cancel`] leaves the
/// context live; only an explicit cancel (or a deadline) ends it.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Cancel the associated context.
    ///
    /// Idempotent; later calls have no further effect.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// A caller-supplied cancellation/deadline handle for one client call.
///
/// Contexts are cheap to clone; clones observe the same cancel signal and
/// deadline. A context with neither a cancel handle nor a deadline (from
/// [`CallContext::background`]) is never done.
#[derive(Debug, Clone)]
pub struct CallContext {
    cancelled: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

impl CallContext {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self {
            cancelled: None,
            deadline: None,
        }
    }

    /// A context paired with a handle that cancels it.
    pub fn cancellable() -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        (
            Self {
                cancelled: Some(rx),
                deadline: None,
            },
            CancelHandle { tx },
        )
    }

    /// Bound the context by a deadline relative to now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Bound the context by an absolute deadline.
    ///
    /// If a deadline is already set, the earlier of the two wins.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    /// Why the context is done, or `None` while it is still live.
    ///
    /// Explicit cancellation takes precedence over deadline expiry when both
    /// hold.
    pub fn cause(&self) -> Option<CancelCause> {
        if let Some(rx) = &self.cancelled
            && *rx.borrow()
        {
            return Some(CancelCause::Cancelled);
        }
        if let Some(deadline) = self.deadline
            && Instant::now() >= deadline
        {
            return Some(CancelCause::DeadlineExceeded);
        }
        None
    }

    /// Whether the context has been cancelled or its deadline has passed.
    pub fn is_done(&self) -> bool {
        self.cause().is_some()
    }

    /// Resolve when the context becomes done.
    ///
    /// Never resolves for a background context; intended to be raced against
    /// other futures with `tokio::select!`.
    pub async fn done(&self) -> CancelCause {
        if let Some(cause) = self.cause() {
            return cause;
        }

        let cancelled = async {
            match self.cancelled.clone() {
                Some(mut rx) => {
                    // A dropped CancelHandle means the caller can no longer
                    // cancel; stay pending instead of reporting done.
                    if rx.wait_for(|cancelled| *cancelled).await.is_err() {
                        std::future::pending::<()>().await;
                    }
                }
                None => std::future::pending::<()>().await,
            }
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = cancelled => CancelCause::Cancelled,
            _ = expired => CancelCause::DeadlineExceeded,
        }
    }

    /// Sleep for `duration`, waking early if the context becomes done.
    ///
    /// Returns `Ok(())` when the full duration elapsed and `Err(cause)` when
    /// the context ended the wait first.
    pub async fn sleep(&self, duration: Duration) -> Result<(), CancelCause> {
        tokio::select! {
            _ = tokio::time::sleep(duration) => Ok(()),
            cause = self.done() => Err(cause),
        }
    }
}
