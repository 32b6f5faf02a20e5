//! Per-controller task scope: cancellation plus request sequencing.
//!
//! Every controller owns one `TaskScope`. Operations issue a [`Ticket`]
//! before suspending and may only commit state while their ticket is still
//! the latest one issued and the scope has not been disposed.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use ads_core::{AppError, Result};
use tokio_util::sync::CancellationToken;

/// Sequence number of one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

#[derive(Debug, Default)]
pub struct TaskScope {
    token: CancellationToken,
    latest: AtomicU64,
}

impl TaskScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// A scope with its own sequence that is disposed together with `self`.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            latest: AtomicU64::new(0),
        }
    }

    /// Issues a new ticket, making every earlier ticket stale.
    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether a response for `ticket` may still update state.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        !self.is_disposed() && self.latest.load(Ordering::SeqCst) == ticket.0
    }

    pub fn is_disposed(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn dispose(&self) {
        self.token.cancel();
    }

    /// Drives `fut` until it completes or the scope is disposed.
    ///
    /// On disposal the future is dropped and `AppError::Disposed` returned.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output> {
        if self.is_disposed() {
            return Err(AppError::Disposed);
        }
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(AppError::Disposed),
            output = fut => Ok(output),
        }
    }
}

impl Drop for TaskScope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
