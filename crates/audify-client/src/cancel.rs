//! Cancellation capability for in-flight gateway calls.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::{GatewayError, GatewayResult};

/// Cloneable handle that cancels one outstanding request.
///
/// Once cancelled, [`CancelHandle::run`] resolves to [`GatewayError::Cancelled`]
/// even when the wrapped future completes in the same poll.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    /// Fresh, uncancelled handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the request. Idempotent.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether [`CancelHandle::cancel`] has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the handle is cancelled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    /// Drive `fut` until it settles or the handle is cancelled.
    ///
    /// On cancellation the future is dropped, which aborts any HTTP request it owns.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Cancelled`] when cancelled, otherwise the future's own error.
    pub async fn run<F, T>(&self, fut: F) -> GatewayResult<T>
    where
        F: Future<Output = GatewayResult<T>>,
    {
        if self.is_cancelled() {
            return Err(GatewayError::Cancelled);
        }
        tokio::select! {
            biased;
            () = self.token.cancelled() => Err(GatewayError::Cancelled),
            outcome = fut => {
                if self.is_cancelled() {
                    Err(GatewayError::Cancelled)
                } else {
                    outcome
                }
            }
        }
    }
}
