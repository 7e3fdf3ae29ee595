//! Single-flight coordination of refresh-token exchanges
//!
//! The exchange in flight is kept as a shared future. Whoever hits a `401`
//! while it is pending either joins it ([`RefreshMode::Shared`]) or is
//! turned away ([`RefreshMode::RejectConcurrent`]). The slot empties itself
//! when the exchange settles. The exchange runs on its own task, so it
//! settles even when the caller that started it is dropped.

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use lavacar_core::RefreshMode;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

type PendingRefresh = Shared<BoxFuture<'static, Result<String, String>>>;

/// Result of asking for a refreshed access token
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RefreshOutcome {
    /// New access token, already persisted
    Refreshed(String),
    /// Exchange failed; the reason is for logs only
    Failed(String),
    /// Another exchange is running and the mode forbids joining it
    Busy,
}

/// Empties the in-flight slot once the exchange task ends, panics included
struct ReleaseSlot(Arc<Mutex<Option<PendingRefresh>>>);

impl Drop for ReleaseSlot {
    fn drop(&mut self) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).take();
    }
}

pub(crate) struct RefreshCoordinator {
    mode: RefreshMode,
    in_flight: Arc<Mutex<Option<PendingRefresh>>>,
}

impl RefreshCoordinator {
    pub(crate) fn new(mode: RefreshMode) -> Self {
        Self {
            mode,
            in_flight: Arc::new(Mutex::new(None)),
        }
    }

    pub(crate) const fn mode(&self) -> RefreshMode {
        self.mode
    }

    pub(crate) fn is_in_flight(&self) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Run `start()` unless an exchange is already pending.
    ///
    /// `start` is only called when this caller becomes the leader.
    pub(crate) async fn refresh<F, Fut>(&self, start: F) -> RefreshOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, String>> + Send + 'static,
    {
        let pending = {
            let mut slot = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            match slot.clone() {
                Some(pending) => match self.mode {
                    RefreshMode::Shared => {
                        debug!("Joining token refresh already in flight");
                        pending
                    }
                    RefreshMode::RejectConcurrent => {
                        debug!("Token refresh already in flight, rejecting");
                        return RefreshOutcome::Busy;
                    }
                },
                None => {
                    let exchange = start();
                    let release = ReleaseSlot(Arc::clone(&self.in_flight));
                    // Spawned so the exchange settles even if every caller
                    // gives up on it
                    let task = tokio::spawn(async move {
                        let _release = release;
                        exchange.await
                    });
                    let pending = async move {
                        task.await
                            .unwrap_or_else(|e| Err(format!("refresh task failed: {e}")))
                    }
                    .boxed()
                    .shared();
                    *slot = Some(pending.clone());
                    pending
                }
            }
        };

        match pending.await {
            Ok(token) => RefreshOutcome::Refreshed(token),
            Err(reason) => RefreshOutcome::Failed(reason),
        }
    }
}
