//! Root resource cell
//!
//! Holds the API root: pending, fetched, or failed. The first terminal
//! state is latched and replayed to every reader, late ones included; a
//! failure is never retried.

use crate::core::error::{HalError, TransportError};
use crate::core::resource::Resource;
use crate::transport::Method;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// State of the root resource
#[derive(Debug, Clone)]
pub enum RootState {
    /// Fetch in flight
    Pending,

    Ready(Arc<Resource>),

    /// Latched fetch error
    Failed(HalError),
}

impl RootState {
    pub fn is_pending(&self) -> bool {
        matches!(self, RootState::Pending)
    }

    /// Terminal value, `None` while pending
    pub fn result(&self) -> Option<Result<Arc<Resource>, HalError>> {
        match self {
            RootState::Pending => None,
            RootState::Ready(root) => Some(Ok(root.clone())),
            RootState::Failed(err) => Some(Err(err.clone())),
        }
    }
}

/// Single-slot replaying cell fed by one fetch task
pub(crate) struct RootCell {
    rx: watch::Receiver<RootState>,
    url: String,
    task: JoinHandle<()>,
}

impl RootCell {
    /// Spawn `fetch` and publish its outcome
    ///
    /// Must be called from within a Tokio runtime.
    pub(crate) fn spawn<F>(url: String, fetch: F) -> Self
    where
        F: Future<Output = Result<Resource, HalError>> + Send + 'static,
    {
        let (tx, rx) = watch::channel(RootState::Pending);
        let log_url = url.clone();
        let task = tokio::spawn(async move {
            let state = match fetch.await {
                Ok(root) => {
                    tracing::info!(url = %log_url, "Root resource loaded");
                    RootState::Ready(Arc::new(root))
                }
                Err(err) => {
                    tracing::error!(url = %log_url, error = %err, "Failed to load root resource");
                    RootState::Failed(err)
                }
            };
            // No receiver left means the client is gone
            let _ = tx.send(state);
        });

        Self { rx, url, task }
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<RootState> {
        self.rx.clone()
    }

    pub(crate) fn current(&self) -> RootState {
        self.rx.borrow().clone()
    }

    /// Wait for the terminal state
    pub(crate) async fn get(&self) -> Result<Arc<Resource>, HalError> {
        let mut rx = self.rx.clone();
        let outcome = rx
            .wait_for(|state| !state.is_pending())
            .await
            .map(|state| state.result());

        match outcome {
            Ok(Some(result)) => result,
            // Sender dropped while pending: the fetch task was aborted
            Ok(None) | Err(_) => Err(TransportError::new(
                Method::Get,
                &self.url,
                "root fetch ended without a result",
            )
            .into()),
        }
    }
}

impl Drop for RootCell {
    fn drop(&mut self) {
        self.task.abort();
    }
}
