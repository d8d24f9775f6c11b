//! Reactive load slot shared by the stores
//!
//! A [`LoadCell`] holds one value fetched asynchronously, with its status
//! and last error, and publishes every change on a `watch` channel.
//!
//! ```text
//!            start()                 ok
//!   Idle ───────────▶ Loading ─────────────▶ Resolved ──patch()──▶ Local
//!                        │                      │                    │
//!                        │ err                  └──── reload() ──────┴──▶ Reloading
//!                        ▼
//!                      Error
//! ```
//!
//! Each load carries a generation number. Starting a new load aborts the
//! task of the previous one and bumps the generation; a result whose
//! generation is no longer current is dropped without touching the value.

use crate::core::error::HalError;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Status of a store value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    /// Nothing requested yet
    Idle,

    /// First load for the current request, no value
    Loading,

    /// Load in flight while the previous value is still shown
    Reloading,

    Resolved,

    /// Value patched client-side since the last load
    Local,

    Error,
}

impl ResourceStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, ResourceStatus::Loading | ResourceStatus::Reloading)
    }

    /// Whether a load outcome is known
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            ResourceStatus::Resolved | ResourceStatus::Local | ResourceStatus::Error
        )
    }
}

/// Observable state of a [`LoadCell`]
#[derive(Debug, Clone)]
pub struct CellState<V> {
    pub status: ResourceStatus,
    pub value: Option<V>,
    pub error: Option<HalError>,
    generation: u64,
}

impl<V> CellState<V> {
    fn idle() -> Self {
        Self {
            status: ResourceStatus::Idle,
            value: None,
            error: None,
            generation: 0,
        }
    }
}

pub(crate) struct LoadCell<V> {
    name: String,
    state: Arc<watch::Sender<CellState<V>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<V> LoadCell<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(name: impl Into<String>) -> Self {
        let (state, _) = watch::channel(CellState::idle());
        Self {
            name: name.into(),
            state: Arc::new(state),
            task: Mutex::new(None),
        }
    }

    pub(crate) fn snapshot(&self) -> CellState<V> {
        self.state.borrow().clone()
    }

    pub(crate) fn value(&self) -> Option<V> {
        self.state.borrow().value.clone()
    }

    pub(crate) fn status(&self) -> ResourceStatus {
        self.state.borrow().status
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<CellState<V>> {
        self.state.subscribe()
    }

    /// Start a load, superseding any load in flight
    ///
    /// `keep_value` keeps the current value visible (`Reloading`); otherwise
    /// the value is cleared (`Loading`). Outside a Tokio runtime the load is
    /// not started and the cell stays as it was.
    pub(crate) fn start<F>(&self, keep_value: bool, load: F)
    where
        F: Future<Output = Result<V, HalError>> + Send + 'static,
    {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(store = %self.name, "No Tokio runtime, load not started");
            return;
        };

        let mut task = self.task.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = task.take() {
            previous.abort();
        }

        let mut generation = 0;
        self.state.send_modify(|s| {
            s.generation += 1;
            generation = s.generation;
            s.error = None;
            if keep_value && s.value.is_some() {
                s.status = ResourceStatus::Reloading;
            } else {
                s.status = ResourceStatus::Loading;
                s.value = None;
            }
        });
        tracing::debug!(store = %self.name, generation, keep_value, "Load started");

        let state = self.state.clone();
        let name = self.name.clone();
        *task = Some(runtime.spawn(async move {
            let result = load.await;
            let applied = state.send_if_modified(|s| {
                if s.generation != generation {
                    return false;
                }
                match result {
                    Ok(value) => {
                        s.status = ResourceStatus::Resolved;
                        s.value = Some(value);
                        s.error = None;
                    }
                    Err(err) => {
                        tracing::warn!(store = %name, error = %err, "Load failed");
                        s.status = ResourceStatus::Error;
                        s.value = None;
                        s.error = Some(err);
                    }
                }
                true
            });
            if !applied {
                tracing::debug!(store = %name, generation, "Stale load result discarded");
            }
        }));
    }

    /// Set a value directly, superseding any load in flight
    pub(crate) fn resolve(&self, value: V) {
        self.abort();
        self.state.send_modify(|s| {
            s.generation += 1;
            s.status = ResourceStatus::Resolved;
            s.value = Some(value);
            s.error = None;
        });
    }

    /// Replace the current value client-side
    ///
    /// Returns false, leaving the state untouched, when there is no value
    /// or `f` declines.
    pub(crate) fn patch(&self, f: impl FnOnce(&V) -> Option<V>) -> bool {
        self.state.send_if_modified(|s| {
            let Some(next) = s.value.as_ref().and_then(f) else {
                return false;
            };
            s.value = Some(next);
            s.status = ResourceStatus::Local;
            true
        })
    }

    /// Wait until the current load settles
    pub(crate) async fn settled(&self) -> CellState<V> {
        let mut rx = self.state.subscribe();
        match rx.wait_for(|s| s.status.is_settled()).await {
            Ok(state) => state.clone(),
            // The sender lives as long as the cell itself
            Err(_) => self.snapshot(),
        }
    }

    pub(crate) fn abort(&self) {
        let mut task = self.task.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = task.take() {
            previous.abort();
        }
    }
}

impl<V> Drop for LoadCell<V> {
    fn drop(&mut self) {
        let task = self.task.get_mut().unwrap_or_else(|e| e.into_inner());
        if let Some(task) = task.take() {
            task.abort();
        }
    }
}
