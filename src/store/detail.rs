//! Detail store: one selected item of a collection
//!
//! Selecting a URI first looks in the collection store's cached page and
//! only fetches the item when it is not there.

use super::collection::ResourceStore;
use super::state::{CellState, LoadCell, ResourceStatus};
use crate::client::HalClient;
use crate::core::error::{HalError, StoreError};
use crate::core::resource::{Payload, Resource};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

struct DetailInner<T> {
    client: HalClient,
    collection: ResourceStore<T>,
    uri: Mutex<Option<String>>,
    cell: LoadCell<Resource<T>>,
}

/// Reactive cache of one item
pub struct DetailStore<T = Payload> {
    inner: Arc<DetailInner<T>>,
}

impl<T> Clone for DetailStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> DetailStore<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    pub fn new(client: HalClient, collection: ResourceStore<T>) -> Self {
        let name = format!("{}/detail", collection.descriptor().name);
        Self {
            inner: Arc::new(DetailInner {
                client,
                collection,
                uri: Mutex::new(None),
                cell: LoadCell::new(name),
            }),
        }
    }

    /// The selected URI
    pub fn uri(&self) -> Option<String> {
        self.inner.uri.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Select an item
    ///
    /// A cache hit in the collection store resolves immediately without any
    /// request; a miss starts a fetch.
    pub fn select(&self, uri: impl Into<String>) {
        let uri = uri.into();
        *self.inner.uri.lock().unwrap_or_else(|e| e.into_inner()) = Some(uri.clone());

        if let Some(item) = self.inner.collection.find_by_href(&uri) {
            tracing::debug!(href = %uri, "Item resolved from collection cache");
            self.inner.cell.resolve(item);
            return;
        }

        tracing::debug!(href = %uri, "Item not cached, fetching");
        self.fetch(uri, false);
    }

    /// Select an item and wait for it
    pub async fn resolve(&self, uri: impl Into<String>) -> Result<Resource<T>, HalError> {
        self.select(uri);
        self.loaded().await
    }

    /// Wait for the selected item
    pub async fn loaded(&self) -> Result<Resource<T>, HalError> {
        if self.uri().is_none() {
            return Err(self.no_selection());
        }
        let state = self.inner.cell.settled().await;
        match (state.value, state.error) {
            (Some(item), _) => Ok(item),
            (None, Some(err)) => Err(err),
            (None, None) => Err(self.no_selection()),
        }
    }

    /// Refetch the selected item from the server
    pub fn reload(&self) {
        if let Some(uri) = self.uri() {
            self.fetch(uri, true);
        }
    }

    pub fn current(&self) -> Option<Resource<T>> {
        self.inner.cell.value()
    }

    /// Replace the current item client-side
    pub fn set_local(&self, item: Resource<T>) -> bool {
        self.inner.cell.patch(|_| Some(item))
    }

    pub fn status(&self) -> ResourceStatus {
        self.inner.cell.status()
    }

    pub fn is_loading(&self) -> bool {
        self.status().is_loading()
    }

    pub fn error(&self) -> Option<HalError> {
        self.inner.cell.snapshot().error
    }

    pub fn subscribe(&self) -> watch::Receiver<CellState<Resource<T>>> {
        self.inner.cell.subscribe()
    }

    pub fn collection(&self) -> &ResourceStore<T> {
        &self.inner.collection
    }

    /// Update the selected item through the collection store
    pub async fn update<P: Serialize + ?Sized>(&self, payload: &P) -> Result<Resource<T>, HalError> {
        let current = self.current().ok_or_else(|| self.no_selection())?;
        let updated = self.inner.collection.update(&current, payload).await?;
        self.set_local(updated.clone());
        Ok(updated)
    }

    fn fetch(&self, uri: String, keep_value: bool) {
        let client = self.inner.client.clone();
        self.inner.cell.start(keep_value, async move {
            client.load_resource(&uri).await?.into_typed()
        });
    }

    fn no_selection(&self) -> HalError {
        StoreError::NoSelection {
            store: format!("{}/detail", self.inner.collection.descriptor().name),
        }
        .into()
    }
}
