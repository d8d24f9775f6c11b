//! Collection store: one cached page of a collection
//!
//! The store follows `root_rel` from the API root with the current
//! pagination option, keeps the collection snapshot, and patches it after
//! each mutation before reloading.

use super::state::{CellState, LoadCell, ResourceStatus};
use crate::client::HalClient;
use crate::config::CollectionDescriptor;
use crate::core::embedded::{add_item, delete_item, set_item, unwrap};
use crate::core::error::{HalError, StoreError};
use crate::core::query::{Pagination, PaginationOption, get_pagination};
use crate::core::resource::{Payload, Resource};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

struct StoreInner {
    client: HalClient,
    descriptor: CollectionDescriptor,
    option: Mutex<PaginationOption>,
    cell: LoadCell<Arc<Resource>>,
}

/// Reactive cache of one collection
///
/// Cheap to clone; clones share the cache. Items are exposed as
/// `Resource<T>`, the collection itself stays untyped.
pub struct ResourceStore<T = Payload> {
    inner: Arc<StoreInner>,
    _payload: PhantomData<fn() -> T>,
}

impl<T> Clone for ResourceStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _payload: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> ResourceStore<T> {
    /// Create a store on the descriptor's default page
    ///
    /// Nothing is fetched until the data is first read.
    pub fn new(client: HalClient, descriptor: CollectionDescriptor) -> Self {
        let option = PaginationOption::page(descriptor.default_page_size, 0);
        tracing::debug!(store = %descriptor.name, option = %option, "Store created");
        Self {
            inner: Arc::new(StoreInner {
                cell: LoadCell::new(descriptor.name.clone()),
                client,
                descriptor,
                option: Mutex::new(option),
            }),
            _payload: PhantomData,
        }
    }

    pub fn descriptor(&self) -> &CollectionDescriptor {
        &self.inner.descriptor
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Items of the cached page
    ///
    /// Never waits: empty while nothing is loaded. A page without the
    /// embedded relation is an empty page.
    pub fn get_all(&self) -> Result<Vec<Resource<T>>, HalError> {
        self.ensure_started();
        self.items()
            .into_iter()
            .map(Resource::into_typed)
            .collect()
    }

    /// Wait for the current load and return its items
    pub async fn loaded(&self) -> Result<Vec<Resource<T>>, HalError> {
        self.ensure_started();
        let state = self.inner.cell.settled().await;
        if let Some(err) = state.error {
            return Err(err);
        }
        self.get_all()
    }

    /// Untyped items of the cached page
    pub fn items(&self) -> Vec<Resource> {
        self.inner
            .cell
            .value()
            .and_then(|snapshot| {
                unwrap(snapshot.as_ref(), &self.inner.descriptor.embedded_rel)
                    .ok()
                    .map(<[Resource]>::to_vec)
            })
            .unwrap_or_default()
    }

    /// The cached collection resource
    pub fn snapshot(&self) -> Option<Arc<Resource>> {
        self.inner.cell.value()
    }

    /// Item with the given self href, from the cache only
    pub fn find_by_href(&self, href: &str) -> Option<Resource<T>> {
        self.items()
            .into_iter()
            .find(|item| item.self_href() == href)
            .and_then(|item| item.into_typed().ok())
    }

    pub fn pagination(&self) -> Option<Pagination> {
        self.snapshot().and_then(|snapshot| get_pagination(&snapshot))
    }

    pub fn pagination_option(&self) -> PaginationOption {
        *self.inner.option.lock().unwrap_or_else(|e| e.into_inner())
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

    /// Changes of the cached collection
    pub fn subscribe(&self) -> watch::Receiver<CellState<Arc<Resource>>> {
        self.ensure_started();
        self.inner.cell.subscribe()
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Change the pagination option
    ///
    /// A different option drops the cached page and loads the new one; the
    /// same option is a no-op.
    pub fn set_pagination(&self, option: PaginationOption) {
        {
            let mut current = self.inner.option.lock().unwrap_or_else(|e| e.into_inner());
            if *current == option && self.status() != ResourceStatus::Idle {
                return;
            }
            *current = option;
        }
        tracing::debug!(store = %self.inner.descriptor.name, option = %option, "Pagination changed");
        self.load(false);
    }

    /// Step the pagination option one page back
    pub fn go_to_previous_page(&self) {
        self.set_pagination(self.pagination_option().previous());
    }

    /// Refetch the current option, keeping the cached page visible meanwhile
    pub fn reload(&self) {
        tracing::debug!(store = %self.inner.descriptor.name, "Reloading");
        self.load(true);
    }

    fn ensure_started(&self) {
        if self.status() == ResourceStatus::Idle {
            self.load(false);
        }
    }

    fn load(&self, keep_value: bool) {
        let client = self.inner.client.clone();
        let descriptor = self.inner.descriptor.clone();
        let option = self.pagination_option();
        self.inner.cell.start(keep_value, async move {
            fetch_collection(&client, &descriptor, option).await.map(Arc::new)
        });
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Create an item through the collection's create action
    ///
    /// The created item is appended to the cached page, then the page is
    /// reloaded.
    pub async fn create<P: Serialize + ?Sized>(&self, payload: &P) -> Result<Resource<T>, HalError> {
        let snapshot = self.snapshot().ok_or_else(|| StoreError::NotLoaded {
            store: self.inner.descriptor.name.clone(),
        })?;

        let created = self
            .inner
            .client
            .invoke_resource(snapshot.as_ref(), &self.inner.descriptor.create_action, payload)
            .await?;
        tracing::info!(store = %self.inner.descriptor.name, href = %created.self_href(), "Item created");

        self.record_created(&created);
        created.into_typed()
    }

    /// Update an item through its update action
    pub async fn update<U, P: Serialize + ?Sized>(&self, item: &Resource<U>, payload: &P) -> Result<Resource<T>, HalError> {
        let updated = self
            .inner
            .client
            .invoke_resource(item, &self.inner.descriptor.update_action, payload)
            .await?;
        tracing::info!(store = %self.inner.descriptor.name, href = %updated.self_href(), "Item updated");

        self.record_updated(&updated);
        updated.into_typed()
    }

    /// Delete an item through its delete action
    ///
    /// Deleting the only item of a page past the first steps back one page
    /// instead of reloading an empty one.
    pub async fn delete<U>(&self, item: &Resource<U>) -> Result<(), HalError> {
        self.inner
            .client
            .invoke(item, &self.inner.descriptor.delete_action, None)
            .await?;
        tracing::info!(store = %self.inner.descriptor.name, href = %item.self_href(), "Item deleted");

        let last_on_page = self.items().len() == 1;
        match self.pagination_option() {
            PaginationOption::Page { page, .. } if last_on_page && page > 0 => {
                self.go_to_previous_page();
            }
            _ if last_on_page => self.reload(),
            _ => {
                self.patch(|collection, rel| delete_item(collection, rel, item));
                self.reload();
            }
        }
        Ok(())
    }

    /// Append an item created elsewhere to the cached page, then reload
    pub fn record_created(&self, item: &Resource) {
        self.patch(|collection, rel| add_item(collection, rel, item.clone()));
        self.reload();
    }

    /// Replace an item updated elsewhere in the cached page, then reload
    pub fn record_updated(&self, item: &Resource) {
        self.patch(|collection, rel| set_item(collection, rel, item.clone()));
        self.reload();
    }

    /// Apply an embedded-collection edit to the cached page
    fn patch<F, E>(&self, f: F) -> bool
    where
        F: FnOnce(&Resource, &str) -> Result<Resource, E>,
        E: std::fmt::Display,
    {
        let rel = self.inner.descriptor.embedded_rel.as_str();
        let name = &self.inner.descriptor.name;
        self.inner.cell.patch(|snapshot| match f(&**snapshot, rel) {
            Ok(next) => Some(Arc::new(next)),
            Err(err) => {
                tracing::debug!(store = %name, error = %err, "Cached page not patched");
                None
            }
        })
    }
}

/// Fetch one page, or the unpaged collection for `All`
pub(crate) async fn fetch_collection(
    client: &HalClient,
    descriptor: &CollectionDescriptor,
    option: PaginationOption,
) -> Result<Resource, HalError> {
    let root = client.root().await?;
    let params = client.build_page_params(&option);
    let collection = client
        .follow_one(root.as_ref(), &descriptor.root_rel, Some(&params))
        .await?;

    match option {
        PaginationOption::All => {
            tracing::debug!(store = %descriptor.name, rel = %descriptor.all_rel, "Following unpaged collection");
            client.follow_one(&collection, &descriptor.all_rel, None).await
        }
        PaginationOption::Page { .. } => Ok(collection),
    }
}
