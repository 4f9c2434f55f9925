//! Async facade over a listing store and its source

use std::sync::{Arc, Weak};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;

use crate::models::{Turf, TurfId, TurfPatch};
use crate::source::ListingSource;
use crate::store::{ListingError, ListingPage, ListingStore, PageTicket};

type SharedFetch = Shared<BoxFuture<'static, Result<ListingPage, ListingError>>>;

struct Inner {
    store: ListingStore,
    pending: Option<(PageTicket, SharedFetch)>,
}

/// A listing store paired with the source that fills it.
///
/// Overlapping `load_next_page` calls share a single underlying fetch. The
/// in-flight fetch only holds a weak reference to the store, so a result that
/// lands after the `PagedListing` is dropped is thrown away.
pub struct PagedListing<S> {
    inner: Arc<Mutex<Inner>>,
    source: Arc<S>,
}

impl<S: ListingSource + 'static> PagedListing<S> {
    pub fn new(source: Arc<S>) -> Self {
        PagedListing {
            inner: Arc::new(Mutex::new(Inner {
                store: ListingStore::new(),
                pending: None,
            })),
            source,
        }
    }

    /// Load the next page, or join the fetch that is already running
    pub async fn load_next_page(&self) -> Result<ListingPage, ListingError> {
        let fetch = {
            let mut inner = self.inner.lock().await;
            match &inner.pending {
                Some((_, fetch)) => fetch.clone(),
                None => {
                    let Some(ticket) = inner.store.begin_fetch() else {
                        return Ok(ListingPage::empty(inner.store.next_page()));
                    };
                    let fetch = self.spawn_fetch(ticket);
                    inner.pending = Some((ticket, fetch.clone()));
                    fetch
                }
            }
        };

        fetch.await
    }

    fn spawn_fetch(&self, ticket: PageTicket) -> SharedFetch {
        let source = Arc::clone(&self.source);
        let owner: Weak<Mutex<Inner>> = Arc::downgrade(&self.inner);

        async move {
            tracing::debug!(page = ticket.page(), "Fetching page");
            let result = source.fetch_page(ticket.page()).await;

            let Some(owner) = owner.upgrade() else {
                return Err(ListingError::Discarded { page: ticket.page() });
            };
            let mut inner = owner.lock().await;
            if matches!(&inner.pending, Some((pending, _)) if *pending == ticket) {
                inner.pending = None;
            }
            inner.store.complete_fetch(ticket, result)
        }
        .boxed()
        .shared()
    }

    /// Push `patch` to the source, then reconcile the confirmed listing
    pub async fn update(&self, id: TurfId, patch: &TurfPatch) -> Result<Turf, ListingError> {
        let confirmed = self.source.update_item(id, patch).await?;
        self.apply_update(id, &TurfPatch::from(confirmed)).await
    }

    /// Delete through the source. A listing already gone on either side counts as deleted.
    pub async fn delete(&self, id: TurfId) -> Result<(), ListingError> {
        match self.source.delete_item(id).await {
            Ok(()) | Err(ListingError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }
        match self.apply_delete(id).await {
            Err(ListingError::NotFound(_)) => {
                tracing::debug!(id, "Deleted listing was not cached");
                Ok(())
            }
            other => other,
        }
    }

    pub async fn apply_update(&self, id: TurfId, patch: &TurfPatch) -> Result<Turf, ListingError> {
        self.inner.lock().await.store.apply_update(id, patch)
    }

    pub async fn apply_delete(&self, id: TurfId) -> Result<(), ListingError> {
        self.inner.lock().await.store.apply_delete(id)
    }

    pub async fn reset(&self) {
        let mut inner = self.inner.lock().await;
        inner.pending = None;
        inner.store.reset();
    }

    pub async fn items(&self) -> Vec<Turf> {
        self.inner.lock().await.store.items().to_vec()
    }

    pub async fn has_more(&self) -> bool {
        self.inner.lock().await.store.has_more()
    }

    pub async fn next_page(&self) -> u32 {
        self.inner.lock().await.store.next_page()
    }
}
