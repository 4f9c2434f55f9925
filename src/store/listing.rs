//! Synchronous listing store

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::models::{Turf, TurfId, TurfPatch};
use crate::store::{ListingError, ListingPage};

/// Source of store epochs. Unique across every store in the process, so a
/// ticket can never be mistaken for one issued by a later store.
static NEXT_EPOCH: AtomicU64 = AtomicU64::new(1);

fn next_epoch() -> u64 {
    NEXT_EPOCH.fetch_add(1, Ordering::Relaxed)
}

/// Receipt for an in-flight page fetch. Completing with a ticket from an
/// earlier epoch is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTicket {
    epoch: u64,
    page: u32,
}

impl PageTicket {
    pub fn page(&self) -> u32 {
        self.page
    }
}

/// Pagination lifecycle of a store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing loaded yet
    Empty,
    /// At least one non-empty page arrived and more may follow
    Loaded,
    /// The backend returned an empty page
    Exhausted,
}

/// Ordered, deduplicated view over a paginated listing collection
#[derive(Debug)]
pub struct ListingStore {
    items: Vec<Turf>,
    ids: HashSet<TurfId>,
    next_page: u32,
    has_more: bool,
    in_flight: Option<PageTicket>,
    epoch: u64,
}

impl Default for ListingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ListingStore {
    pub fn new() -> Self {
        ListingStore {
            items: Vec::new(),
            ids: HashSet::new(),
            next_page: 1,
            has_more: true,
            in_flight: None,
            epoch: next_epoch(),
        }
    }

    pub fn items(&self) -> &[Turf] {
        &self.items
    }

    pub fn get(&self, id: TurfId) -> Option<&Turf> {
        self.position(id).map(|i| &self.items[i])
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn next_page(&self) -> u32 {
        self.next_page
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn phase(&self) -> Phase {
        if !self.has_more {
            Phase::Exhausted
        } else if self.next_page > 1 {
            Phase::Loaded
        } else {
            Phase::Empty
        }
    }

    /// Reserve the next page for fetching.
    ///
    /// Returns `None` when the store is exhausted or a fetch is already in
    /// flight; the pending fetch will deliver the page.
    pub fn begin_fetch(&mut self) -> Option<PageTicket> {
        if !self.has_more {
            return None;
        }
        if let Some(pending) = self.in_flight {
            tracing::debug!(page = pending.page, "Fetch already in flight, coalescing");
            return None;
        }

        let ticket = PageTicket {
            epoch: self.epoch,
            page: self.next_page,
        };
        self.in_flight = Some(ticket);
        Some(ticket)
    }

    /// Apply the outcome of the fetch identified by `ticket`.
    ///
    /// Errors leave the store untouched apart from releasing the in-flight
    /// marker, so the same page can be requested again.
    pub fn complete_fetch(
        &mut self,
        ticket: PageTicket,
        result: Result<Vec<Turf>, ListingError>,
    ) -> Result<ListingPage, ListingError> {
        if self.in_flight != Some(ticket) {
            tracing::debug!(page = ticket.page, "Discarding stale page result");
            return Err(ListingError::Discarded { page: ticket.page });
        }
        self.in_flight = None;

        let fetched = result?;
        if fetched.is_empty() {
            self.has_more = false;
            tracing::info!(page = ticket.page, total = self.items.len(), "Listing exhausted");
            return Ok(ListingPage::empty(ticket.page));
        }

        let mut appended = 0usize;
        for turf in &fetched {
            if self.ids.insert(turf.id) {
                self.items.push(turf.clone());
                appended += 1;
            }
        }
        self.next_page += 1;

        tracing::info!(
            page = ticket.page,
            received = fetched.len(),
            appended,
            "Page loaded"
        );

        Ok(ListingPage {
            page: ticket.page,
            items: fetched,
        })
    }

    /// Merge a server-confirmed patch into the listing with `id`
    pub fn apply_update(&mut self, id: TurfId, patch: &TurfPatch) -> Result<Turf, ListingError> {
        if let Some(patch_id) = patch.id.filter(|&p| p != id) {
            return Err(ListingError::InvalidPatch { id, patch_id });
        }

        let index = self.position(id).ok_or(ListingError::NotFound(id))?;
        let turf = &mut self.items[index];
        turf.merge(patch);
        Ok(turf.clone())
    }

    /// Drop a server-confirmed deletion from the cache
    pub fn apply_delete(&mut self, id: TurfId) -> Result<(), ListingError> {
        let index = self.position(id).ok_or(ListingError::NotFound(id))?;
        self.items.remove(index);
        self.ids.remove(&id);
        Ok(())
    }

    /// Forget everything and start over from page 1. Fetches issued before
    /// the reset are discarded when they complete.
    pub fn reset(&mut self) {
        self.items.clear();
        self.ids.clear();
        self.next_page = 1;
        self.has_more = true;
        self.in_flight = None;
        self.epoch = next_epoch();
    }

    fn position(&self, id: TurfId) -> Option<usize> {
        if !self.ids.contains(&id) {
            return None;
        }
        self.items.iter().position(|t| t.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_turf;

    fn load(store: &mut ListingStore, items: Vec<Turf>) -> Result<ListingPage, ListingError> {
        let ticket = store.begin_fetch().expect("store should accept a fetch");
        store.complete_fetch(ticket, Ok(items))
    }

    fn ids(store: &ListingStore) -> Vec<TurfId> {
        store.items().iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_first_page_loads() {
        let mut store = ListingStore::new();
        assert_eq!(store.phase(), Phase::Empty);

        let page = load(&mut store, vec![sample_turf(1, 300.0), sample_turf(2, 450.0)]).unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.items.len(), 2);
        assert_eq!(store.phase(), Phase::Loaded);
        assert_eq!(store.next_page(), 2);
        assert!(store.has_more());
        assert!(!store.is_loading());
    }

    #[test]
    fn test_empty_page_exhausts() {
        let mut store = ListingStore::new();
        load(&mut store, vec![sample_turf(1, 300.0), sample_turf(2, 450.0)]).unwrap();

        let page = load(&mut store, vec![]).unwrap();
        assert!(page.is_empty());
        assert_eq!(page.page, 2);
        assert!(!store.has_more());
        assert_eq!(store.len(), 2);
        assert_eq!(store.next_page(), 2);
        assert_eq!(store.phase(), Phase::Exhausted);

        // Terminal until reset
        assert!(store.begin_fetch().is_none());
    }

    #[test]
    fn test_duplicates_across_pages_are_skipped() {
        let mut store = ListingStore::new();
        load(&mut store, vec![sample_turf(1, 100.0), sample_turf(2, 200.0)]).unwrap();
        let page = load(&mut store, vec![sample_turf(2, 999.0), sample_turf(3, 300.0)]).unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(ids(&store), vec![1, 2, 3]);
        // The first delivery wins
        assert_eq!(store.get(2).unwrap().price, 200.0);
        assert_eq!(store.next_page(), 3);
    }

    #[test]
    fn test_duplicates_within_a_page_are_skipped() {
        let mut store = ListingStore::new();
        load(&mut store, vec![sample_turf(4, 1.0), sample_turf(4, 2.0), sample_turf(5, 3.0)]).unwrap();
        assert_eq!(ids(&store), vec![4, 5]);
    }

    #[test]
    fn test_failed_fetch_leaves_state_unchanged() {
        let mut store = ListingStore::new();
        load(&mut store, vec![sample_turf(1, 100.0)]).unwrap();

        let ticket = store.begin_fetch().unwrap();
        let err = store
            .complete_fetch(ticket, Err(ListingError::fetch_failed("connection reset")))
            .unwrap_err();
        assert!(err.is_transient());
        assert_eq!(ids(&store), vec![1]);
        assert_eq!(store.next_page(), 2);
        assert!(store.has_more());

        // Same page can be retried
        let retry = store.begin_fetch().unwrap();
        assert_eq!(retry.page(), 2);
    }

    #[test]
    fn test_overlapping_fetch_is_coalesced() {
        let mut store = ListingStore::new();
        let first = store.begin_fetch();
        assert!(first.is_some());
        assert!(store.begin_fetch().is_none());
        assert!(store.is_loading());
    }

    #[test]
    fn test_update_merges_in_place() {
        let mut store = ListingStore::new();
        load(&mut store, vec![sample_turf(1, 300.0), sample_turf(2, 450.0)]).unwrap();
        let before = store.get(1).unwrap().clone();

        let patch = TurfPatch {
            price: Some(500.0),
            ..Default::default()
        };
        let updated = store.apply_update(1, &patch).unwrap();

        assert_eq!(updated.id, 1);
        assert_eq!(updated.price, 500.0);
        assert_eq!(updated.name, before.name);
        assert_eq!(updated.location, before.location);
        assert_eq!(updated.description, before.description);
        assert_eq!(updated.image_url, before.image_url);
        assert_eq!(ids(&store), vec![1, 2]);
    }

    #[test]
    fn test_update_rejects_id_change() {
        let mut store = ListingStore::new();
        load(&mut store, vec![sample_turf(1, 300.0)]).unwrap();

        let patch = TurfPatch {
            id: Some(9),
            ..Default::default()
        };
        assert_eq!(
            store.apply_update(1, &patch),
            Err(ListingError::InvalidPatch { id: 1, patch_id: 9 })
        );

        // Matching id is fine
        let same = TurfPatch {
            id: Some(1),
            name: Some(String::from("Renamed")),
            ..Default::default()
        };
        assert_eq!(store.apply_update(1, &same).unwrap().name, "Renamed");
    }

    #[test]
    fn test_update_unknown_id() {
        let mut store = ListingStore::new();
        assert_eq!(
            store.apply_update(42, &TurfPatch::default()),
            Err(ListingError::NotFound(42))
        );
    }

    #[test]
    fn test_delete_removes_exactly_one() {
        let mut store = ListingStore::new();
        load(&mut store, vec![sample_turf(1, 1.0), sample_turf(2, 2.0), sample_turf(3, 3.0)]).unwrap();

        store.apply_delete(2).unwrap();
        assert_eq!(ids(&store), vec![1, 3]);
        assert_eq!(store.apply_delete(2), Err(ListingError::NotFound(2)));

        // A deleted id may be delivered again by a later page
        load(&mut store, vec![sample_turf(2, 2.0)]).unwrap();
        assert_eq!(ids(&store), vec![1, 3, 2]);
    }

    #[test]
    fn test_delete_down_to_one() {
        let mut store = ListingStore::new();
        load(&mut store, vec![sample_turf(1, 1.0), sample_turf(2, 2.0)]).unwrap();
        store.apply_delete(2).unwrap();
        assert_eq!(ids(&store), vec![1]);
        assert_eq!(store.phase(), Phase::Loaded);
    }

    #[test]
    fn test_reset_discards_in_flight_result() {
        let mut store = ListingStore::new();
        load(&mut store, vec![sample_turf(1, 1.0)]).unwrap();
        load(&mut store, vec![]).unwrap();

        let stale = ListingStore::new().begin_fetch().unwrap();
        assert_eq!(
            store.complete_fetch(stale, Ok(vec![sample_turf(8, 8.0)])),
            Err(ListingError::Discarded { page: 1 })
        );

        store.reset();
        assert_eq!(store.phase(), Phase::Empty);
        assert_eq!(store.next_page(), 1);
        assert!(store.is_empty());

        let ticket = store.begin_fetch().unwrap();
        store.reset();
        assert_eq!(
            store.complete_fetch(ticket, Ok(vec![sample_turf(9, 9.0)])),
            Err(ListingError::Discarded { page: 1 })
        );
        assert!(store.is_empty());
        assert!(!store.is_loading());
    }
}
