//! Paginated listing store - the client-side cache behind the turf browser
//!
//! [`ListingStore`] is the synchronous core owned by the app layer: it hands out
//! page tickets, applies fetch results, and reconciles server-confirmed updates
//! and deletes. [`PagedListing`] wraps a store and a [`ListingSource`] behind an
//! async `load_next_page` that coalesces overlapping calls.
//!
//! [`ListingSource`]: crate::source::ListingSource

pub mod listing;
pub mod paged;

pub use listing::{ListingStore, PageTicket, Phase};
pub use paged::PagedListing;

use crate::models::{Turf, TurfId};

/// Errors raised by the store and by listing sources
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ListingError {
    /// Transport, status or decode failure. Safe to retry.
    #[error("request failed: {0}")]
    FetchFailed(String),

    #[error("listing {0} not found")]
    NotFound(TurfId),

    #[error("patch for listing {id} would change its id to {patch_id}")]
    InvalidPatch { id: TurfId, patch_id: TurfId },

    /// A fetch completed after its store was reset or dropped
    #[error("result for page {page} was discarded")]
    Discarded { page: u32 },
}

impl ListingError {
    pub fn fetch_failed(cause: impl std::fmt::Display) -> Self {
        ListingError::FetchFailed(cause.to_string())
    }

    /// Whether the caller can reasonably offer a retry
    pub fn is_transient(&self) -> bool {
        matches!(self, ListingError::FetchFailed(_))
    }
}

/// One fetched batch of listings and the page index that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct ListingPage {
    pub page: u32,
    pub items: Vec<Turf>,
}

impl ListingPage {
    pub fn empty(page: u32) -> Self {
        ListingPage {
            page,
            items: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
